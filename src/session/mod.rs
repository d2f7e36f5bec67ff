//! Portal session state.
//!
//! The portal fronting this gateway issues a session cookie at login. The
//! gateway never mints sessions itself; it reads the cookie, resolves it
//! against this store, and derives a [`UserContext`] for the request.
//! Unknown session ids still yield a context carrying the id, so anonymous
//! visitors can be told apart per browser.

use axum::http::HeaderMap;
use dashmap::DashMap;
use std::collections::HashSet;

use crate::http::request::cookie_value;

/// Server-side state attached to one session cookie.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// Username, when the session belongs to a signed-in user.
    pub user: Option<String>,

    /// OAuth access token minted for the user at login.
    pub access_token: Option<String>,

    /// Layers this session has already been counted against.
    visited_layers: HashSet<i64>,
}

/// What a request's session cookie resolves to.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    /// Raw session id from the cookie, known to the store or not.
    pub session_id: Option<String>,

    pub user: Option<String>,

    pub access_token: Option<String>,
}

/// Concurrent session registry.
pub struct SessionStore {
    sessions: DashMap<String, SessionData>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a session, as the portal does at login.
    pub fn open(&self, session_id: &str, user: Option<String>, access_token: Option<String>) {
        self.sessions.insert(
            session_id.to_string(),
            SessionData {
                user,
                access_token,
                visited_layers: HashSet::new(),
            },
        );
    }

    /// Resolve the request's session cookie into a [`UserContext`].
    pub fn context(&self, headers: &HeaderMap, cookie_name: &str) -> UserContext {
        match cookie_value(headers, cookie_name) {
            Some(session_id) => {
                let data = self.sessions.get(&session_id);
                UserContext {
                    user: data.as_ref().and_then(|d| d.user.clone()),
                    access_token: data.as_ref().and_then(|d| d.access_token.clone()),
                    session_id: Some(session_id),
                }
            }
            None => UserContext::default(),
        }
    }

    /// Record that `session_id` saw `layer_id`. Returns true the first time
    /// this session sees the layer. Sessions the store has never met are
    /// created on the spot.
    pub fn first_visit(&self, session_id: &str, layer_id: i64) -> bool {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .visited_layers
            .insert(layer_id)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_context_resolves_known_session() {
        let store = SessionStore::new();
        store.open("s1", Some("alice".to_string()), Some("tok123".to_string()));

        let headers = headers_with_cookie("theme=dark; sessionid=s1");
        let ctx = store.context(&headers, "sessionid");

        assert_eq!(ctx.session_id.as_deref(), Some("s1"));
        assert_eq!(ctx.user.as_deref(), Some("alice"));
        assert_eq!(ctx.access_token.as_deref(), Some("tok123"));
    }

    #[test]
    fn test_context_unknown_session_keeps_id() {
        let store = SessionStore::new();
        let headers = headers_with_cookie("sessionid=stranger");
        let ctx = store.context(&headers, "sessionid");

        assert_eq!(ctx.session_id.as_deref(), Some("stranger"));
        assert!(ctx.user.is_none());
        assert!(ctx.access_token.is_none());
    }

    #[test]
    fn test_context_without_cookie() {
        let store = SessionStore::new();
        let ctx = store.context(&HeaderMap::new(), "sessionid");
        assert!(ctx.session_id.is_none());
    }

    #[test]
    fn test_first_visit_per_session_per_layer() {
        let store = SessionStore::new();

        assert!(store.first_visit("s1", 7));
        assert!(!store.first_visit("s1", 7));
        // A different layer in the same session is fresh.
        assert!(store.first_visit("s1", 8));
        // Another session tracks the same layer independently.
        assert!(store.first_visit("s2", 7));
    }
}
