//! Shared utilities for gateway integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use worldmap_gateway::catalog::store::Catalog;
use worldmap_gateway::catalog::types::{LayerRecord, LayerStorage};
use worldmap_gateway::session::SessionStore;
use worldmap_gateway::viewer::bbox::BoundingBox;
use worldmap_gateway::{GatewayConfig, HttpServer, Shutdown};

/// Start the gateway on an ephemeral port around the given stores. The
/// returned coordinator stops the server when triggered.
pub async fn spawn_gateway(
    config: GatewayConfig,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(Arc::new(config), catalog, sessions).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    (addr, shutdown)
}

/// Config with an explicit allow-list and OGC server location.
pub fn test_config(allowed_hosts: &[&str], ogc_server: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.proxy.allowed_hosts = allowed_hosts.iter().map(|h| h.to_string()).collect();
    config.map.ogc_server_location = ogc_server.to_string();
    config
}

/// HTTP client that never follows redirects and never reuses connections.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A locally served layer with the given extent.
pub fn local_layer(id: i64, typename: &str, bbox: (f64, f64, f64, f64)) -> LayerRecord {
    LayerRecord {
        id,
        typename: typename.to_string(),
        alternate: typename.to_string(),
        title: typename.to_string(),
        bbox: BoundingBox::new(bbox.0, bbox.1, bbox.2, bbox.3),
        category: "boundaries".to_string(),
        styles: vec![format!("{}_style", typename.replace(':', "_"))],
        ows_url: "http://localhost:8080/geoserver/wms".to_string(),
        storage: LayerStorage::Local,
        public: true,
        owner: None,
    }
}

/// One request as the mock upstream saw it.
pub struct RecordedRequest {
    pub head: String,
    pub body: String,
}

impl RecordedRequest {
    /// The request line, e.g. "GET /wms?service=WMS HTTP/1.1".
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or("")
    }

    /// Value of a request header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (header, value) = line.split_once(':')?;
            header
                .trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Start a mock upstream that records every request and answers with a
/// fixed response. `headers` is extra response header lines, each ending
/// in "\r\n".
pub async fn start_upstream(
    status_line: &'static str,
    headers: &'static str,
    body: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let task_log = log.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let log = task_log.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut socket).await {
                            log.lock().unwrap().push(request);
                        }
                        let response = format!(
                            "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line,
                            headers,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Read one HTTP/1.1 request, honoring Content-Length.
async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut body = buf[head_end + 4..].to_vec();
    let expected = content_length(&head);
    while body.len() < expected {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        head,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}
