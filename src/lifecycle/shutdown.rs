//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The server loop and any background tasks subscribe; triggering fans the
/// signal out to every subscriber. Embedders (tests, supervisors) hold the
/// coordinator and trigger it to stop a running gateway.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Safe to call with no subscribers.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
