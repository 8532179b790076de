//! Handler seam between the HTTP layer and notification consumers.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// Receives the body of every non-empty notification delivery.
///
/// Implementations must be infallible from the server's point of view: the
/// endpoint has already committed to acknowledging the delivery with a
/// success status by the time the handler runs, so errors have to be
/// handled (or logged and dropped) inside the implementation.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Process one notification body.
    async fn handle(&self, body: String);
}

/// Forwards raw notification bodies into a channel.
///
/// Useful for consumers that want to do their own parsing on the receiving
/// end, and for tests that need to observe exactly what the server saw.
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelHandler {
    /// Create a handler that sends every notification body to `sender`.
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl NotificationHandler for ChannelHandler {
    async fn handle(&self, body: String) {
        if self.sender.send(body).is_err() {
            debug!("notification receiver dropped, payload discarded");
        }
    }
}
