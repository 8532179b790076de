//! Top-level subscriber wiring.

use std::sync::Arc;

use tokio::sync::mpsc;

use callback_server::CallbackServer;

use crate::config::SubscriberConfig;
use crate::error::Result;
use crate::feed::FeedParser;
use crate::pipeline::NotificationPipeline;
use crate::subscription::SubscriptionManager;
use crate::types::{ChannelId, VideoFeed};

/// The assembled WebSub subscriber.
///
/// Owns the callback server and the outbound subscription client. Classified
/// notifications arrive on the channel returned by [`start`](Self::start);
/// subscription state is not persisted and the dedup history does not
/// survive a restart.
pub struct HubSubscriber {
    server: CallbackServer,
    subscriptions: SubscriptionManager,
}

impl HubSubscriber {
    /// Validate the configuration, start the callback server and return the
    /// subscriber together with the channel classified feeds arrive on.
    ///
    /// Dropping the receiver does not stop the server; notifications are
    /// then acknowledged and discarded.
    pub async fn start(
        config: SubscriberConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<VideoFeed>)> {
        config.validate()?;

        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let parser = FeedParser::new(config.new_video_threshold);
        let pipeline = Arc::new(NotificationPipeline::new(parser, feed_tx));

        let server = CallbackServer::bind(config.callback_port_range, pipeline).await?;
        let subscriptions = SubscriptionManager::new(&config);

        Ok((
            Self {
                server,
                subscriptions,
            },
            feed_rx,
        ))
    }

    /// Base URL of the callback server, e.g. `http://192.168.1.10:8080`.
    pub fn base_url(&self) -> &str {
        self.server.base_url()
    }

    /// Full callback URL registered with the hub.
    pub fn callback_url(&self) -> String {
        self.server.callback_url()
    }

    /// Port the callback server is bound to.
    pub fn port(&self) -> u16 {
        self.server.port()
    }

    /// Subscribe to a channel's upload feed using the locally detected
    /// callback URL.
    ///
    /// Fire and forget: failures are logged and absorbed. Renewal is the
    /// caller's responsibility; invoke this again before `lease_seconds`
    /// elapse. Blocks the calling thread for the duration of the request.
    pub fn subscribe(&self, channel_id: &ChannelId, lease_seconds: u64) {
        self.subscriptions
            .subscribe(self.server.base_url(), channel_id, lease_seconds);
    }

    /// Subscribe with an explicit public callback base URL, for deployments
    /// behind NAT or a reverse proxy where the detected address is not what
    /// the hub can reach.
    pub fn subscribe_with_callback(
        &self,
        callback_url: &str,
        channel_id: &ChannelId,
        lease_seconds: u64,
    ) {
        self.subscriptions
            .subscribe(callback_url, channel_id, lease_seconds);
    }

    /// Cancel the subscription for a channel.
    pub fn unsubscribe(&self, channel_id: &ChannelId) {
        self.subscriptions
            .unsubscribe(self.server.base_url(), channel_id);
    }

    /// Cancel a subscription registered under an explicit callback URL.
    pub fn unsubscribe_with_callback(&self, callback_url: &str, channel_id: &ChannelId) {
        self.subscriptions.unsubscribe(callback_url, channel_id);
    }

    /// Shut the callback server down gracefully.
    pub async fn shutdown(self) {
        self.server.shutdown().await;
    }
}
