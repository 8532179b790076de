//! Outbound subscription requests to the hub.

use std::time::Duration;

use tracing::{debug, warn};
use url::form_urlencoded;

use callback_server::CALLBACK_PATH;

use crate::config::SubscriberConfig;
use crate::error::SubscribeError;
use crate::types::ChannelId;

/// Feed URL template a channel subscription registers interest in.
const TOPIC_URL_PREFIX: &str = "https://www.youtube.com/xml/feeds/videos.xml?channel_id=";

/// Requested subscription mode, carried in `hub.mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HubMode {
    Subscribe {
        /// Requested lease window in seconds
        lease_seconds: u64,
    },
    Unsubscribe,
}

impl HubMode {
    fn as_str(self) -> &'static str {
        match self {
            HubMode::Subscribe { .. } => "subscribe",
            HubMode::Unsubscribe => "unsubscribe",
        }
    }
}

/// Issues subscribe/unsubscribe requests to the hub.
///
/// Every request is a single blocking form-encoded POST, fire and forget:
/// failures are logged and absorbed, nothing is retried, and nothing is
/// propagated to the caller. The hub confirms a successful request
/// out-of-band by calling the verification endpoint with a challenge.
///
/// There is no internal renewal timer; the caller must invoke
/// [`subscribe`](Self::subscribe) again before the lease expires to keep
/// the subscription alive.
pub struct SubscriptionManager {
    agent: ureq::Agent,
    hub_url: String,
}

impl SubscriptionManager {
    /// Create a manager targeting the configured hub endpoint.
    pub fn new(config: &SubscriberConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(5))
                .timeout_read(config.request_timeout)
                .build(),
            hub_url: config.hub_url.clone(),
        }
    }

    /// Register interest in a channel's upload feed.
    ///
    /// `callback_url` is the base URL of the callback server; the fixed
    /// callback path is appended verbatim. Blocks the calling thread until
    /// the hub responds or the agent times out.
    pub fn subscribe(&self, callback_url: &str, channel_id: &ChannelId, lease_seconds: u64) {
        self.send(
            channel_id,
            HubMode::Subscribe { lease_seconds },
            form_body(callback_url, channel_id, HubMode::Subscribe { lease_seconds }),
        );
    }

    /// Cancel a previously registered subscription.
    pub fn unsubscribe(&self, callback_url: &str, channel_id: &ChannelId) {
        self.send(
            channel_id,
            HubMode::Unsubscribe,
            form_body(callback_url, channel_id, HubMode::Unsubscribe),
        );
    }

    fn send(&self, channel_id: &ChannelId, mode: HubMode, body: String) {
        match self.post_form(&body) {
            Ok(status) => {
                debug!(channel = %channel_id, mode = mode.as_str(), status, "hub request accepted")
            }
            Err(error) => {
                warn!(channel = %channel_id, mode = mode.as_str(), %error, "hub request failed")
            }
        }
    }

    fn post_form(&self, body: &str) -> Result<u16, SubscribeError> {
        let response = self
            .agent
            .post(&self.hub_url)
            .set("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
            .send_string(body)
            .map_err(|error| match error {
                ureq::Error::Status(status, _) => SubscribeError::Rejected { status },
                other => SubscribeError::Transport(other.to_string()),
            })?;
        Ok(response.status())
    }
}

/// Build the form-encoded request body for a hub request.
///
/// `hub.callback` is the plain concatenation of the callback base URL and
/// the fixed callback path. `hub.verify_token` and `hub.secret` are sent
/// empty: inbound notifications are not signature-verified.
fn form_body(callback_url: &str, channel_id: &ChannelId, mode: HubMode) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    form.append_pair("hub.callback", &format!("{callback_url}{CALLBACK_PATH}"));
    form.append_pair("hub.topic", &topic_url(channel_id));
    form.append_pair("hub.verify", "async");
    form.append_pair("hub.mode", mode.as_str());
    if let HubMode::Subscribe { lease_seconds } = mode {
        form.append_pair("hub.verify_token", "");
        form.append_pair("hub.secret", "");
        form.append_pair("hub.lease_seconds", &lease_seconds.to_string());
    }
    form.finish()
}

/// Feed URL for a channel, used as the subscription topic.
pub fn topic_url(channel_id: &ChannelId) -> String {
    format!("{TOPIC_URL_PREFIX}{}", channel_id.as_str())
}
