//! Configuration for the subscriber.

use std::time::Duration;

use crate::error::SubscriberError;

/// Default hub endpoint for YouTube feed subscriptions.
pub const DEFAULT_HUB_URL: &str = "https://pubsubhubbub.appspot.com/subscribe";

/// Configuration for [`HubSubscriber`](crate::HubSubscriber).
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Hub endpoint that subscribe/unsubscribe requests are sent to.
    /// Default: the Google PubSubHubbub hub
    pub hub_url: String,

    /// Port range for the callback server.
    /// Default: (8080, 8180)
    pub callback_port_range: (u16, u16),

    /// Maximum delta between `published` and `updated` for a notification
    /// to classify as a fresh upload rather than a metadata edit.
    /// Default: 30 seconds
    pub new_video_threshold: Duration,

    /// Read timeout for outbound hub requests.
    /// Default: 10 seconds
    pub request_timeout: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            callback_port_range: (8080, 8180),
            new_video_threshold: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SubscriberConfig {
    /// Create a new SubscriberConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), SubscriberError> {
        if url::Url::parse(&self.hub_url).is_err() {
            return Err(SubscriberError::Configuration(format!(
                "invalid hub URL: {}",
                self.hub_url
            )));
        }

        if self.callback_port_range.0 >= self.callback_port_range.1 {
            return Err(SubscriberError::Configuration(
                "invalid callback port range: start must be less than end".to_string(),
            ));
        }

        if self.new_video_threshold.is_zero() {
            return Err(SubscriberError::Configuration(
                "new-video threshold must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(SubscriberError::Configuration(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder pattern methods for fluent configuration

    pub fn with_hub_url(mut self, hub_url: impl Into<String>) -> Self {
        self.hub_url = hub_url.into();
        self
    }

    pub fn with_callback_ports(mut self, start: u16, end: u16) -> Self {
        self.callback_port_range = (start, end);
        self
    }

    pub fn with_new_video_threshold(mut self, threshold: Duration) -> Self {
        self.new_video_threshold = threshold;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
