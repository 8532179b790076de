//! Error types for the tubesub crate.

use callback_server::ServerError;

/// Errors from parsing a notification payload.
///
/// Distinguishing "no entry" from "malformed timestamp" is for diagnostics
/// only; on the notification path every variant is handled the same way,
/// the payload is dropped and the delivery is still acknowledged.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The notification body was empty
    #[error("empty notification payload")]
    EmptyPayload,

    /// The payload was not a well-formed XML document
    #[error("malformed notification XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// The feed document contained no `<entry>` elements
    #[error("notification contained no entries")]
    NoEntries,

    /// A required timestamp element was absent
    #[error("missing <{field}> timestamp")]
    MissingTimestamp {
        /// Name of the absent element
        field: &'static str,
    },

    /// A timestamp element was present but not RFC3339
    #[error("unparseable <{field}> timestamp: {source}")]
    Timestamp {
        /// Name of the offending element
        field: &'static str,
        /// The underlying chrono error
        source: chrono::ParseError,
    },
}

/// Errors from outbound hub requests.
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    /// The request never produced an HTTP response
    #[error("transport error: {0}")]
    Transport(String),

    /// The hub answered with a non-success status
    #[error("hub rejected request: HTTP {status}")]
    Rejected {
        /// The HTTP status the hub returned
        status: u16,
    },
}

/// Top-level errors surfaced by [`HubSubscriber`](crate::HubSubscriber).
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    /// Invalid configuration provided
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The callback server could not be started
    #[error("callback server error: {0}")]
    CallbackServer(#[from] ServerError),

    /// A notification payload could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An outbound hub request failed
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),
}

/// Convenience type alias for Results using SubscriberError.
pub type Result<T> = std::result::Result<T, SubscriberError>;
