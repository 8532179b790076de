//! Core types for the tubesub crate.

use chrono::{DateTime, Utc};

/// Identifier of a single YouTube video.
///
/// This is the natural key for duplicate suppression: the hub may redeliver
/// a notification for the same video several times.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create a new video ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the video ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the source notification carried no video identifier.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a YouTube channel (usually starts with `UC`).
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Create a new channel ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the channel ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One notification's worth of data about a video upload or update.
///
/// Text fields normalize to the empty string when the source XML lacks the
/// element; the two timestamps are mandatory, a notification without a
/// parseable pair never becomes a `VideoFeed`.
#[derive(Debug, Clone)]
pub struct VideoFeed {
    /// Channel the video belongs to
    pub channel_id: ChannelId,
    /// The video's identifier
    pub video_id: VideoId,
    /// Video title
    pub title: String,
    /// Watch URL, from the first `<link>` carrying an `href`
    pub link: String,
    /// Channel/author display name
    pub author: String,
    /// When the video was first published
    pub published: DateTime<Utc>,
    /// When the entry was last touched
    pub updated: DateTime<Utc>,
    /// Classification: fresh upload (`true`) vs metadata update (`false`).
    /// Starts from the publish/update timestamp heuristic and is downgraded
    /// on redelivery of an already-seen video.
    pub new_video: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_conversions() {
        let id = VideoId::new("dQw4w9WgXcQ");
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(id, VideoId::from("dQw4w9WgXcQ"));
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
        assert!(!id.is_empty());
        assert!(VideoId::new("").is_empty());
    }

    #[test]
    fn channel_id_conversions() {
        let id = ChannelId::from("UCtest".to_string());
        assert_eq!(id.as_str(), "UCtest");
        assert_eq!(id.to_string(), "UCtest");
    }
}
