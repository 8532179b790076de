//! Atom notification parsing.
//!
//! The hub delivers one Atom document per notification:
//!
//! ```xml
//! <feed xmlns:yt="http://www.youtube.com/xml/schemas/2015"
//!       xmlns="http://www.w3.org/2005/Atom">
//!   <entry>
//!     <yt:videoId>dQw4w9WgXcQ</yt:videoId>
//!     <yt:channelId>UC...</yt:channelId>
//!     <title>...</title>
//!     <link rel="alternate" href="https://www.youtube.com/watch?v=..."/>
//!     <author><name>...</name></author>
//!     <published>2023-05-11T18:00:55+00:00</published>
//!     <updated>2023-05-11T18:01:04+00:00</updated>
//!   </entry>
//! </feed>
//! ```
//!
//! Parsing is serde over quick-xml. The `yt:` qualified names are matched
//! literally, so no namespace handling is needed.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::error::ParseError;
use crate::types::{ChannelId, VideoFeed, VideoId};

/// Default delta between `published` and `updated` under which a
/// notification classifies as a fresh upload.
pub const DEFAULT_NEW_VIDEO_THRESHOLD: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename = "feed")]
struct FeedDocument {
    #[serde(rename = "entry", default)]
    entries: Vec<EntryElement>,
}

#[derive(Debug, Default, Deserialize)]
struct EntryElement {
    #[serde(rename = "yt:videoId", default)]
    video_id: String,
    #[serde(rename = "yt:channelId", default)]
    channel_id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "link", default)]
    links: Vec<LinkElement>,
    #[serde(rename = "author", default)]
    authors: Vec<AuthorElement>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LinkElement {
    #[serde(rename = "@href")]
    href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorElement {
    #[serde(default)]
    name: String,
}

/// Parser for hub notification payloads.
///
/// Produces either a fully populated [`VideoFeed`] or a [`ParseError`],
/// never a partial entity. Only the first `<entry>` is consumed; the hub
/// delivers one entry per notification, anything further is ignored.
#[derive(Debug, Clone)]
pub struct FeedParser {
    threshold_seconds: i64,
}

impl FeedParser {
    /// Create a parser with the given new-video classification threshold.
    pub fn new(new_video_threshold: Duration) -> Self {
        Self {
            threshold_seconds: new_video_threshold.as_secs() as i64,
        }
    }

    /// Parse a raw notification payload into a [`VideoFeed`].
    ///
    /// Text fields default to the empty string when absent. The `link` is
    /// the `href` of the first `<link>` element carrying one, the `author`
    /// is the first `<author>`'s `<name>`. Both timestamps must be present
    /// and RFC3339 or the whole payload is rejected.
    pub fn parse(&self, xml: &str) -> Result<VideoFeed, ParseError> {
        if xml.is_empty() {
            return Err(ParseError::EmptyPayload);
        }

        let document: FeedDocument = quick_xml::de::from_str(xml)?;

        let entry = document
            .entries
            .into_iter()
            .next()
            .ok_or(ParseError::NoEntries)?;

        let link = entry
            .links
            .into_iter()
            .find_map(|link| link.href)
            .unwrap_or_default();

        let author = entry
            .authors
            .into_iter()
            .next()
            .map(|author| author.name)
            .unwrap_or_default();

        let published = parse_timestamp("published", entry.published)?;
        let updated = parse_timestamp("updated", entry.updated)?;

        // A fresh upload carries a near-identical published/updated pair;
        // a later metadata edit moves only `updated`. Heuristic only, and
        // overridden by the dedup store on redelivery.
        let new_video = updated.timestamp() - published.timestamp() < self.threshold_seconds;

        Ok(VideoFeed {
            channel_id: ChannelId::new(entry.channel_id),
            video_id: VideoId::new(entry.video_id),
            title: entry.title,
            link,
            author,
            published,
            updated,
            new_video,
        })
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new(DEFAULT_NEW_VIDEO_THRESHOLD)
    }
}

fn parse_timestamp(
    field: &'static str,
    value: Option<String>,
) -> Result<DateTime<Utc>, ParseError> {
    let raw = value.ok_or(ParseError::MissingTimestamp { field })?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|source| ParseError::Timestamp { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(video_id: &str, published: &str, updated: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <link rel="hub" href="https://pubsubhubbub.appspot.com"/>
  <link rel="self" href="https://www.youtube.com/xml/feeds/videos.xml?channel_id=UCtestchannel"/>
  <title>YouTube video feed</title>
  <updated>{updated}</updated>
  <entry>
    <id>yt:video:{video_id}</id>
    <yt:videoId>{video_id}</yt:videoId>
    <yt:channelId>UCtestchannel</yt:channelId>
    <title>Test upload</title>
    <link rel="alternate" href="https://www.youtube.com/watch?v={video_id}"/>
    <author>
      <name>Test Channel</name>
      <uri>https://www.youtube.com/channel/UCtestchannel</uri>
    </author>
    <published>{published}</published>
    <updated>{updated}</updated>
  </entry>
</feed>"#
        )
    }

    #[test]
    fn parses_full_notification() {
        let parser = FeedParser::default();
        let xml = notification(
            "dQw4w9WgXcQ",
            "2023-05-11T18:00:55+00:00",
            "2023-05-11T18:01:04.552394234+00:00",
        );

        let feed = parser.parse(&xml).unwrap();
        assert_eq!(feed.video_id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(feed.channel_id.as_str(), "UCtestchannel");
        assert_eq!(feed.title, "Test upload");
        assert_eq!(feed.link, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(feed.author, "Test Channel");
        assert_eq!(feed.published.timestamp(), 1683828055);
        assert!(feed.new_video, "9 second delta is below the threshold");
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let parser = FeedParser::default();

        let just_under = notification(
            "vid1",
            "2023-05-11T18:00:00+00:00",
            "2023-05-11T18:00:29+00:00",
        );
        assert!(parser.parse(&just_under).unwrap().new_video);

        let at_threshold = notification(
            "vid2",
            "2023-05-11T18:00:00+00:00",
            "2023-05-11T18:00:30+00:00",
        );
        assert!(!parser.parse(&at_threshold).unwrap().new_video);
    }

    #[test]
    fn negative_delta_counts_as_new() {
        let parser = FeedParser::default();
        let xml = notification(
            "vid",
            "2023-05-11T18:00:30+00:00",
            "2023-05-11T18:00:00+00:00",
        );
        assert!(parser.parse(&xml).unwrap().new_video);
    }

    #[test]
    fn threshold_is_configurable() {
        let parser = FeedParser::new(Duration::from_secs(300));
        let xml = notification(
            "vid",
            "2023-05-11T18:00:00+00:00",
            "2023-05-11T18:02:00+00:00",
        );
        assert!(parser.parse(&xml).unwrap().new_video);
    }

    #[test]
    fn empty_payload_is_rejected() {
        let result = FeedParser::default().parse("");
        assert!(matches!(result, Err(ParseError::EmptyPayload)));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let result = FeedParser::default().parse("<feed><entry>");
        assert!(matches!(result, Err(ParseError::Xml(_))));
    }

    #[test]
    fn feed_without_entries_is_rejected() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        let result = FeedParser::default().parse(xml);
        assert!(matches!(result, Err(ParseError::NoEntries)));
    }

    #[test]
    fn missing_published_is_rejected() {
        let xml = r#"<feed><entry><yt:videoId>v</yt:videoId><updated>2023-05-11T18:00:00+00:00</updated></entry></feed>"#;
        let result = FeedParser::default().parse(xml);
        assert!(matches!(
            result,
            Err(ParseError::MissingTimestamp { field: "published" })
        ));
    }

    #[test]
    fn unparseable_updated_is_rejected() {
        let xml = r#"<feed><entry><published>2023-05-11T18:00:00+00:00</published><updated>yesterday</updated></entry></feed>"#;
        let result = FeedParser::default().parse(xml);
        assert!(matches!(
            result,
            Err(ParseError::Timestamp { field: "updated", .. })
        ));
    }

    #[test]
    fn absent_fields_normalize_to_empty_strings() {
        let xml = r#"<feed><entry>
            <published>2023-05-11T18:00:00+00:00</published>
            <updated>2023-05-11T18:00:05+00:00</updated>
        </entry></feed>"#;

        let feed = FeedParser::default().parse(xml).unwrap();
        assert_eq!(feed.video_id.as_str(), "");
        assert_eq!(feed.channel_id.as_str(), "");
        assert_eq!(feed.title, "");
        assert_eq!(feed.link, "");
        assert_eq!(feed.author, "");
        assert!(feed.new_video);
    }

    #[test]
    fn first_link_with_href_wins() {
        let xml = r#"<feed><entry>
            <link rel="replies"/>
            <link rel="alternate" href="https://first.example/watch"/>
            <link rel="self" href="https://second.example/watch"/>
            <published>2023-05-11T18:00:00+00:00</published>
            <updated>2023-05-11T18:00:05+00:00</updated>
        </entry></feed>"#;

        let feed = FeedParser::default().parse(xml).unwrap();
        assert_eq!(feed.link, "https://first.example/watch");
    }

    #[test]
    fn only_first_entry_is_consumed() {
        let xml = r#"<feed>
            <entry>
                <yt:videoId>first</yt:videoId>
                <published>2023-05-11T18:00:00+00:00</published>
                <updated>2023-05-11T18:00:05+00:00</updated>
            </entry>
            <entry>
                <yt:videoId>second</yt:videoId>
                <published>2023-05-11T18:00:00+00:00</published>
                <updated>2023-05-11T18:00:05+00:00</updated>
            </entry>
        </feed>"#;

        let feed = FeedParser::default().parse(xml).unwrap();
        assert_eq!(feed.video_id.as_str(), "first");
    }
}
