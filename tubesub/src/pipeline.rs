//! The notification-path pipeline: parse, deduplicate, dispatch.

use async_trait::async_trait;
use callback_server::NotificationHandler;
use tokio::sync::mpsc;
use tracing::debug;

use crate::dedup::DedupStore;
use crate::feed::FeedParser;
use crate::types::VideoFeed;

/// Orchestrates [`FeedParser`] and [`DedupStore`] for every delivered
/// notification and dispatches the classified result into a channel.
///
/// Unparseable payloads are logged at debug level and dropped; the HTTP
/// layer has already committed to acknowledging the delivery, so a parse
/// failure is never a protocol error. On redelivery of an already-seen
/// video the parser's timestamp heuristic is overridden and the feed goes
/// out with `new_video == false`, which makes "at most one new-video event
/// per video id" an invariant of the whole pipeline.
pub struct NotificationPipeline {
    parser: FeedParser,
    dedup: DedupStore,
    feed_tx: mpsc::UnboundedSender<VideoFeed>,
}

impl NotificationPipeline {
    /// Create a pipeline dispatching classified feeds into `feed_tx`.
    pub fn new(parser: FeedParser, feed_tx: mpsc::UnboundedSender<VideoFeed>) -> Self {
        Self {
            parser,
            dedup: DedupStore::new(),
            feed_tx,
        }
    }

    /// Number of distinct videos observed so far.
    pub fn seen_videos(&self) -> usize {
        self.dedup.len()
    }
}

#[async_trait]
impl NotificationHandler for NotificationPipeline {
    async fn handle(&self, body: String) {
        let mut feed = match self.parser.parse(&body) {
            Ok(feed) => feed,
            Err(error) => {
                debug!(%error, "dropping unparseable notification");
                return;
            }
        };

        if !self.dedup.first_sighting(&feed.video_id) {
            debug!(video = %feed.video_id, "redelivery, downgrading to metadata update");
            feed.new_video = false;
        }

        if self.feed_tx.send(feed).is_err() {
            debug!("feed receiver dropped, notification discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn notification(video_id: &str, delta_seconds: i64) -> String {
        let published = 1_683_828_000i64;
        let updated = published + delta_seconds;
        format!(
            r#"<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <yt:videoId>{video_id}</yt:videoId>
    <yt:channelId>UCtestchannel</yt:channelId>
    <title>Test upload</title>
    <published>{}</published>
    <updated>{}</updated>
  </entry>
</feed>"#,
            chrono::DateTime::from_timestamp(published, 0).unwrap().to_rfc3339(),
            chrono::DateTime::from_timestamp(updated, 0).unwrap().to_rfc3339(),
        )
    }

    fn pipeline() -> (NotificationPipeline, mpsc::UnboundedReceiver<VideoFeed>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (NotificationPipeline::new(FeedParser::default(), tx), rx)
    }

    #[tokio::test]
    async fn first_sighting_dispatches_new_video() {
        let (pipeline, mut rx) = pipeline();

        pipeline.handle(notification("vid1", 5)).await;

        let feed = rx.try_recv().unwrap();
        assert_eq!(feed.video_id.as_str(), "vid1");
        assert!(feed.new_video);
        assert_eq!(pipeline.seen_videos(), 1);
    }

    #[tokio::test]
    async fn redelivery_is_downgraded() {
        let (pipeline, mut rx) = pipeline();

        pipeline.handle(notification("vid1", 5)).await;
        pipeline.handle(notification("vid1", 5)).await;

        assert!(rx.try_recv().unwrap().new_video);
        assert!(!rx.try_recv().unwrap().new_video);
        assert_eq!(pipeline.seen_videos(), 1);
    }

    #[tokio::test]
    async fn large_delta_is_a_metadata_update() {
        let (pipeline, mut rx) = pipeline();

        pipeline.handle(notification("vid1", 3600)).await;

        assert!(!rx.try_recv().unwrap().new_video);
    }

    #[tokio::test]
    async fn unparseable_payload_dispatches_nothing() {
        let (pipeline, mut rx) = pipeline();

        pipeline.handle("not xml at all".to_string()).await;
        pipeline.handle(String::new()).await;
        pipeline.handle("<feed></feed>".to_string()).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(pipeline.seen_videos(), 0);
    }

    #[tokio::test]
    async fn empty_video_id_keeps_heuristic_on_every_delivery() {
        let (pipeline, mut rx) = pipeline();

        pipeline.handle(notification("", 5)).await;
        pipeline.handle(notification("", 5)).await;

        // Empty ids never enter the store, so neither delivery is treated
        // as a redelivery of the other.
        assert!(rx.try_recv().unwrap().new_video);
        assert!(rx.try_recv().unwrap().new_video);
        assert_eq!(pipeline.seen_videos(), 0);
    }

    proptest! {
        /// For any sequence of deliveries sharing one video id, at most one
        /// dispatched feed classifies as a new video.
        #[test]
        fn at_most_one_new_video_per_id(deltas in proptest::collection::vec(-120i64..600, 1..20)) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let (pipeline, mut rx) = pipeline();

                for delta in &deltas {
                    pipeline.handle(notification("contested", *delta)).await;
                }
                drop(pipeline);

                let mut new_videos = 0;
                while let Some(feed) = rx.recv().await {
                    if feed.new_video {
                        new_videos += 1;
                    }
                }
                prop_assert!(new_videos <= 1);
                Ok(())
            })?;
        }
    }
}
