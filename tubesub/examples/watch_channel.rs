//! Subscribe to a channel's upload feed and print classified notifications.
//!
//! ```sh
//! cargo run --example watch_channel -- UC_x5XG1OV2P6uZZ5FSM9Ttw
//! ```
//!
//! The callback URL must be reachable by the hub for notifications to
//! arrive; behind NAT, use `subscribe_with_callback` with a public URL.

use tubesub::logging::{init_logging, LoggingMode};
use tubesub::{ChannelId, HubSubscriber, SubscriberConfig};

#[tokio::main]
async fn main() -> tubesub::Result<()> {
    let _ = init_logging(LoggingMode::Development);

    let channel = std::env::args()
        .nth(1)
        .map(ChannelId::new)
        .unwrap_or_else(|| ChannelId::new("UC_x5XG1OV2P6uZZ5FSM9Ttw"));

    let (subscriber, mut feeds) = HubSubscriber::start(SubscriberConfig::default()).await?;
    println!("callback listening at {}", subscriber.callback_url());

    // Five-day lease; rerun subscribe before it expires to stay registered.
    subscriber.subscribe(&channel, 432_000);

    while let Some(feed) = feeds.recv().await {
        let kind = if feed.new_video { "new upload" } else { "update" };
        println!(
            "[{kind}] {} — {} ({})",
            feed.title, feed.author, feed.link
        );
    }

    Ok(())
}
