//! # tubesub
//!
//! A WebSub (PubSubHubbub) subscriber for YouTube channel upload
//! notifications.
//!
//! The hub pushes an Atom document to a callback URL whenever a channel
//! uploads or edits a video. This crate registers that interest, answers
//! the hub's verification challenge, parses each notification into a
//! [`VideoFeed`], suppresses redeliveries, and classifies every event as a
//! fresh upload or a metadata update before handing it to the caller over
//! a channel.
//!
//! # Overview
//!
//! - [`HubSubscriber`] wires everything together: it starts the callback
//!   server and exposes the outbound subscribe/unsubscribe calls.
//! - [`FeedParser`] turns a raw notification payload into a [`VideoFeed`],
//!   or a typed [`ParseError`]; never a partial entity.
//! - [`DedupStore`] remembers every video id seen during the process
//!   lifetime so a redelivered notification cannot classify as new twice.
//! - [`NotificationPipeline`] is the notification-path state machine
//!   (parse, dedup override, dispatch) plugged into the HTTP layer.
//! - [`SubscriptionManager`] issues the fire-and-forget subscribe request;
//!   lease renewal is the caller's job, there is no internal scheduler.
//!
//! Inbound failures never surface to the hub: the callback endpoint
//! acknowledges every delivery with a success status, because anything
//! else is read as a delivery failure and triggers retries and eventual
//! unsubscription.
//!
//! # Example
//!
//! ```no_run
//! use tubesub::{ChannelId, HubSubscriber, SubscriberConfig};
//!
//! #[tokio::main]
//! async fn main() -> tubesub::Result<()> {
//!     let (subscriber, mut feeds) = HubSubscriber::start(SubscriberConfig::default()).await?;
//!
//!     subscriber.subscribe(&ChannelId::new("UC_x5XG1OV2P6uZZ5FSM9Ttw"), 432_000);
//!
//!     while let Some(feed) = feeds.recv().await {
//!         let kind = if feed.new_video { "new upload" } else { "update" };
//!         println!("[{kind}] {} — {}", feed.title, feed.link);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod dedup;
mod error;
mod feed;
pub mod logging;
mod pipeline;
mod subscriber;
mod subscription;
mod types;

pub use callback_server::CALLBACK_PATH;
pub use config::{SubscriberConfig, DEFAULT_HUB_URL};
pub use dedup::DedupStore;
pub use error::{ParseError, Result, SubscribeError, SubscriberError};
pub use feed::{FeedParser, DEFAULT_NEW_VIDEO_THRESHOLD};
pub use pipeline::NotificationPipeline;
pub use subscriber::HubSubscriber;
pub use subscription::{topic_url, SubscriptionManager};
pub use types::{ChannelId, VideoFeed, VideoId};
