//! Generic WebSub callback server for receiving hub notifications.
//!
//! This crate provides a lightweight HTTP server implementing the
//! subscriber side of the WebSub (PubSubHubbub) callback contract. It has
//! no knowledge of any particular feed format.
//!
//! # Overview
//!
//! The callback server consists of two main components:
//!
//! - [`CallbackServer`]: HTTP server that binds to a local port and serves
//!   the fixed callback path for both hub verification (GET) and content
//!   notification delivery (POST).
//! - [`NotificationHandler`]: the seam through which delivered notification
//!   bodies reach the consuming crate. [`ChannelHandler`] is a ready-made
//!   implementation that forwards raw bodies into a channel.
//!
//! # Protocol behavior
//!
//! 1. Verification requests (`GET /pubsubcallback?hub.challenge=...`) are
//!    answered by echoing the challenge token verbatim. A request without a
//!    challenge gets an empty success response.
//! 2. Notification deliveries (`POST /pubsubcallback`) are acknowledged
//!    with an empty `200 OK` unconditionally. A non-success status would be
//!    read by the hub as a delivery failure and trigger retries, so nothing
//!    the handler does can change the response.
//! 3. Empty notification bodies are acknowledged without invoking the
//!    handler.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use callback_server::{CallbackServer, ChannelHandler};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (tx, mut rx) = mpsc::unbounded_channel::<String>();
//!
//!     let server = CallbackServer::bind((8080, 8180), Arc::new(ChannelHandler::new(tx)))
//!         .await
//!         .expect("failed to start callback server");
//!
//!     println!("register this URL with the hub: {}", server.callback_url());
//!
//!     while let Some(body) = rx.recv().await {
//!         println!("notification: {body}");
//!     }
//! }
//! ```
//!
//! Domain-specific crates are expected to implement [`NotificationHandler`]
//! with their own parsing and dispatch logic rather than consuming raw
//! bodies; this crate stays a thin HTTP layer.
//!
//! # Private workspace crate
//!
//! This crate is intended for internal use within the workspace and is not
//! published to crates.io.

mod handler;
mod server;

pub use handler::{ChannelHandler, NotificationHandler};
pub use server::{CallbackServer, ServerError, CALLBACK_PATH};
