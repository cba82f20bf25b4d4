//! Feed store boundary.
//!
//! This module defines what the live feed consumes from the remote store:
//! - A push stream of [`FeedEvent`]s per subscription
//! - Explicit subscribe/unsubscribe through the [`FeedSource`] trait
//!
//! [`RoomHub`] is an in-process room that implements the trait. It keeps the
//! room's entries, replays them to new subscribers and broadcasts every
//! mutation over bounded channels, cancelling subscribers that fall behind.
//!
//! # Example
//!
//! ```ignore
//! let hub = RoomHub::new("messages");
//! let handle = hub.subscribe(SubscriptionConfig::default());
//!
//! hub.post(MessageRecord::new("alice", "hi")?);
//!
//! loop {
//!     match handle.recv() {
//!         Ok(FeedEvent::Added { record, .. }) => println!("{}: {}", record.author(), record.body()),
//!         Ok(FeedEvent::Cancelled { reason }) => break,
//!         Ok(_) => {}
//!         Err(_) => break,
//!     }
//! }
//! ```

mod hub;
mod types;

pub use hub::RoomHub;
pub use types::{
    CancelReason, FeedEvent, FeedSource, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};
