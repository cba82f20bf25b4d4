//! # Live Feed
//!
//! Turns a push stream of chat-room events into a stable, index-addressable
//! list of styled rows for a scrolling UI that recycles a few row views.
//!
//! ## Core Concepts
//!
//! - **Source**: a push-based, ordered remote collection of messages
//! - **Live feed**: the append-only local copy rebuilt from the event stream
//! - **Render slots**: recycled rows bound to feed indices and styled for
//!   the current viewer
//!
//! ## Example
//!
//! ```ignore
//! use live_feed::{FeedConfig, MessageRecord, RenderSlotCache, RoomHub, ViewerIdentity};
//! use std::sync::Arc;
//!
//! let config = FeedConfig::default();
//! let hub = Arc::new(RoomHub::new(config.room.clone()));
//!
//! let mut rows = RenderSlotCache::from_config(&config, ViewerIdentity::new("alice")?);
//! rows.feed_mut().subscribe(hub.clone())?;
//!
//! hub.post(MessageRecord::new("bob", "hey")?);
//! rows.feed_mut().pump();
//!
//! let slot = rows.bind(0, None)?;
//! println!("{}: {}", slot.author(), slot.body());
//!
//! rows.feed_mut().unsubscribe()?;
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod render;
pub mod source;
pub mod types;

// Re-exports
pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use feed::{FeedChange, FeedObserver, FeedStats, FeedStatus, LiveFeed};
pub use render::{
    Alignment, Background, Color, RenderSlot, RenderSlotCache, SlotId, SlotStyle, StylePolicy,
};
pub use source::{
    CancelReason, FeedEvent, FeedSource, RoomHub, SubscriptionConfig, SubscriptionHandle,
    SubscriptionId,
};
pub use types::*;
