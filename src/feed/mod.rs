//! Live feed materialization.
//!
//! A [`LiveFeed`] subscribes to a [`FeedSource`](crate::source::FeedSource)
//! and rebuilds the room's messages as an append-only, index-addressable
//! sequence. Events cross threads on the subscription channel and are applied
//! by [`LiveFeed::pump`] on the thread that owns the feed, which then notifies
//! the registered [`FeedObserver`].

mod live;
mod observer;

pub use live::LiveFeed;
pub use observer::{FeedChange, FeedObserver, FeedStats, FeedStatus};
