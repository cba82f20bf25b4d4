//! Change notifications and status reporting for a live feed.

use crate::error::FeedError;
use crate::types::ArrivalSeq;

/// A change applied to the materialized sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedChange {
    /// A record was appended at `seq`; the feed now holds `len` records.
    Appended { seq: ArrivalSeq, len: usize },
}

/// Receives notifications from a [`LiveFeed`](super::LiveFeed).
///
/// Notifications are raised on the thread that applies events, after the
/// sequence has been updated, so the observer may read the feed's new state.
pub trait FeedObserver: Send {
    fn on_feed_changed(&mut self, change: &FeedChange);

    /// Called once when the source cancels the subscription.
    fn on_feed_cancelled(&mut self, _error: &FeedError) {}
}

/// Subscription state of a feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedStatus {
    /// Not subscribed (never, or after `unsubscribe`).
    Detached,
    /// Receiving events.
    Live,
    /// The source terminated the subscription; records remain readable.
    Cancelled,
}

/// Event counters for a feed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// `Added` events appended.
    pub added: u64,
    /// `Changed`, `Removed` and `Moved` events accepted without effect.
    pub ignored: u64,
    /// Events discarded because the feed was not live.
    pub dropped: u64,
}
