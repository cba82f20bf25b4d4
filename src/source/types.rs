//! Event and subscription types for the feed store boundary.

use crate::types::{EntryKey, MessageRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max queued events before the subscriber is cancelled.
    /// Default: 1000
    pub buffer_size: usize,

    /// Replay entries already in the room as `Added` events before
    /// streaming live ones.
    /// Default: true
    pub replay: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            replay: true,
        }
    }
}

/// Events delivered by a feed source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A child entry was added after `previous_key` (None = first entry).
    Added {
        key: EntryKey,
        record: MessageRecord,
        previous_key: Option<EntryKey>,
    },

    /// An existing entry's content changed.
    Changed {
        key: EntryKey,
        record: MessageRecord,
    },

    /// An entry was removed.
    Removed {
        key: EntryKey,
    },

    /// An entry was repositioned after `previous_key`.
    Moved {
        key: EntryKey,
        previous_key: Option<EntryKey>,
    },

    /// The source terminated this subscription. Always the last event.
    Cancelled {
        reason: CancelReason,
    },
}

impl FeedEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Added { .. } => "added",
            FeedEvent::Changed { .. } => "changed",
            FeedEvent::Removed { .. } => "removed",
            FeedEvent::Moved { .. } => "moved",
            FeedEvent::Cancelled { .. } => "cancelled",
        }
    }
}

/// Why a source cancelled a subscription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Store-side failure, e.g. a permission error.
    Remote(String),
    /// The room went away.
    Closed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::BufferOverflow => write!(f, "buffer overflow"),
            CancelReason::Remote(message) => write!(f, "remote error: {}", message),
            CancelReason::Closed => write!(f, "source closed"),
        }
    }
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to a live subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<FeedEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<FeedEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<FeedEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<FeedEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// A push-based, ordered remote collection of messages.
///
/// Implementations must deliver `Added` events in the order the entries
/// were appended at the source and deliver `Cancelled` at most once, as the
/// final event of a subscription. After `unsubscribe` returns no further
/// events are sent for that id.
pub trait FeedSource: Send + Sync {
    fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle;

    fn unsubscribe(&self, id: SubscriptionId);
}
