//! Error types for the live feed.

use crate::render::SlotId;
use crate::source::CancelReason;
use crate::types::EntryKey;
use thiserror::Error;

/// Main error type for feed and render operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index {index} out of range (feed has {len} records)")]
    OutOfRange { index: usize, len: usize },

    #[error("Subscription cancelled: {0}")]
    SubscriptionCancelled(CancelReason),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Feed is not subscribed")]
    NotSubscribed,

    #[error("Feed is already subscribed")]
    AlreadySubscribed,

    #[error("Unknown render slot: {0}")]
    UnknownSlot(SlotId),

    #[error("Render slot already free: {0}")]
    SlotAlreadyFree(SlotId),

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryKey),

    #[error("Viewer identity must not be empty")]
    InvalidIdentity,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Decode(e.to_string())
    }
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
