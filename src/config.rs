//! Screen-level configuration.

use crate::error::{FeedError, Result};
use crate::render::StylePolicy;
use crate::source::SubscriptionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a chat screen's feed and row cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Child path of the room's messages.
    /// Default: "messages"
    pub room: String,

    /// Max queued events before the source cancels the subscription.
    /// Default: 1000
    pub buffer_size: usize,

    /// Replay existing messages when subscribing.
    /// Default: true
    pub replay: bool,

    /// Number of render slots expected to be alive at once.
    /// Default: 32
    pub slot_capacity: usize,

    /// Row styling.
    pub style: StylePolicy,
}

impl Default for FeedConfig {
    fn default() -> Self {
        let subscription = SubscriptionConfig::default();
        Self {
            room: "messages".to_string(),
            buffer_size: subscription.buffer_size,
            replay: subscription.replay,
            slot_capacity: 32,
            style: StylePolicy::default(),
        }
    }
}

impl FeedConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let config: FeedConfig = serde_json::from_slice(&bytes)
            .map_err(|e| FeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.room.is_empty() {
            return Err(FeedError::Config("room must not be empty".into()));
        }
        if self.buffer_size == 0 {
            return Err(FeedError::Config("buffer_size must be positive".into()));
        }
        Ok(())
    }

    pub fn subscription_config(&self) -> SubscriptionConfig {
        SubscriptionConfig {
            buffer_size: self.buffer_size,
            replay: self.replay,
        }
    }
}
