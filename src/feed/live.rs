//! Materializes a subscription's event stream into an ordered record list.

use crate::error::{FeedError, Result};
use crate::source::{
    CancelReason, FeedEvent, FeedSource, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};
use crate::types::{ArrivalSeq, MessageRecord};
use crossbeam_channel::TryRecvError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::observer::{FeedChange, FeedObserver, FeedStats, FeedStatus};

/// A registration held against a source.
struct ActiveSubscription {
    source: Arc<dyn FeedSource>,
    handle: SubscriptionHandle,
}

/// Locally ordered view of a remote message collection.
///
/// Events are queued by the source on the subscription channel and applied
/// only by [`LiveFeed::pump`], on the thread that owns the feed. Each
/// appended record is visible to `size`/`at` before the observer is told
/// about it.
///
/// The sequence only grows: `Added` appends in delivery order, while
/// `Changed`, `Removed` and `Moved` are accepted and ignored. Redelivered
/// entries are not deduplicated.
pub struct LiveFeed {
    /// Records in arrival order; index == arrival sequence.
    records: Vec<MessageRecord>,
    config: SubscriptionConfig,
    subscription: Option<ActiveSubscription>,
    status: FeedStatus,
    observer: Option<Box<dyn FeedObserver>>,
    cancel_reason: Option<CancelReason>,
    stats: FeedStats,
}

impl LiveFeed {
    /// Create an empty, detached feed.
    pub fn new(config: SubscriptionConfig) -> Self {
        Self {
            records: Vec::new(),
            config,
            subscription: None,
            status: FeedStatus::Detached,
            observer: None,
            cancel_reason: None,
            stats: FeedStats::default(),
        }
    }

    /// Register the single observer, returning the one it replaces.
    pub fn set_observer(
        &mut self,
        observer: Box<dyn FeedObserver>,
    ) -> Option<Box<dyn FeedObserver>> {
        self.observer.replace(observer)
    }

    pub fn clear_observer(&mut self) -> Option<Box<dyn FeedObserver>> {
        self.observer.take()
    }

    // --- Subscription lifecycle ---

    /// Subscribe to `source`. The feed starts over from an empty sequence.
    pub fn subscribe(&mut self, source: Arc<dyn FeedSource>) -> Result<SubscriptionId> {
        if self.subscription.is_some() {
            return Err(FeedError::AlreadySubscribed);
        }

        let handle = source.subscribe(self.config.clone());
        let id = handle.id;

        self.records.clear();
        self.cancel_reason = None;
        self.stats = FeedStats::default();
        self.status = FeedStatus::Live;
        self.subscription = Some(ActiveSubscription { source, handle });

        info!(id = id.0, "feed subscribed");
        Ok(id)
    }

    /// Release the source registration. Queued and in-flight events are
    /// discarded and no further notifications are raised.
    pub fn unsubscribe(&mut self) -> Result<()> {
        let subscription = self.subscription.take().ok_or(FeedError::NotSubscribed)?;
        let id = subscription.handle.id;

        subscription.source.unsubscribe(id);
        drop(subscription);
        self.status = FeedStatus::Detached;

        info!(id = id.0, records = self.records.len(), "feed unsubscribed");
        Ok(())
    }

    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(|s| s.handle.id)
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Why the source cancelled the subscription, if it did.
    pub fn cancel_reason(&self) -> Option<&CancelReason> {
        self.cancel_reason.as_ref()
    }

    /// The cancellation as an error, for screens that propagate it.
    pub fn error(&self) -> Option<FeedError> {
        self.cancel_reason
            .clone()
            .map(FeedError::SubscriptionCancelled)
    }

    // --- Apply loop ---

    /// Apply every queued event. Never blocks. Returns the number of events
    /// taken off the channel.
    pub fn pump(&mut self) -> usize {
        let mut drained = 0;

        while self.status == FeedStatus::Live {
            let next = match &self.subscription {
                Some(sub) => sub.handle.try_recv(),
                None => break,
            };

            match next {
                Ok(event) => {
                    self.on_event(event);
                    drained += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.cancel(CancelReason::Closed);
                    break;
                }
            }
        }

        drained
    }

    /// Wait up to `timeout` for an event, then apply everything queued.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        if self.status != FeedStatus::Live {
            return 0;
        }

        let first = match &self.subscription {
            Some(sub) => sub.handle.recv_timeout(timeout),
            None => return 0,
        };

        match first {
            Ok(event) => {
                self.on_event(event);
                1 + self.pump()
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => 0,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                self.cancel(CancelReason::Closed);
                0
            }
        }
    }

    /// Apply a single event. Events arriving while the feed is not live are
    /// dropped.
    pub fn on_event(&mut self, event: FeedEvent) -> Option<FeedChange> {
        if self.status != FeedStatus::Live {
            self.stats.dropped += 1;
            debug!(kind = event.kind(), status = ?self.status, "dropping event for inactive feed");
            return None;
        }

        match event {
            FeedEvent::Added { record, .. } => {
                let seq = ArrivalSeq(self.records.len() as u64);
                self.records.push(record);
                self.stats.added += 1;

                let change = FeedChange::Appended {
                    seq,
                    len: self.records.len(),
                };
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_feed_changed(&change);
                }
                Some(change)
            }
            FeedEvent::Changed { ref key, .. }
            | FeedEvent::Removed { ref key }
            | FeedEvent::Moved { ref key, .. } => {
                self.stats.ignored += 1;
                debug!(kind = event.kind(), key = %key, "ignoring non-append event");
                None
            }
            FeedEvent::Cancelled { reason } => {
                self.cancel(reason);
                None
            }
        }
    }

    fn cancel(&mut self, reason: CancelReason) {
        warn!(
            id = ?self.subscription_id(),
            %reason,
            records = self.records.len(),
            "feed subscription cancelled"
        );

        self.status = FeedStatus::Cancelled;
        self.cancel_reason = Some(reason.clone());

        if let Some(observer) = self.observer.as_mut() {
            observer.on_feed_cancelled(&FeedError::SubscriptionCancelled(reason));
        }
    }

    // --- Reads ---

    /// Number of materialized records.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`.
    pub fn at(&self, index: usize) -> Result<&MessageRecord> {
        self.records.get(index).ok_or(FeedError::OutOfRange {
            index,
            len: self.records.len(),
        })
    }

    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> {
        self.records.iter()
    }
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new(SubscriptionConfig::default())
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.source.unsubscribe(subscription.handle.id);
            debug!(id = subscription.handle.id.0, "feed dropped while subscribed");
        }
    }
}
