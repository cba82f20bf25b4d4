//! In-process room that broadcasts message events to subscribers.

use crate::error::{FeedError, Result};
use crate::types::{EntryKey, MessageRecord};
use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::types::{
    CancelReason, FeedEvent, FeedSource, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};

/// Internal subscription state.
struct Subscription {
    sender: Sender<FeedEvent>,
    /// Queued events allowed before the subscriber counts as overflowed.
    /// The channel holds one extra slot for the final `Cancelled`.
    limit: usize,
}

impl Subscription {
    /// Try to send an event. Returns false if the subscriber is full or gone.
    fn try_send(&self, event: FeedEvent) -> bool {
        if self.sender.len() >= self.limit {
            return false;
        }
        self.sender.try_send(event).is_ok()
    }

    /// Send the terminal event into the reserved slot (best effort).
    fn cancel(&self, reason: CancelReason) {
        let _ = self.sender.try_send(FeedEvent::Cancelled { reason });
    }
}

/// An ordered collection of messages under one room path.
///
/// Every mutation holds the entry lock while it broadcasts, so all
/// subscribers observe mutations in the same order they were applied, and a
/// subscriber registered concurrently with a post sees the entry exactly once
/// (either in its replay or live).
pub struct RoomHub {
    /// Child path of the room (e.g. "messages").
    path: String,
    /// Entries in room order.
    entries: RwLock<Vec<(EntryKey, MessageRecord)>>,
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    /// Counter for generating entry keys.
    next_key: AtomicU64,
}

impl RoomHub {
    /// Create an empty room.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(Vec::new()),
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            next_key: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of entries in the room.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current room contents in order.
    pub fn records(&self) -> Vec<MessageRecord> {
        self.entries.read().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    // --- Mutations ---

    /// Append a message and broadcast it. Returns the new entry's key.
    pub fn post(&self, record: MessageRecord) -> EntryKey {
        let key = EntryKey::from_counter(self.next_key.fetch_add(1, Ordering::SeqCst));

        let mut entries = self.entries.write();
        let previous_key = entries.last().map(|(k, _)| k.clone());
        entries.push((key.clone(), record.clone()));

        self.broadcast(FeedEvent::Added {
            key: key.clone(),
            record,
            previous_key,
        });

        key
    }

    /// Decode a wire value and post it. Nothing is stored if decoding fails.
    pub fn post_wire(&self, value: &serde_json::Value) -> Result<EntryKey> {
        let record = MessageRecord::decode(value)?;
        Ok(self.post(record))
    }

    /// Replace the content of an existing entry.
    pub fn change(&self, key: &EntryKey, record: MessageRecord) -> Result<()> {
        let mut entries = self.entries.write();
        let pos = Self::position(&entries, key)?;
        entries[pos].1 = record.clone();

        self.broadcast(FeedEvent::Changed {
            key: key.clone(),
            record,
        });
        Ok(())
    }

    /// Remove an entry.
    pub fn remove(&self, key: &EntryKey) -> Result<MessageRecord> {
        let mut entries = self.entries.write();
        let pos = Self::position(&entries, key)?;
        let (_, record) = entries.remove(pos);

        self.broadcast(FeedEvent::Removed { key: key.clone() });
        Ok(record)
    }

    /// Reposition an entry directly after `previous_key` (None = to the front).
    pub fn move_entry(&self, key: &EntryKey, previous_key: Option<&EntryKey>) -> Result<()> {
        let mut entries = self.entries.write();
        let pos = Self::position(&entries, key)?;
        let prev_pos = match previous_key {
            Some(prev) => Some(Self::position(&entries, prev)?),
            None => None,
        };

        if previous_key != Some(key) {
            let entry = entries.remove(pos);
            let insert_at = match prev_pos {
                Some(p) if p > pos => p,
                Some(p) => p + 1,
                None => 0,
            };
            entries.insert(insert_at, entry);
        }

        self.broadcast(FeedEvent::Moved {
            key: key.clone(),
            previous_key: previous_key.cloned(),
        });
        Ok(())
    }

    /// Cancel every subscription with `reason`. The room stays usable for
    /// new subscribers.
    pub fn cancel_all(&self, reason: CancelReason) {
        let _entries = self.entries.read();
        let mut subs = self.subscriptions.write();
        for (id, sub) in subs.drain() {
            debug!(room = %self.path, id = id.0, %reason, "cancelling subscription");
            sub.cancel(reason.clone());
        }
    }

    fn position(entries: &[(EntryKey, MessageRecord)], key: &EntryKey) -> Result<usize> {
        entries
            .iter()
            .position(|(k, _)| k == key)
            .ok_or_else(|| FeedError::EntryNotFound(key.clone()))
    }

    /// Internal broadcast helper. Cancels subscribers that fail to receive.
    /// Callers hold the entry lock.
    fn broadcast(&self, event: FeedEvent) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    warn!(room = %self.path, id = id.0, "dropping slow subscriber");
                    sub.cancel(CancelReason::BufferOverflow);
                }
            }
        }
    }
}

impl FeedSource for RoomHub {
    /// Register a subscriber, replaying existing entries first when
    /// `config.replay` is set. A replay that does not fit the buffer cancels
    /// the subscription immediately.
    fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let limit = config.buffer_size.max(1);
        let (sender, receiver) = bounded(limit + 1);
        let subscription = Subscription { sender, limit };

        let entries = self.entries.read();

        if config.replay {
            let mut previous_key = None;
            for (key, record) in entries.iter() {
                let event = FeedEvent::Added {
                    key: key.clone(),
                    record: record.clone(),
                    previous_key: previous_key.clone(),
                };
                if !subscription.try_send(event) {
                    warn!(room = %self.path, id = id.0, replay = entries.len(), "replay exceeds buffer");
                    subscription.cancel(CancelReason::BufferOverflow);
                    return SubscriptionHandle { id, receiver };
                }
                previous_key = Some(key.clone());
            }
        }

        self.subscriptions.write().insert(id, subscription);
        debug!(room = %self.path, id = id.0, replayed = entries.len(), "subscription registered");

        SubscriptionHandle { id, receiver }
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscriptions.write().remove(&id).is_some() {
            debug!(room = %self.path, id = id.0, "subscription removed");
        }
    }
}

impl Drop for RoomHub {
    fn drop(&mut self) {
        for (_, sub) in self.subscriptions.get_mut().drain() {
            sub.cancel(CancelReason::Closed);
        }
    }
}
