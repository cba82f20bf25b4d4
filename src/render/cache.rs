//! Slot pool that binds feed records to recycled rows.

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::feed::LiveFeed;
use crate::types::{MessageRecord, ViewerIdentity};
use tracing::{debug, trace, warn};

use super::slot::{RenderSlot, SlotId};
use super::style::StylePolicy;

/// Serves styled rows for a scrolling list backed by a [`LiveFeed`].
///
/// Slots are created lazily and never destroyed: a row that scrolls out of
/// sight is either offered back directly to [`bind`](Self::bind) or returned
/// with [`release`](Self::release) and picked up by the next bind that needs
/// a slot. Styling is derived again on every bind from the record's author
/// and the viewer, so a rebound slot never shows another row's look.
pub struct RenderSlotCache {
    feed: LiveFeed,
    viewer: ViewerIdentity,
    policy: StylePolicy,
    /// All slots ever created, indexed by `SlotId`.
    slots: Vec<RenderSlot>,
    /// Released slots, each exactly once. Mirrors the slots' `free` flags.
    free: Vec<SlotId>,
    /// Allocation size above which slot growth is reported.
    capacity: usize,
}

impl RenderSlotCache {
    pub fn new(
        feed: LiveFeed,
        viewer: ViewerIdentity,
        policy: StylePolicy,
        capacity: usize,
    ) -> Self {
        Self {
            feed,
            viewer,
            policy,
            slots: Vec::new(),
            free: Vec::new(),
            capacity,
        }
    }

    /// Build an unsubscribed cache from configuration.
    pub fn from_config(config: &FeedConfig, viewer: ViewerIdentity) -> Self {
        Self::new(
            LiveFeed::new(config.subscription_config()),
            viewer,
            config.style.clone(),
            config.slot_capacity,
        )
    }

    /// Number of rows available.
    pub fn count(&self) -> usize {
        self.feed.size()
    }

    pub fn record_at(&self, index: usize) -> Result<&MessageRecord> {
        self.feed.at(index)
    }

    /// Bind the record at `index` to a slot and return it.
    ///
    /// With `existing`, that slot is rebound. Otherwise a released slot is
    /// reused, or a new one is created when none is free. If the index is out
    /// of range or `existing` is unknown, no slot is touched.
    pub fn bind(&mut self, index: usize, existing: Option<SlotId>) -> Result<&RenderSlot> {
        let record = self.feed.at(index)?;
        let style = self.policy.style_for(self.viewer.is_author_of(record));

        let slot = match existing {
            Some(id) => {
                let slot = self
                    .slots
                    .get_mut(id.index())
                    .ok_or(FeedError::UnknownSlot(id))?;
                if slot.free {
                    slot.free = false;
                    if let Some(pos) = self.free.iter().position(|f| *f == id) {
                        self.free.swap_remove(pos);
                    }
                }
                slot
            }
            None => Self::acquire(&mut self.slots, &mut self.free, self.capacity),
        };

        slot.bind(index, record, style);
        trace!(slot = %slot.id(), index, "slot bound");
        Ok(&*slot)
    }

    /// Take a free slot or allocate a new one.
    fn acquire<'a>(
        slots: &'a mut Vec<RenderSlot>,
        free: &mut Vec<SlotId>,
        capacity: usize,
    ) -> &'a mut RenderSlot {
        if let Some(id) = free.pop() {
            let slot = &mut slots[id.index()];
            slot.free = false;
            return slot;
        }

        let id = SlotId(slots.len() as u32);
        if slots.len() >= capacity {
            warn!(allocated = slots.len() + 1, capacity, "render slots exceed capacity");
        } else {
            debug!(slot = %id, "allocating render slot");
        }
        slots.push(RenderSlot::new(id));
        &mut slots[id.index()]
    }

    /// Return a slot that is no longer visible to the pool.
    pub fn release(&mut self, id: SlotId) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(FeedError::UnknownSlot(id))?;
        if slot.free {
            return Err(FeedError::SlotAlreadyFree(id));
        }

        slot.free = true;
        self.free.push(id);
        Ok(())
    }

    /// Stable identity for the row at `index`.
    ///
    /// Rows have no natural key beyond their position, so this is the same
    /// value for every index and cannot be used to tell rows apart.
    pub fn identity_key_for(&self, _index: usize) -> u64 {
        0
    }

    pub fn slot(&self, id: SlotId) -> Option<&RenderSlot> {
        self.slots.get(id.index())
    }

    /// Number of slots ever created.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots waiting on the free list.
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    pub fn viewer(&self) -> &ViewerIdentity {
        &self.viewer
    }

    pub fn policy(&self) -> &StylePolicy {
        &self.policy
    }

    pub fn feed(&self) -> &LiveFeed {
        &self.feed
    }

    /// Mutable access for subscribing and pumping the feed.
    pub fn feed_mut(&mut self) -> &mut LiveFeed {
        &mut self.feed
    }
}

impl Default for RenderSlotCache {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default(), ViewerIdentity::anonymous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Alignment, Background, Color};
    use crate::source::{FeedEvent, RoomHub};
    use crate::types::EntryKey;
    use std::sync::Arc;

    fn msg(author: &str, body: &str) -> MessageRecord {
        MessageRecord::new(author, body).unwrap()
    }

    fn cache_for(viewer: &str, hub: &Arc<RoomHub>) -> RenderSlotCache {
        let mut cache = RenderSlotCache::new(
            LiveFeed::default(),
            ViewerIdentity::new(viewer).unwrap(),
            StylePolicy::default(),
            4,
        );
        cache.feed_mut().subscribe(hub.clone()).unwrap();
        cache
    }

    #[test]
    fn test_alice_and_bob() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);

        hub.post(msg("alice", "hi"));
        hub.post(msg("bob", "yo"));
        cache.feed_mut().pump();
        assert_eq!(cache.count(), 2);

        let own = cache.bind(0, None).unwrap();
        assert_eq!(own.style().alignment, Alignment::Trailing);
        assert_eq!(own.style().author_color, Color::GREEN);
        assert_eq!(own.style().background, Background::BubbleSelf);
        assert_eq!((own.author(), own.body()), ("alice", "hi"));

        let other = cache.bind(1, None).unwrap();
        assert_eq!(other.style().alignment, Alignment::Leading);
        assert_eq!(other.style().author_color, Color::BLUE);
        assert_eq!(other.style().background, Background::BubbleOther);
        assert_eq!((other.author(), other.body()), ("bob", "yo"));

        assert_eq!(cache.allocated(), 2);
    }

    #[test]
    fn test_bind_out_of_range_on_empty_feed() {
        let mut cache = RenderSlotCache::default();
        assert!(matches!(
            cache.bind(5, None),
            Err(FeedError::OutOfRange { index: 5, len: 0 })
        ));
        assert_eq!(cache.allocated(), 0);
    }

    #[test]
    fn test_rebind_reuses_slot_without_stale_content() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        hub.post(msg("alice", "a long first message"));
        hub.post(msg("bob", ""));
        cache.feed_mut().pump();

        let first = cache.bind(0, None).unwrap().id();
        let second = cache.bind(1, Some(first)).unwrap();

        assert_eq!(second.id(), first);
        assert_eq!(second.bound_index(), Some(1));
        assert_eq!(second.author(), "bob");
        assert_eq!(second.body(), "");
        assert_eq!(second.style().alignment, Alignment::Leading);
        assert_eq!(cache.allocated(), 1);
    }

    #[test]
    fn test_failed_bind_leaves_slot_untouched() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        hub.post(msg("alice", "hi"));
        cache.feed_mut().pump();

        let id = cache.bind(0, None).unwrap().id();
        let before = cache.slot(id).unwrap().clone();

        assert!(matches!(
            cache.bind(3, Some(id)),
            Err(FeedError::OutOfRange { .. })
        ));

        let after = cache.slot(id).unwrap();
        assert_eq!(after.bound_index(), before.bound_index());
        assert_eq!(after.author(), before.author());
        assert_eq!(after.body(), before.body());
        assert_eq!(after.style(), before.style());
    }

    #[test]
    fn test_unknown_slot() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        hub.post(msg("alice", "hi"));
        cache.feed_mut().pump();

        assert!(matches!(
            cache.bind(0, Some(SlotId(7))),
            Err(FeedError::UnknownSlot(SlotId(7)))
        ));
        assert!(matches!(
            cache.release(SlotId(7)),
            Err(FeedError::UnknownSlot(_))
        ));
    }

    #[test]
    fn test_released_slots_are_recycled() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        for i in 0..6 {
            hub.post(msg("bob", &i.to_string()));
        }
        cache.feed_mut().pump();

        let a = cache.bind(0, None).unwrap().id();
        let b = cache.bind(1, None).unwrap().id();
        assert_ne!(a, b);

        // Row 0 scrolls off the top, row 2 scrolls in.
        cache.release(a).unwrap();
        assert_eq!(cache.free_slots(), 1);
        let c = cache.bind(2, None).unwrap();
        assert_eq!(c.id(), a);
        assert_eq!(c.body(), "2");
        assert_eq!(cache.free_slots(), 0);
        assert_eq!(cache.allocated(), 2);

        assert!(cache.release(b).is_ok());
        assert!(matches!(cache.release(b), Err(FeedError::SlotAlreadyFree(_))));
    }

    #[test]
    fn test_reclaiming_released_slot_directly() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        hub.post(msg("bob", "0"));
        hub.post(msg("bob", "1"));
        cache.feed_mut().pump();

        let a = cache.bind(0, None).unwrap().id();
        cache.release(a).unwrap();

        // Offered back by the list before the pool handed it out again.
        cache.bind(1, Some(a)).unwrap();
        assert_eq!(cache.free_slots(), 0);

        // Reclaiming took it off the free list, so it is not handed out twice.
        let fresh = cache.bind(0, None).unwrap().id();
        assert_ne!(fresh, a);
        assert_eq!(cache.slot(a).unwrap().body(), "1");
    }

    #[test]
    fn test_release_and_direct_reclaim_keep_free_list_bounded() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        hub.post(msg("bob", "0"));
        cache.feed_mut().pump();

        let a = cache.bind(0, None).unwrap().id();
        let b = cache.bind(0, None).unwrap().id();
        for _ in 0..10_000 {
            cache.release(a).unwrap();
            cache.release(b).unwrap();
            cache.bind(0, Some(a)).unwrap();
            assert_eq!(cache.free.len(), 1);
            cache.bind(0, Some(b)).unwrap();
            assert!(cache.free.is_empty());
        }

        assert_eq!(cache.free_slots(), 0);
        let fresh = cache.bind(0, None).unwrap().id();
        assert_eq!(fresh, SlotId(2));
        assert_eq!(cache.allocated(), 3);
    }

    #[test]
    fn test_default_capacity_follows_config() {
        let cache = RenderSlotCache::default();
        assert_eq!(cache.capacity, FeedConfig::default().slot_capacity);
        assert_eq!(cache.viewer(), &ViewerIdentity::anonymous());
    }

    #[test]
    fn test_growth_past_capacity_still_allocates() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        for i in 0..10 {
            hub.post(msg("bob", &i.to_string()));
        }
        cache.feed_mut().pump();

        for i in 0..10 {
            cache.bind(i, None).unwrap();
        }
        assert_eq!(cache.allocated(), 10);
    }

    #[test]
    fn test_identity_key_is_constant() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("alice", &hub);
        hub.post(msg("alice", "0"));
        hub.post(msg("bob", "1"));
        cache.feed_mut().pump();

        assert_eq!(cache.identity_key_for(0), cache.identity_key_for(1));
    }

    #[test]
    fn test_styling_follows_viewer_not_slot_history() {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut cache = cache_for("bob", &hub);
        cache.feed_mut().on_event(FeedEvent::Added {
            key: EntryKey::from_counter(0),
            record: msg("bob", "mine"),
            previous_key: None,
        });
        cache.feed_mut().on_event(FeedEvent::Added {
            key: EntryKey::from_counter(1),
            record: msg("alice", "theirs"),
            previous_key: None,
        });

        let id = cache.bind(0, None).unwrap().id();
        let own_style = cache.slot(id).unwrap().style();
        cache.bind(1, Some(id)).unwrap();
        cache.bind(0, Some(id)).unwrap();

        assert_eq!(cache.slot(id).unwrap().style(), own_style);
        assert_eq!(own_style.alignment, Alignment::Trailing);
    }
}
