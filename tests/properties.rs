//! Property tests over arbitrary event streams and bind sequences.

use live_feed::{
    CancelReason, EntryKey, FeedEvent, LiveFeed, MessageRecord, RenderSlotCache, RoomHub,
    StylePolicy, ViewerIdentity,
};
use proptest::prelude::*;
use std::sync::Arc;

const VIEWER: &str = "alice";

fn author() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(VIEWER.to_string()),
        Just("bob".to_string()),
        Just("Alice".to_string()),
        "[a-z]{1,6}",
    ]
}

fn record() -> impl Strategy<Value = MessageRecord> {
    (author(), ".{0,12}").prop_map(|(a, b)| MessageRecord::new(a, b).unwrap())
}

fn key() -> impl Strategy<Value = EntryKey> {
    (0u64..64).prop_map(EntryKey::from_counter)
}

fn event() -> impl Strategy<Value = FeedEvent> {
    prop_oneof![
        4 => (key(), record(), proptest::option::of(key())).prop_map(|(key, record, previous_key)| {
            FeedEvent::Added { key, record, previous_key }
        }),
        1 => (key(), record()).prop_map(|(key, record)| FeedEvent::Changed { key, record }),
        1 => key().prop_map(|key| FeedEvent::Removed { key }),
        1 => (key(), proptest::option::of(key()))
            .prop_map(|(key, previous_key)| FeedEvent::Moved { key, previous_key }),
    ]
}

fn live_feed(hub: &Arc<RoomHub>) -> LiveFeed {
    let mut feed = LiveFeed::default();
    feed.subscribe(hub.clone()).unwrap();
    feed
}

fn added_records(events: &[FeedEvent]) -> Vec<MessageRecord> {
    events
        .iter()
        .filter_map(|e| match e {
            FeedEvent::Added { record, .. } => Some(record.clone()),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_growth_is_monotonic_and_counts_added(events in prop::collection::vec(event(), 0..60)) {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut feed = live_feed(&hub);

        let mut last = 0;
        let mut added = 0;
        for event in events {
            if matches!(event, FeedEvent::Added { .. }) {
                added += 1;
            }
            feed.on_event(event);
            prop_assert!(feed.size() >= last);
            prop_assert_eq!(feed.size(), added);
            last = feed.size();
        }
    }

    #[test]
    fn prop_delivery_order_is_kept(events in prop::collection::vec(event(), 0..60)) {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut feed = live_feed(&hub);

        let expected = added_records(&events);
        for event in events {
            feed.on_event(event);
        }

        prop_assert_eq!(feed.records(), expected.as_slice());
    }

    #[test]
    fn prop_rebinding_never_shows_stale_content(
        records in prop::collection::vec(record(), 1..30),
        binds in prop::collection::vec(any::<prop::sample::Index>(), 1..40),
    ) {
        let hub = Arc::new(RoomHub::new("messages"));
        for record in &records {
            hub.post(record.clone());
        }

        let mut rows = RenderSlotCache::new(
            LiveFeed::default(),
            ViewerIdentity::new(VIEWER).unwrap(),
            StylePolicy::default(),
            1,
        );
        rows.feed_mut().subscribe(hub.clone()).unwrap();
        rows.feed_mut().pump();

        let id = rows.bind(0, None).unwrap().id();
        for choice in binds {
            let index = choice.index(records.len());
            let slot = rows.bind(index, Some(id)).unwrap();
            prop_assert_eq!(slot.id(), id);
            prop_assert_eq!(slot.bound_index(), Some(index));
            prop_assert_eq!(slot.author(), records[index].author());
            prop_assert_eq!(slot.body(), records[index].body());
        }
        prop_assert_eq!(rows.allocated(), 1);
    }

    #[test]
    fn prop_styling_depends_only_on_authorship(
        records in prop::collection::vec(record(), 1..30),
        order in prop::collection::vec(any::<prop::sample::Index>(), 1..40),
    ) {
        let hub = Arc::new(RoomHub::new("messages"));
        for record in &records {
            hub.post(record.clone());
        }

        let policy = StylePolicy::default();
        let mut rows = RenderSlotCache::new(
            LiveFeed::default(),
            ViewerIdentity::new(VIEWER).unwrap(),
            policy.clone(),
            4,
        );
        rows.feed_mut().subscribe(hub.clone()).unwrap();
        rows.feed_mut().pump();

        let mut previous = None;
        for choice in order {
            let index = choice.index(records.len());
            let slot = rows.bind(index, previous).unwrap();
            let expected = policy.style_for(records[index].author() == VIEWER);
            prop_assert_eq!(slot.style(), expected);
            previous = Some(slot.id());
        }
    }

    #[test]
    fn prop_unsubscribed_feed_ignores_everything(
        before in prop::collection::vec(record(), 0..10),
        after in prop::collection::vec(event(), 0..30),
    ) {
        let hub = Arc::new(RoomHub::new("messages"));
        let mut feed = live_feed(&hub);

        for record in &before {
            hub.post(record.clone());
        }
        feed.pump();
        feed.unsubscribe().unwrap();

        let snapshot = feed.records().to_vec();
        for event in after {
            feed.on_event(event);
        }
        hub.post(MessageRecord::new("bob", "late").unwrap());
        hub.cancel_all(CancelReason::Closed);
        feed.pump();

        prop_assert_eq!(feed.records(), snapshot.as_slice());
        prop_assert_eq!(feed.size(), before.len());
    }
}
