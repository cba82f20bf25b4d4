//! Reusable presentation slots.

use crate::types::MessageRecord;
use std::fmt;

use super::style::{SlotStyle, StylePolicy};

/// Identifier of a slot within its cache.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u32);

impl SlotId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One visible row: author label, message body and their styling.
///
/// A slot is bound to at most one feed index at a time. Binding always
/// overwrites both text fields and the style, so nothing from a previous
/// binding survives.
#[derive(Clone, Debug)]
pub struct RenderSlot {
    id: SlotId,
    bound: Option<usize>,
    author: String,
    body: String,
    style: SlotStyle,
    /// On the cache's free list.
    pub(crate) free: bool,
}

impl RenderSlot {
    /// A fresh, unbound slot.
    pub(crate) fn new(id: SlotId) -> Self {
        Self {
            id,
            bound: None,
            author: String::new(),
            body: String::new(),
            style: StylePolicy::default().style_for(false),
            free: false,
        }
    }

    /// Rebind to `index`. Text buffers are reused.
    pub(crate) fn bind(&mut self, index: usize, record: &MessageRecord, style: SlotStyle) {
        self.bound = Some(index);
        self.style = style;

        self.author.clear();
        self.author.push_str(record.author());
        self.body.clear();
        self.body.push_str(record.body());
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Feed index this slot currently shows.
    pub fn bound_index(&self) -> Option<usize> {
        self.bound
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn style(&self) -> SlotStyle {
        self.style
    }
}
