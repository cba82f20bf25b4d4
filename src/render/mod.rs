//! Render slot cache.
//!
//! A scrolling list keeps only a handful of row views alive and rebinds them
//! as the user scrolls. [`RenderSlotCache`] owns those rows as typed
//! [`RenderSlot`]s and, for each requested index:
//! - Reuses the offered slot, a released one, or allocates a new one
//! - Copies the record's author and body into the slot
//! - Derives alignment, author color and bubble from whether the viewer
//!   wrote the message ([`StylePolicy`])

mod cache;
mod slot;
mod style;

pub use cache::RenderSlotCache;
pub use slot::{RenderSlot, SlotId};
pub use style::{Alignment, Background, Color, SlotStyle, StylePolicy};
