//! Viewer-dependent styling for message rows.

use crate::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal placement of a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Leading,
    Trailing,
}

/// Speech-bubble background behind the message body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Bubble for the viewer's own messages.
    BubbleSelf,
    /// Bubble for everyone else's messages.
    BubbleOther,
}

/// ARGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const BLUE: Color = Color(0xFF00_00FF);

    /// Parse `#RRGGBB` (opaque) or `#AARRGGBB`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| FeedError::Config(format!("color must start with '#': {}", s)))?;
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| FeedError::Config(format!("invalid color: {}", s)))?;

        match digits.len() {
            6 => Ok(Color(0xFF00_0000 | value)),
            8 => Ok(Color(value)),
            _ => Err(FeedError::Config(format!("invalid color length: {}", s))),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:08X}", self.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = FeedError;

    fn try_from(s: String) -> Result<Self> {
        Color::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Styling applied to a bound slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotStyle {
    pub alignment: Alignment,
    pub author_color: Color,
    pub background: Background,
}

/// Maps "is this the viewer's message" to a row style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePolicy {
    /// Author label color for the viewer's own messages.
    pub accent_self: Color,
    /// Author label color for other people's messages.
    pub accent_other: Color,
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self {
            accent_self: Color::GREEN,
            accent_other: Color::BLUE,
        }
    }
}

impl StylePolicy {
    pub fn style_for(&self, is_own: bool) -> SlotStyle {
        if is_own {
            SlotStyle {
                alignment: Alignment::Trailing,
                author_color: self.accent_self,
                background: Background::BubbleSelf,
            }
        } else {
            SlotStyle {
                alignment: Alignment::Leading,
                author_color: self.accent_other,
                background: Background::BubbleOther,
            }
        }
    }
}
