//! Core types for the live feed.

use crate::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire field holding the sender's display name.
const WIRE_AUTHOR: &str = "author";

/// Wire field holding the message text.
const WIRE_BODY: &str = "message";

/// Display name used when the viewer has none.
const ANONYMOUS: &str = "Anonymous";

/// Arrival position in a materialized feed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct ArrivalSeq(pub u64);

impl fmt::Debug for ArrivalSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arrival({})", self.0)
    }
}

/// Key the remote collection assigns to a child entry.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryKey(pub String);

impl EntryKey {
    /// Key for the `n`-th entry pushed into a room. Zero padding keeps
    /// lexical order equal to push order.
    pub fn from_counter(n: u64) -> Self {
        EntryKey(format!("m{:016x}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryKey({})", self.0)
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single chat message.
///
/// Records are immutable once created. The author is never empty; the body
/// may be. Serde goes through the wire form, so a deserialized record is
/// validated like one built with [`MessageRecord::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub struct MessageRecord {
    author: String,
    body: String,
}

impl MessageRecord {
    /// Create a record, rejecting an empty author.
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Result<Self> {
        let author = author.into();
        if author.is_empty() {
            return Err(FeedError::Decode("author must not be empty".into()));
        }
        Ok(Self {
            author,
            body: body.into(),
        })
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode a record from its wire form: `{"author": .., "message": ..}`.
    ///
    /// Missing fields, non-string fields and empty authors are errors. Extra
    /// fields are ignored.
    pub fn decode(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| FeedError::Decode(format!("expected object, got {}", value)))?;

        let field = |name: &str| -> Result<String> {
            match object.get(name) {
                Some(serde_json::Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(FeedError::Decode(format!(
                    "field `{}` must be a string, got {}",
                    name, other
                ))),
                None => Err(FeedError::Decode(format!("missing field `{}`", name))),
            }
        };

        Self::new(field(WIRE_AUTHOR)?, field(WIRE_BODY)?)
    }

    /// Decode a record from raw JSON bytes.
    pub fn decode_slice(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::decode(&value)
    }

    /// Encode to the wire form accepted by [`MessageRecord::decode`].
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            WIRE_AUTHOR: self.author,
            WIRE_BODY: self.body,
        })
    }
}

/// Serde shape of a [`MessageRecord`], matching `decode`/`to_wire`.
#[derive(Serialize, Deserialize)]
struct WireRecord {
    author: String,
    message: String,
}

impl TryFrom<WireRecord> for MessageRecord {
    type Error = FeedError;

    fn try_from(wire: WireRecord) -> Result<Self> {
        Self::new(wire.author, wire.message)
    }
}

impl From<MessageRecord> for WireRecord {
    fn from(record: MessageRecord) -> Self {
        WireRecord {
            author: record.author,
            message: record.body,
        }
    }
}

/// Display name of the locally authenticated user.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewerIdentity(String);

impl ViewerIdentity {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(FeedError::InvalidIdentity);
        }
        Ok(Self(name))
    }

    /// Name shown for users who never set one.
    pub fn anonymous() -> Self {
        Self(ANONYMOUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `record` was written by this viewer. Exact comparison.
    pub fn is_author_of(&self, record: &MessageRecord) -> bool {
        record.author == self.0
    }
}

impl TryFrom<String> for ViewerIdentity {
    type Error = FeedError;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl From<ViewerIdentity> for String {
    fn from(viewer: ViewerIdentity) -> Self {
        viewer.0
    }
}

impl fmt::Debug for ViewerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Viewer({})", self.0)
    }
}
