use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque recipient identifier.
///
/// For the Telegram transport this is the chat id rendered as a decimal
/// string, but nothing in the scheduler core depends on that shape — it is
/// only ever compared, hashed and used as a document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipientId(pub String);

impl RecipientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecipientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecipientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for RecipientId {
    fn from(chat_id: i64) -> Self {
        Self(chat_id.to_string())
    }
}

/// Profile snapshot captured at registration.
///
/// Refreshed whenever the recipient registers again; surfaced in the
/// error log when a recipient is blocked so the operator can tell who
/// dropped off without cross-referencing ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub handle: Option<String>,
}

/// One unit of deliverable content.
///
/// Loaded from the catalog document at startup and immutable for the
/// process lifetime. `available_from` gates delivery: unset means always
/// available, a date means not before that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable identifier, unique within the catalog.
    pub id: u32,
    /// Caption (media items) or the full message body (text-only items).
    pub text: String,
    /// Path to the media file to attach, if any.
    #[serde(default)]
    pub media: Option<PathBuf>,
    /// Earliest calendar date this item may be delivered.
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
}
