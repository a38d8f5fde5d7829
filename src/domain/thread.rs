//! Thread domain types.
//!
//! Represents email threads (conversations) which group related messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LabelId, Message, ThreadId};

/// A complete email thread with all messages.
///
/// Messages are ordered by date ascending; the last element is the most
/// recent message and the one being classified. Every message carries the
/// same thread id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Unique identifier for this thread.
    pub id: ThreadId,
    /// All messages in the thread, ordered by date ascending.
    pub messages: Vec<Message>,
    /// Union of labels across the thread's messages.
    pub labels: Vec<LabelId>,
}

impl Thread {
    /// Returns the most recent message, if any.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the date of the most recent message, if any.
    pub fn last_message_date(&self) -> Option<DateTime<Utc>> {
        self.latest().map(|m| m.date)
    }

    /// Returns the thread subject, taken from the first message.
    pub fn subject(&self) -> Option<&str> {
        self.messages.first().and_then(|m| m.subject.as_deref())
    }

    /// Returns true if the thread carries the given label.
    pub fn has_label(&self, label_id: &LabelId) -> bool {
        self.labels.contains(label_id)
    }
}

/// A lightweight reference to a thread returned by listing, before the full
/// message set is fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    /// Unique identifier for this thread.
    pub id: ThreadId,
    /// Short preview of the latest message.
    pub snippet: String,
}
