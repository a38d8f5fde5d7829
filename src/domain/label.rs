//! Label domain types.
//!
//! Represents mail-store labels (folders/tags) used for organization.

use serde::{Deserialize, Serialize};

use super::LabelId;

/// A mail-store label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Unique identifier for this label.
    pub id: LabelId,
    /// Display name of the label.
    pub name: String,
    /// Color pair for display, when set.
    pub color: Option<LabelColor>,
    /// Whether the label shows in the label list sidebar.
    pub visible_in_list: bool,
    /// Whether the label shows on messages in the message list.
    pub visible_on_messages: bool,
    /// Whether this is a store-reserved system label (INBOX, SENT, etc.).
    pub is_system: bool,
}

/// A foreground/background hex color pair for a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelColor {
    /// Text color (hex, e.g. "#ffffff").
    pub text: String,
    /// Background color (hex, e.g. "#fb4c2f").
    pub background: String,
}

impl LabelColor {
    pub fn new(text: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            background: background.into(),
        }
    }
}

/// Well-known system label IDs.
pub mod system_labels {
    use super::LabelId;

    /// Returns the inbox label ID.
    pub fn inbox() -> LabelId {
        LabelId::from("INBOX")
    }

    /// Returns the sent label ID.
    pub fn sent() -> LabelId {
        LabelId::from("SENT")
    }

    /// Returns the spam label ID.
    pub fn spam() -> LabelId {
        LabelId::from("SPAM")
    }
}
