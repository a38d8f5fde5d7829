//! Message domain types.
//!
//! Represents individual messages within a conversation thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LabelId, MessageId, ThreadId};

/// An immutable snapshot of one message, fetched once per classification pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub id: MessageId,
    /// Thread (conversation) this message belongs to.
    pub thread_id: ThreadId,
    /// Sender address.
    pub from: Address,
    /// Primary recipient addresses.
    pub to: Vec<Address>,
    /// Carbon copy recipient addresses.
    pub cc: Vec<Address>,
    /// Subject line.
    pub subject: Option<String>,
    /// Plain text body content, decoded from the store's transport encoding.
    pub body_text: Option<String>,
    /// Short preview of the message content.
    pub snippet: String,
    /// Date and time the message was received by the store.
    pub date: DateTime<Utc>,
    /// Whether the account owner sent this message.
    pub is_from_owner: bool,
    /// Whether the message carries file attachments. Attachment content is
    /// never fetched.
    pub has_attachments: bool,
    /// Labels applied to this message.
    pub labels: Vec<LabelId>,
}

/// An email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Email address.
    pub email: String,
    /// Display name (e.g., "John Doe").
    pub name: Option<String>,
}

impl Address {
    /// Creates a new address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates a new address with email and display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Returns the display representation of this address.
    ///
    /// If a name is present, returns "Name <email>", otherwise just the email.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_with_name() {
        let addr = Address::with_name("test@example.com", "Test User");
        assert_eq!(addr.display(), "Test User <test@example.com>");
    }

    #[test]
    fn address_display_without_name() {
        let addr = Address::new("test@example.com");
        assert_eq!(addr.display(), "test@example.com");
    }

    #[test]
    fn address_equality() {
        let addr1 = Address::new("test@example.com");
        let addr2 = Address::new("test@example.com");
        assert_eq!(addr1, addr2);
    }

    #[test]
    fn message_serialization() {
        let message = Message {
            id: MessageId::from("msg-1"),
            thread_id: ThreadId::from("thread-1"),
            from: Address::with_name("sender@example.com", "Sender"),
            to: vec![Address::new("recipient@example.com")],
            cc: vec![],
            subject: Some("Quarterly report".to_string()),
            body_text: Some("Attached as requested.".to_string()),
            snippet: "Attached as requested.".to_string(),
            date: Utc::now(),
            is_from_owner: false,
            has_attachments: true,
            labels: vec![LabelId::from("INBOX")],
        };

        let json = serde_json::to_string(&message).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id, MessageId::from("msg-1"));
        assert!(deserialized.has_attachments);
        assert!(!deserialized.is_from_owner);
    }
}
