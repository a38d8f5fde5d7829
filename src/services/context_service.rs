//! Thread context assembly for classification.
//!
//! The [`ContextService`] fetches a full thread from the mail store and
//! renders it into a bounded plain-text transcript the classifier can
//! reason over. Long threads keep their opening message (the request that
//! started the conversation) and the most recent messages (the current
//! state), with the middle dropped behind an omission marker.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{Message, MessageId, Thread, ThreadId};
use crate::providers::mail::{MailStore, StoreError};

/// Default cap on rendered transcript length, in characters.
pub const TRANSCRIPT_CHAR_CAP: usize = 8_000;

/// Marker inserted where messages were dropped from the transcript.
const OMISSION_MARKER: &str = "[...omitted...]";

/// Errors raised while assembling thread context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The store returned a thread with no messages.
    #[error("thread {0} has no messages")]
    EmptyThread(ThreadId),

    /// The thread could not be fetched.
    #[error("thread fetch failed: {0}")]
    Fetch(#[from] StoreError),
}

/// Result type for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;

/// A fetched thread together with its rendered transcript.
#[derive(Debug, Clone)]
pub struct ThreadContext {
    /// The thread as fetched, messages in chronological order.
    pub thread: Thread,
    /// Plain-text transcript, bounded by the configured cap.
    pub transcript: String,
}

/// Service that assembles classification context for threads.
pub struct ContextService {
    store: Arc<dyn MailStore>,
    char_cap: usize,
}

impl ContextService {
    /// Creates a context service with the default transcript cap.
    pub fn new(store: Arc<dyn MailStore>) -> Self {
        Self {
            store,
            char_cap: TRANSCRIPT_CHAR_CAP,
        }
    }

    /// Overrides the transcript cap.
    pub fn with_char_cap(mut self, char_cap: usize) -> Self {
        self.char_cap = char_cap;
        self
    }

    /// Fetches a thread and renders its transcript.
    pub async fn build_for_thread(&self, thread_id: &ThreadId) -> Result<ThreadContext> {
        let thread = self.store.get_thread(thread_id).await?;
        if thread.messages.is_empty() {
            return Err(ContextError::EmptyThread(thread_id.clone()));
        }

        let transcript = render_transcript(&thread.messages, self.char_cap);
        Ok(ThreadContext { thread, transcript })
    }

    /// Resolves a message to its thread, then builds that thread's context.
    pub async fn build_for_message(&self, message_id: &MessageId) -> Result<ThreadContext> {
        let thread_id = self.store.resolve_message_thread(message_id).await?;
        self.build_for_thread(&thread_id).await
    }
}

/// Renders messages into a transcript no longer than `cap` characters.
fn render_transcript(messages: &[Message], cap: usize) -> String {
    let header = format!("THREAD CONTEXT:\n{}\n", "=".repeat(50));
    let footer = "=".repeat(50);
    let frame = header.len() + footer.len();

    let blocks: Vec<String> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| render_message_block(i, m))
        .collect();

    let total: usize = blocks.iter().map(|b| b.len()).sum();
    if frame + total <= cap {
        let mut out = header;
        for block in &blocks {
            out.push_str(block);
        }
        out.push_str(&footer);
        return out;
    }

    if blocks.len() == 1 {
        let budget = cap.saturating_sub(frame);
        let mut out = header;
        out.push_str(&clip(&blocks[0], budget));
        out.push_str(&footer);
        return out;
    }

    // Keep the opening message and as many of the newest as still fit.
    let marker = format!("\n{}\n", OMISSION_MARKER);
    let mut budget = cap.saturating_sub(frame + marker.len());

    let opening = clip(&blocks[0], budget / 2);
    budget = budget.saturating_sub(opening.len());

    let mut kept: Vec<String> = Vec::new();
    let mut used = 0usize;
    for block in blocks[1..].iter().rev() {
        if used + block.len() > budget {
            break;
        }
        used += block.len();
        kept.push(block.clone());
    }
    if kept.is_empty() {
        // The newest message alone blows the budget; keep a clipped copy.
        if let Some(newest) = blocks.last() {
            kept.push(clip(newest, budget));
        }
    }
    kept.reverse();

    let mut out = header;
    out.push_str(&opening);
    out.push_str(&marker);
    for block in &kept {
        out.push_str(block);
    }
    out.push_str(&footer);
    out
}

/// Renders one message as a numbered transcript block.
fn render_message_block(index: usize, message: &Message) -> String {
    let to = message
        .to
        .iter()
        .map(|a| a.display())
        .collect::<Vec<_>>()
        .join(", ");

    let from = if message.is_from_owner {
        format!("{} (me)", message.from.display())
    } else {
        message.from.display()
    };

    let body = message
        .body_text
        .as_deref()
        .unwrap_or(message.snippet.as_str());

    let mut block = format!(
        "\nMessage {}:\n{}\nSubject: {}\nFrom: {}\nTo: {}\nDate: {}\n",
        index + 1,
        "-".repeat(20),
        message.subject.as_deref().unwrap_or(""),
        from,
        to,
        message.date.to_rfc2822(),
    );
    if message.has_attachments {
        block.push_str("Attachments: present\n");
    }
    block.push_str(&format!("Body: {}\n", body));
    block
}

/// Cuts a block to at most `max` characters on a char boundary.
fn clip(block: &str, max: usize) -> String {
    if block.len() <= max {
        return block.to_string();
    }
    if max < 4 {
        return String::new();
    }
    let mut cut = max - 4;
    while cut > 0 && !block.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...\n", &block[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::domain::{Address, Label, LabelColor, LabelId, ThreadSummary};
    use crate::providers::mail::ThreadQuery;

    struct MockStore {
        threads: Mutex<HashMap<String, Thread>>,
        message_threads: Mutex<HashMap<String, String>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                threads: Mutex::new(HashMap::new()),
                message_threads: Mutex::new(HashMap::new()),
            }
        }

        fn insert(&self, thread: Thread) {
            for message in &thread.messages {
                self.message_threads
                    .lock()
                    .unwrap()
                    .insert(message.id.0.clone(), thread.id.0.clone());
            }
            self.threads
                .lock()
                .unwrap()
                .insert(thread.id.0.clone(), thread);
        }
    }

    #[async_trait]
    impl MailStore for MockStore {
        async fn list_threads(
            &self,
            _query: &ThreadQuery,
        ) -> std::result::Result<Vec<ThreadSummary>, StoreError> {
            Ok(vec![])
        }

        async fn get_thread(
            &self,
            thread_id: &ThreadId,
        ) -> std::result::Result<Thread, StoreError> {
            self.threads
                .lock()
                .unwrap()
                .get(&thread_id.0)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(thread_id.0.clone()))
        }

        async fn resolve_message_thread(
            &self,
            message_id: &MessageId,
        ) -> std::result::Result<ThreadId, StoreError> {
            self.message_threads
                .lock()
                .unwrap()
                .get(&message_id.0)
                .map(|id| ThreadId::from(id.clone()))
                .ok_or_else(|| StoreError::NotFound(message_id.0.clone()))
        }

        async fn list_labels(&self) -> std::result::Result<Vec<Label>, StoreError> {
            Ok(vec![])
        }

        async fn create_label(
            &self,
            _name: &str,
            _color: &LabelColor,
        ) -> std::result::Result<Label, StoreError> {
            Err(StoreError::Internal("not supported".to_string()))
        }

        async fn modify_thread_labels(
            &self,
            _thread_id: &ThreadId,
            _add: &[LabelId],
            _remove: &[LabelId],
        ) -> std::result::Result<(), StoreError> {
            Ok(())
        }
    }

    fn make_message(id: &str, thread: &str, day: u32, body: &str, from_owner: bool) -> Message {
        Message {
            id: MessageId::from(id),
            thread_id: ThreadId::from(thread),
            from: if from_owner {
                Address::new("me@example.com")
            } else {
                Address::with_name("alice@example.com", "Alice")
            },
            to: vec![Address::new("me@example.com")],
            cc: vec![],
            subject: Some("Quarterly report".to_string()),
            body_text: Some(body.to_string()),
            snippet: body.chars().take(50).collect(),
            date: Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap(),
            is_from_owner: from_owner,
            has_attachments: false,
            labels: vec![],
        }
    }

    fn make_thread(id: &str, messages: Vec<Message>) -> Thread {
        Thread {
            id: ThreadId::from(id),
            messages,
            labels: vec![],
        }
    }

    #[tokio::test]
    async fn renders_messages_in_order() {
        let store = Arc::new(MockStore::new());
        store.insert(make_thread(
            "t1",
            vec![
                make_message("m1", "t1", 1, "Can you send the report?", false),
                make_message("m2", "t1", 2, "Working on it.", true),
                make_message("m3", "t1", 3, "Thanks!", false),
            ],
        ));

        let service = ContextService::new(store);
        let context = service
            .build_for_thread(&ThreadId::from("t1"))
            .await
            .unwrap();

        let first = context.transcript.find("Message 1:").unwrap();
        let second = context.transcript.find("Message 2:").unwrap();
        let third = context.transcript.find("Message 3:").unwrap();
        assert!(first < second && second < third);
        assert!(context.transcript.starts_with("THREAD CONTEXT:"));
        assert!(context.transcript.contains("Can you send the report?"));
    }

    #[tokio::test]
    async fn owner_messages_are_annotated() {
        let store = Arc::new(MockStore::new());
        store.insert(make_thread(
            "t1",
            vec![
                make_message("m1", "t1", 1, "Question for you", false),
                make_message("m2", "t1", 2, "My answer", true),
            ],
        ));

        let service = ContextService::new(store);
        let context = service
            .build_for_thread(&ThreadId::from("t1"))
            .await
            .unwrap();

        assert!(context.transcript.contains("From: me@example.com (me)"));
        assert!(!context.transcript.contains("Alice <alice@example.com> (me)"));
    }

    #[tokio::test]
    async fn attachment_presence_is_flagged_without_content() {
        let store = Arc::new(MockStore::new());
        let mut message = make_message("m1", "t1", 1, "See attached", false);
        message.has_attachments = true;
        store.insert(make_thread("t1", vec![message]));

        let service = ContextService::new(store);
        let context = service
            .build_for_thread(&ThreadId::from("t1"))
            .await
            .unwrap();

        assert!(context.transcript.contains("Attachments: present"));
    }

    #[tokio::test]
    async fn long_thread_is_capped_keeping_first_and_newest() {
        let store = Arc::new(MockStore::new());
        let messages: Vec<Message> = (1..=5)
            .map(|i| {
                make_message(
                    &format!("m{}", i),
                    "t1",
                    i as u32,
                    &"x".repeat(4_000),
                    false,
                )
            })
            .collect();
        store.insert(make_thread("t1", messages));

        let service = ContextService::new(store);
        let context = service
            .build_for_thread(&ThreadId::from("t1"))
            .await
            .unwrap();

        assert!(context.transcript.len() <= TRANSCRIPT_CHAR_CAP);
        assert!(context.transcript.contains("Message 1:"));
        assert!(context.transcript.contains("Message 5:"));
        assert!(context.transcript.contains(OMISSION_MARKER));
        assert!(!context.transcript.contains("Message 3:"));
    }

    #[tokio::test]
    async fn short_thread_has_no_omission_marker() {
        let store = Arc::new(MockStore::new());
        store.insert(make_thread(
            "t1",
            vec![make_message("m1", "t1", 1, "short", false)],
        ));

        let service = ContextService::new(store);
        let context = service
            .build_for_thread(&ThreadId::from("t1"))
            .await
            .unwrap();

        assert!(!context.transcript.contains(OMISSION_MARKER));
    }

    #[tokio::test]
    async fn empty_thread_is_an_error() {
        let store = Arc::new(MockStore::new());
        store.insert(make_thread("t1", vec![]));

        let service = ContextService::new(store);
        let err = service
            .build_for_thread(&ThreadId::from("t1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::EmptyThread(_)));
    }

    #[tokio::test]
    async fn missing_thread_is_a_fetch_error() {
        let store = Arc::new(MockStore::new());
        let service = ContextService::new(store);

        let err = service
            .build_for_thread(&ThreadId::from("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::Fetch(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn message_id_resolves_to_its_thread() {
        let store = Arc::new(MockStore::new());
        store.insert(make_thread(
            "t9",
            vec![make_message("m42", "t9", 1, "hello", false)],
        ));

        let service = ContextService::new(store);
        let context = service
            .build_for_message(&MessageId::from("m42"))
            .await
            .unwrap();
        assert_eq!(context.thread.id, ThreadId::from("t9"));
    }

    #[tokio::test]
    async fn custom_cap_is_respected() {
        let store = Arc::new(MockStore::new());
        store.insert(make_thread(
            "t1",
            vec![
                make_message("m1", "t1", 1, &"a".repeat(600), false),
                make_message("m2", "t1", 2, &"b".repeat(600), false),
                make_message("m3", "t1", 3, &"c".repeat(600), false),
            ],
        ));

        let service = ContextService::new(store).with_char_cap(1_000);
        let context = service
            .build_for_thread(&ThreadId::from("t1"))
            .await
            .unwrap();
        assert!(context.transcript.len() <= 1_000);
        assert!(context.transcript.contains(OMISSION_MARKER));
    }
}
