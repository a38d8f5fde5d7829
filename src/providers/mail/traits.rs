//! Mail store trait definition.
//!
//! This module defines the [`MailStore`] trait which abstracts over the
//! hosting mail backend (Gmail API today). The classification services only
//! touch the store through this trait, which keeps them testable against
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Label, LabelColor, LabelId, MessageId, Thread, ThreadId, ThreadSummary};

/// Result type alias for mail store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during mail store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Authentication failed or credentials expired.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error, including timeouts.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource already exists (e.g. a racing label creation).
    #[error("already exists: {0}")]
    Conflict(String),

    /// Invalid request or parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Store-specific error.
    #[error("store error: {0}")]
    Provider(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Parameters for listing candidate threads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadQuery {
    /// Store-native search expression (e.g. "in:inbox").
    pub query: Option<String>,
    /// Maximum number of threads to return.
    pub limit: Option<u32>,
}

impl ThreadQuery {
    /// Lists inbox threads up to the given limit.
    pub fn inbox(limit: u32) -> Self {
        Self {
            query: Some("in:inbox".to_string()),
            limit: Some(limit),
        }
    }

    /// Creates a query with only a limit set.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            query: None,
            limit: Some(limit),
        }
    }
}

/// Trait for mail store implementations.
///
/// All methods are async and return [`Result`] to surface store-specific
/// errors.
///
/// # Example
///
/// ```ignore
/// use sift::providers::mail::{MailStore, ThreadQuery};
///
/// async fn list_inbox(store: &impl MailStore) -> Result<()> {
///     let threads = store.list_threads(&ThreadQuery::inbox(50)).await?;
///     for summary in threads {
///         println!("{}: {}", summary.id, summary.snippet);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MailStore: Send + Sync {
    /// Lists candidate threads matching the query.
    async fn list_threads(&self, query: &ThreadQuery) -> Result<Vec<ThreadSummary>>;

    /// Fetches a complete thread with all messages, ordered by date
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the thread does not exist.
    async fn get_thread(&self, thread_id: &ThreadId) -> Result<Thread>;

    /// Resolves the thread a message belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the message does not exist.
    async fn resolve_message_thread(&self, message_id: &MessageId) -> Result<ThreadId>;

    /// Fetches all labels for the account, system labels included.
    async fn list_labels(&self) -> Result<Vec<Label>>;

    /// Creates a user label with the given name and color.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a label with this name already
    /// exists; callers are expected to re-resolve by name.
    async fn create_label(&self, name: &str, color: &LabelColor) -> Result<Label>;

    /// Adds and removes labels on a thread in one mutation.
    ///
    /// Adding an already-present label or removing an absent one is a no-op
    /// on the store side.
    async fn modify_thread_labels(
        &self,
        thread_id: &ThreadId,
        add: &[LabelId],
        remove: &[LabelId],
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_query_inbox() {
        let query = ThreadQuery::inbox(25);
        assert_eq!(query.query.as_deref(), Some("in:inbox"));
        assert_eq!(query.limit, Some(25));
    }

    #[test]
    fn thread_query_with_limit() {
        let query = ThreadQuery::with_limit(5);
        assert!(query.query.is_none());
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn thread_query_default_is_unbounded() {
        let query = ThreadQuery::default();
        assert!(query.query.is_none());
        assert!(query.limit.is_none());
    }

    #[test]
    fn store_error_display() {
        let auth_err = StoreError::Authentication("token expired".to_string());
        assert_eq!(auth_err.to_string(), "authentication failed: token expired");

        let rate_err = StoreError::RateLimited {
            retry_after_secs: Some(60),
        };
        assert!(rate_err.to_string().contains("rate limit"));

        let conflict = StoreError::Conflict("To Do".to_string());
        assert!(conflict.to_string().contains("already exists"));
    }
}
