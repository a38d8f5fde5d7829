//! Label resolution and thread label mutation.
//!
//! The [`LabelResolver`] maps configured label names to store label ids,
//! creating missing labels on demand. Resolution is cached for the run,
//! keyed by case-folded name, so an already-present label (including a
//! store-reserved one like SPAM) is adopted rather than duplicated.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{LabelColor, LabelId, ThreadId};
use crate::providers::mail::{MailStore, StoreError};

/// Errors that can occur during label resolution.
#[derive(Debug, Error)]
pub enum LabelError {
    /// A create reported a conflict but the label still cannot be found.
    #[error("label {0:?} missing after concurrent create")]
    MissingAfterConflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for label operations.
pub type Result<T> = std::result::Result<T, LabelError>;

/// Resolves label names to ids, creating labels when absent.
pub struct LabelResolver {
    store: Arc<dyn MailStore>,
    cache: RwLock<HashMap<String, LabelId>>,
}

impl LabelResolver {
    /// Creates a resolver with an empty cache.
    pub fn new(store: Arc<dyn MailStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Lists the store's labels and caches them all by case-folded name.
    ///
    /// Returns how many labels the store reported. Doubles as a liveness
    /// check at startup: if listing fails, the store is unreachable.
    pub async fn preload(&self) -> Result<usize> {
        let labels = self.store.list_labels().await?;
        let mut cache = self.cache.write().await;
        for label in &labels {
            cache.insert(label.name.to_lowercase(), label.id.clone());
        }
        Ok(labels.len())
    }

    /// Returns the id for a name, creating the label if it does not exist.
    ///
    /// Safe to call repeatedly with the same name. A create that loses a
    /// race (the store reports a conflict) re-lists and resolves instead
    /// of failing.
    pub async fn ensure_label(&self, name: &str, color: &LabelColor) -> Result<LabelId> {
        let key = name.to_lowercase();
        if let Some(id) = self.cache.read().await.get(&key) {
            return Ok(id.clone());
        }

        let mut cache = self.cache.write().await;
        if let Some(id) = cache.get(&key) {
            return Ok(id.clone());
        }

        match self.store.create_label(name, color).await {
            Ok(label) => {
                debug!(name, id = %label.id, "created label");
                let id = label.id.clone();
                cache.insert(key, label.id);
                Ok(id)
            }
            Err(StoreError::Conflict(_)) => {
                drop(cache);
                self.preload().await?;
                self.cache
                    .read()
                    .await
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| LabelError::MissingAfterConflict(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the cached id for a name, without touching the store.
    pub async fn lookup(&self, name: &str) -> Option<LabelId> {
        self.cache.read().await.get(&name.to_lowercase()).cloned()
    }

    /// Adds a label to a thread. Re-adding an applied label is a no-op.
    pub async fn apply(&self, thread_id: &ThreadId, label: &LabelId) -> Result<()> {
        self.store
            .modify_thread_labels(thread_id, std::slice::from_ref(label), &[])
            .await?;
        Ok(())
    }

    /// Removes a label from a thread. Removing an absent label is a no-op.
    pub async fn remove(&self, thread_id: &ThreadId, label: &LabelId) -> Result<()> {
        self.store
            .modify_thread_labels(thread_id, &[], std::slice::from_ref(label))
            .await?;
        Ok(())
    }

    /// Applies the target label and removes the stale ones in one call.
    pub async fn swap(
        &self,
        thread_id: &ThreadId,
        target: &LabelId,
        stale: &[LabelId],
    ) -> Result<()> {
        self.store
            .modify_thread_labels(thread_id, std::slice::from_ref(target), stale)
            .await?;
        Ok(())
    }
}
