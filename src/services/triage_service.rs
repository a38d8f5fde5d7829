//! Thread triage orchestration.
//!
//! The [`TriageService`] drives the full pipeline for each thread: build
//! context, decide a category (aging rule first, classifier otherwise),
//! resolve the label, and swap it onto the thread in place of any other
//! category label. One thread's failure never stops the run; it is
//! captured in the report and the next thread proceeds.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::TriageSettings;
use crate::domain::{
    Category, CategoryLabels, ClassificationResult, ConfidenceSource, MessageId, Thread, ThreadId,
};
use crate::providers::ai::{LlmError, LlmProvider};
use crate::providers::mail::{MailStore, StoreError, ThreadQuery};

use super::aging::AgingPolicy;
use super::classifier_service::ClassifierService;
use super::context_service::{ContextError, ContextService, ThreadContext};
use super::label_service::{LabelError, LabelResolver};

/// How many threads are triaged concurrently in batch mode.
const BATCH_CONCURRENCY: usize = 4;

/// Batch size when the caller does not set a limit.
const DEFAULT_BATCH_LIMIT: u32 = 100;

/// Errors that abort a whole run, as opposed to a single thread.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;

/// Which entry point a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Triage a page of inbox threads.
    #[default]
    Batch,
    /// Triage one thread, located by message id, thread id, or recency.
    Single,
}

/// Parameters for one triage run, parsed by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub mode: RunMode,
    /// Message whose thread to triage, in single mode.
    pub message_id: Option<MessageId>,
    /// Thread to triage, in single mode. Ignored when a message id is set.
    pub thread_id: Option<ThreadId>,
    /// Batch size cap, in batch mode.
    pub limit: Option<u32>,
}

/// Per-category tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub action_needed: usize,
    pub awaiting_reply: usize,
    pub informational: usize,
    pub completed: usize,
    pub low_value: usize,
    pub aged: usize,
}

impl CategoryCounts {
    fn record(&mut self, category: Category) {
        match category {
            Category::ActionNeeded => self.action_needed += 1,
            Category::AwaitingReply => self.awaiting_reply += 1,
            Category::Informational => self.informational += 1,
            Category::Completed => self.completed += 1,
            Category::LowValue => self.low_value += 1,
            Category::Aged => self.aged += 1,
        }
    }

    /// Returns the tally for one category.
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::ActionNeeded => self.action_needed,
            Category::AwaitingReply => self.awaiting_reply,
            Category::Informational => self.informational,
            Category::Completed => self.completed,
            Category::LowValue => self.low_value,
            Category::Aged => self.aged,
        }
    }

    /// Returns the sum across all categories.
    pub fn total(&self) -> usize {
        self.action_needed
            + self.awaiting_reply
            + self.informational
            + self.completed
            + self.low_value
            + self.aged
    }
}

/// Summary of one triage run.
#[derive(Debug, Clone, Default)]
pub struct TriageReport {
    /// Threads attempted.
    pub processed: usize,
    /// Threads whose label was applied.
    pub applied: usize,
    /// Threads that failed or whose label could not be applied.
    pub failed: usize,
    /// Threads classified by the fallback default rather than a model answer.
    pub fallbacks: usize,
    /// Applied labels per category.
    pub counts: CategoryCounts,
    /// Error descriptions, one per failed thread.
    pub errors: Vec<String>,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// Per-thread outcomes, in completion order.
    pub results: Vec<ClassificationResult>,
}

impl TriageReport {
    fn record(&mut self, result: ClassificationResult) {
        self.processed += 1;
        if result.applied {
            self.applied += 1;
            if let Some(category) = result.category {
                self.counts.record(category);
            }
        } else {
            self.failed += 1;
        }
        if result.source == Some(ConfidenceSource::FallbackDefault) {
            self.fallbacks += 1;
        }
        if let Some(err) = &result.error {
            self.errors.push(format!("{}: {}", result.thread_id, err));
        }
        self.results.push(result);
    }

    /// Returns true when every thread was labeled.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Orchestrates context building, classification, and labeling.
pub struct TriageService {
    store: Arc<dyn MailStore>,
    context: ContextService,
    classifier: ClassifierService,
    resolver: LabelResolver,
    aging: AgingPolicy,
    labels: CategoryLabels,
}

impl TriageService {
    /// Wires the pipeline for the given backends and settings.
    pub fn new(
        store: Arc<dyn MailStore>,
        llm: Arc<dyn LlmProvider>,
        settings: &TriageSettings,
    ) -> Self {
        Self {
            context: ContextService::new(store.clone()),
            classifier: ClassifierService::new(llm, settings.labels.clone()),
            resolver: LabelResolver::new(store.clone()),
            aging: AgingPolicy::new(settings.history_days),
            labels: settings.labels.clone(),
            store,
        }
    }

    /// Verifies both backends answer and that every category label exists.
    ///
    /// Called once at startup; an error here means the run cannot produce
    /// anything useful and the process should exit.
    pub async fn prepare(&self) -> Result<()> {
        let known = self.resolver.preload().await?;
        debug!(known, "label cache preloaded");

        for category in Category::ALL {
            let name = self.labels.name_for(category);
            self.resolver
                .ensure_label(name, &category.label_color())
                .await?;
        }

        self.classifier.probe().await?;
        Ok(())
    }

    /// Runs triage according to the parsed parameters.
    pub async fn run(&self, params: &RunParams) -> Result<TriageReport> {
        match params.mode {
            RunMode::Batch => self.run_batch(params.limit).await,
            RunMode::Single => {
                self.run_single(params.message_id.as_ref(), params.thread_id.as_ref())
                    .await
            }
        }
    }

    /// Triages a page of inbox threads concurrently.
    pub async fn run_batch(&self, limit: Option<u32>) -> Result<TriageReport> {
        let started = Instant::now();
        let query = ThreadQuery::inbox(limit.unwrap_or(DEFAULT_BATCH_LIMIT));
        let summaries = self.store.list_threads(&query).await?;
        info!(threads = summaries.len(), "starting batch triage");

        let results: Vec<ClassificationResult> =
            stream::iter(summaries.iter().map(|summary| self.triage_thread(&summary.id)))
                .buffer_unordered(BATCH_CONCURRENCY)
                .collect()
                .await;

        let mut report = TriageReport::default();
        for result in results {
            report.record(result);
        }
        report.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            processed = report.processed,
            applied = report.applied,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "batch triage finished"
        );
        Ok(report)
    }

    /// Triages one thread, located by message id, thread id, or recency.
    pub async fn run_single(
        &self,
        message_id: Option<&MessageId>,
        thread_id: Option<&ThreadId>,
    ) -> Result<TriageReport> {
        let started = Instant::now();
        let mut report = TriageReport::default();

        let target = match (message_id, thread_id) {
            (Some(message), _) => match self.store.resolve_message_thread(message).await {
                Ok(id) => Some(id),
                Err(err) => {
                    error!(message = %message, error = %err, "message lookup failed");
                    report.record(ClassificationResult::failed(
                        ThreadId::from(message.0.as_str()),
                        format!("message lookup failed: {}", err),
                    ));
                    None
                }
            },
            (None, Some(thread)) => Some(thread.clone()),
            (None, None) => self
                .store
                .list_threads(&ThreadQuery::inbox(1))
                .await?
                .into_iter()
                .next()
                .map(|summary| summary.id),
        };

        if let Some(ref target) = target {
            report.record(self.triage_thread(target).await);
        } else if message_id.is_none() {
            info!("inbox is empty, nothing to triage");
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Triages one thread, capturing any failure in the result.
    pub async fn triage_thread(&self, thread_id: &ThreadId) -> ClassificationResult {
        match self.classify_and_label(thread_id).await {
            Ok(result) => result,
            Err(err) => {
                error!(thread = %thread_id, error = %err, "thread triage failed");
                ClassificationResult::failed(thread_id.clone(), err.to_string())
            }
        }
    }

    async fn classify_and_label(&self, thread_id: &ThreadId) -> Result<ClassificationResult> {
        let context = self.context.build_for_thread(thread_id).await?;
        let (category, source) = self.decide(&context).await;
        Ok(self.apply_category(&context.thread, category, source).await)
    }

    /// Picks the category: the aging rule wins without consulting the
    /// classifier, everything else is the model's call.
    async fn decide(&self, context: &ThreadContext) -> (Category, ConfidenceSource) {
        if let Some(last) = context.thread.last_message_date() {
            if self.aging.is_aged(last, Utc::now()) {
                debug!(thread = %context.thread.id, "thread aged out");
                return (Category::Aged, ConfidenceSource::AgingRule);
            }
        }
        self.classifier.classify(&context.transcript).await
    }

    /// Applies the category label, removing whichever other category
    /// labels the thread currently carries.
    async fn apply_category(
        &self,
        thread: &Thread,
        category: Category,
        source: ConfidenceSource,
    ) -> ClassificationResult {
        let name = self.labels.name_for(category);
        let target = match self.resolver.ensure_label(name, &category.label_color()).await {
            Ok(id) => id,
            Err(err) => {
                return ClassificationResult::unapplied(
                    thread.id.clone(),
                    category,
                    source,
                    err.to_string(),
                )
            }
        };

        let mut stale = Vec::new();
        for other in Category::ALL {
            if other == category {
                continue;
            }
            if let Some(id) = self.resolver.lookup(self.labels.name_for(other)).await {
                if thread.has_label(&id) && id != target {
                    stale.push(id);
                }
            }
        }

        if let Err(err) = self.resolver.swap(&thread.id, &target, &stale).await {
            return ClassificationResult::unapplied(
                thread.id.clone(),
                category,
                source,
                err.to_string(),
            );
        }

        debug!(
            thread = %thread.id,
            category = category.as_str(),
            source = source.as_str(),
            removed = stale.len(),
            "label applied"
        );
        ClassificationResult::applied(thread.id.clone(), category, source)
    }
}
