//! Classification category types.
//!
//! The closed set of workflow categories a thread can land in, the
//! configurable mapping from categories to mail-store label names, and the
//! per-thread outcome record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LabelColor, ThreadId};

/// A workflow category for a thread.
///
/// Exactly one category is authoritative per thread at any time. `Aged` is
/// derived from the aging rule alone and is never requested from the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The thread requires action from the account owner.
    ActionNeeded,
    /// The owner has acted and is waiting on someone else.
    AwaitingReply,
    /// Informational content, nothing expected from the owner.
    Informational,
    /// The conversation reached a confirmed conclusion.
    Completed,
    /// Promotional, automated, or otherwise low-value content.
    LowValue,
    /// The newest message is older than the configured threshold.
    Aged,
}

impl Category {
    /// All categories in their fixed declaration order.
    pub const ALL: [Category; 6] = [
        Category::ActionNeeded,
        Category::AwaitingReply,
        Category::Informational,
        Category::Completed,
        Category::LowValue,
        Category::Aged,
    ];

    /// The five categories the AI may choose from.
    pub const AI_CHOICES: [Category; 5] = [
        Category::ActionNeeded,
        Category::AwaitingReply,
        Category::Informational,
        Category::Completed,
        Category::LowValue,
    ];

    /// Returns the stable snake_case token for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ActionNeeded => "action_needed",
            Category::AwaitingReply => "awaiting_reply",
            Category::Informational => "informational",
            Category::Completed => "completed",
            Category::LowValue => "low_value",
            Category::Aged => "aged",
        }
    }

    /// Returns the label color used when the category's label is created.
    ///
    /// Values come from the Gmail label palette; arbitrary hex pairs are
    /// rejected by the store.
    pub fn label_color(&self) -> LabelColor {
        match self {
            Category::ActionNeeded => LabelColor::new("#ffffff", "#fb4c2f"),
            Category::AwaitingReply => LabelColor::new("#ffffff", "#ffad47"),
            Category::Informational => LabelColor::new("#ffffff", "#4a86e8"),
            Category::Completed => LabelColor::new("#ffffff", "#16a766"),
            Category::LowValue => LabelColor::new("#ffffff", "#666666"),
            Category::Aged => LabelColor::new("#000000", "#cccccc"),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a classification decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    /// The aging rule short-circuited the decision.
    AgingRule,
    /// The AI judgment interface chose the category.
    AiJudgment,
    /// Both attempts failed and the safe default was applied.
    FallbackDefault,
}

impl ConfidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceSource::AgingRule => "aging_rule",
            ConfidenceSource::AiJudgment => "ai_judgment",
            ConfidenceSource::FallbackDefault => "fallback_default",
        }
    }
}

/// Error validating a category label-name mapping.
#[derive(Debug, Error)]
pub enum CategoryLabelsError {
    #[error("expected exactly 6 label names, got {0}")]
    WrongCount(usize),
    #[error("label name may not be empty")]
    EmptyName,
    #[error("duplicate label name: {0}")]
    DuplicateName(String),
}

/// Ordered bidirectional mapping between categories and label names.
///
/// Names map positionally onto [`Category::ALL`]. Validated on construction:
/// exactly six entries, none empty, no case-insensitive duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLabels {
    names: [String; 6],
}

impl CategoryLabels {
    /// Builds the mapping from an ordered list of names.
    pub fn new(names: Vec<String>) -> Result<Self, CategoryLabelsError> {
        if names.len() != Category::ALL.len() {
            return Err(CategoryLabelsError::WrongCount(names.len()));
        }
        let names: Vec<String> = names.into_iter().map(|n| n.trim().to_owned()).collect();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(CategoryLabelsError::EmptyName);
            }
            let lower = name.to_lowercase();
            if names[..i].iter().any(|prev| prev.to_lowercase() == lower) {
                return Err(CategoryLabelsError::DuplicateName(name.clone()));
            }
        }
        let names: [String; 6] = names
            .try_into()
            .map_err(|v: Vec<String>| CategoryLabelsError::WrongCount(v.len()))?;
        Ok(Self { names })
    }

    /// Returns the label name for a category.
    pub fn name_for(&self, category: Category) -> &str {
        let idx = Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or(0);
        &self.names[idx]
    }

    /// Returns the category whose label name matches, case-insensitively.
    pub fn category_for(&self, name: &str) -> Option<Category> {
        let lower = name.to_lowercase();
        self.names
            .iter()
            .position(|n| n.to_lowercase() == lower)
            .map(|idx| Category::ALL[idx])
    }

    /// Returns all six names in category order.
    pub fn names(&self) -> &[String; 6] {
        &self.names
    }

    /// Returns the five names the AI may answer with, in category order.
    pub fn ai_choice_names(&self) -> [&str; 5] {
        [
            self.name_for(Category::ActionNeeded),
            self.name_for(Category::AwaitingReply),
            self.name_for(Category::Informational),
            self.name_for(Category::Completed),
            self.name_for(Category::LowValue),
        ]
    }
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self {
            names: [
                "To Do".to_string(),
                "Awaiting Reply".to_string(),
                "FYI".to_string(),
                "Done".to_string(),
                "SPAM".to_string(),
                "History".to_string(),
            ],
        }
    }
}

/// Outcome of one thread's classification attempt.
///
/// Created per attempt and consumed by batch reporting; never persisted
/// beyond the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Thread that was classified.
    pub thread_id: ThreadId,
    /// Category the thread landed in, when a decision was reached.
    pub category: Option<Category>,
    /// How the decision was reached.
    pub source: Option<ConfidenceSource>,
    /// Whether the label mutation was applied to the store.
    pub applied: bool,
    /// Error description when the thread failed.
    pub error: Option<String>,
}

impl ClassificationResult {
    /// An applied outcome for a decided category.
    pub fn applied(thread_id: ThreadId, category: Category, source: ConfidenceSource) -> Self {
        Self {
            thread_id,
            category: Some(category),
            source: Some(source),
            applied: true,
            error: None,
        }
    }

    /// A failed outcome carrying the error description.
    pub fn failed(thread_id: ThreadId, error: impl Into<String>) -> Self {
        Self {
            thread_id,
            category: None,
            source: None,
            applied: false,
            error: Some(error.into()),
        }
    }

    /// A decided-but-unapplied outcome, when the label mutation failed.
    pub fn unapplied(
        thread_id: ThreadId,
        category: Category,
        source: ConfidenceSource,
        error: impl Into<String>,
    ) -> Self {
        Self {
            thread_id,
            category: Some(category),
            source: Some(source),
            applied: false,
            error: Some(error.into()),
        }
    }
}
