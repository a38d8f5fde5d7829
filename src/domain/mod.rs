//! Domain layer types for the triage engine.
//!
//! This module contains the core domain types used throughout the crate:
//! messages, threads, labels, and the classification category model.

mod category;
mod label;
mod message;
mod thread;
mod types;

pub use category::{
    Category, CategoryLabels, CategoryLabelsError, ClassificationResult, ConfidenceSource,
};
pub use label::{system_labels, Label, LabelColor};
pub use message::{Address, Message};
pub use thread::{Thread, ThreadSummary};
pub use types::{LabelId, MessageId, ThreadId};
