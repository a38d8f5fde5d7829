//! Business services layer.
//!
//! This module contains the core services that orchestrate the triage
//! pipeline, coordinating between providers and domain types.
//!
//! # Architecture
//!
//! Services sit between the binary entry point and the provider layer:
//!
//! ```text
//! Entry Point (CLI, run parameters)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Providers (mail store, LLM)
//! ```
//!
//! # Services Overview
//!
//! - [`TriageService`]: Orchestrates the per-thread pipeline and whole runs
//! - [`ContextService`]: Fetches threads and renders bounded transcripts
//! - [`ClassifierService`]: Picks a category through the LLM, with retry
//! - [`LabelResolver`]: Maps label names to store ids, creating as needed
//! - [`AgingPolicy`]: Decides when a thread is too old to classify

mod aging;
mod classifier_service;
mod context_service;
mod label_service;
mod prompt;
mod triage_service;

pub use aging::AgingPolicy;
pub use classifier_service::{ClassifierService, ParsedCategory, parse_category_token};
pub use context_service::{ContextError, ContextService, ThreadContext, TRANSCRIPT_CHAR_CAP};
pub use label_service::{LabelError, LabelResolver};
pub use prompt::classification_system_prompt;
pub use triage_service::{
    CategoryCounts, RunMode, RunParams, TriageError, TriageReport, TriageService,
};
