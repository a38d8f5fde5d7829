//! AI/LLM provider implementations.
//!
//! This module provides a unified interface for the model backends that
//! judge thread categories.
//!
//! # Example
//!
//! ```rust,no_run
//! use sift::providers::ai::{
//!     CompletionRequest, LlmProvider, Message, OpenAiCompatibleProvider,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OpenAiCompatibleProvider::openai("sk-...", "gpt-4o-mini");
//!
//! let request = CompletionRequest::new(vec![Message::user("Classify this thread")])
//!     .with_system_prompt("You are an email triage assistant.");
//!
//! let response = provider.complete(&request).await?;
//! println!("Response: {}", response.text);
//! # Ok(())
//! # }
//! ```

mod openai;
mod traits;

pub use openai::OpenAiCompatibleProvider;
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, LlmResult, Message,
    Role, TokenUsage,
};
