//! Mail and AI provider implementations.
//!
//! This module contains provider traits and implementations for external services:
//!
//! - [`mail`] - Mail stores (Gmail API)
//! - [`ai`] - AI/LLM providers (OpenAI-compatible endpoints)

pub mod ai;
pub mod mail;
