//! sift - AI-assisted email thread triage
//!
//! This crate classifies inbox threads into a small set of actionable
//! categories and keeps exactly one category label on each thread. It
//! talks to a mail store for threads and labels and to an LLM provider
//! for the classification decision; threads past an age threshold are
//! labeled by rule without consulting the model.

pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
