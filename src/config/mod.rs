//! Configuration and settings management.
//!
//! This module provides application settings types and environment-based
//! loading. A `.env` file in the working directory is honored when present.

mod settings;

pub use settings::{
    AiSettings, ConfigError, GmailSettings, Settings, TransportSettings, TriageSettings,
};
