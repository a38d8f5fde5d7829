//! Application settings and configuration types.
//!
//! Settings come from the process environment, with a `.env` file loaded
//! first when present. Credentials are required; everything else has a
//! default.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::{CategoryLabels, CategoryLabelsError};

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("invalid label set: {0}")]
    InvalidLabels(#[from] CategoryLabelsError),
}

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Thread triage configuration.
    pub triage: TriageSettings,
    /// AI provider configuration.
    pub ai: AiSettings,
    /// Gmail OAuth configuration.
    pub gmail: GmailSettings,
    /// HTTP transport configuration.
    pub transport: TransportSettings,
    /// Whether to raise log verbosity to debug.
    pub debug_logging: bool,
}

/// Triage behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageSettings {
    /// Threads idle for at least this many whole days are archived as aged.
    pub history_days: i64,
    /// The six category label names, in category order.
    pub labels: CategoryLabels,
}

impl Default for TriageSettings {
    fn default() -> Self {
        Self {
            history_days: 10,
            labels: CategoryLabels::default(),
        }
    }
}

/// AI provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Model identifier passed to the provider.
    pub model: String,
    /// API key for the provider.
    pub api_key: String,
    /// Custom API endpoint (for self-hosted or compatible APIs).
    pub base_url: Option<String>,
}

/// Gmail OAuth configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailSettings {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// OAuth refresh token.
    pub refresh_token: String,
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportSettings {
    /// Request timeout in seconds, applied to both providers.
    pub timeout_seconds: u64,
}

impl TransportSettings {
    /// Returns the timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

impl Settings {
    /// Loads settings, reading a `.env` file first when one exists.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the environment may be set directly.
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Builds settings from the current process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let history_days = parse_var("HISTORY_DAYS", 10i64)?;
        if history_days < 0 {
            return Err(ConfigError::InvalidVar {
                name: "HISTORY_DAYS",
                reason: "must not be negative".to_string(),
            });
        }

        let labels = match optional("CUSTOM_LABELS") {
            Some(raw) => {
                let names: Vec<String> = raw.split(',').map(|s| s.trim().to_string()).collect();
                CategoryLabels::new(names)?
            }
            None => CategoryLabels::default(),
        };

        let timeout_seconds = parse_var("TRANSPORT_TIMEOUT_SECONDS", 30u64)?;
        if timeout_seconds == 0 {
            return Err(ConfigError::InvalidVar {
                name: "TRANSPORT_TIMEOUT_SECONDS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            triage: TriageSettings {
                history_days,
                labels,
            },
            ai: AiSettings {
                model: optional("DEFAULT_MODEL").unwrap_or_else(|| "gpt-4".to_string()),
                api_key: required("OPENAI_API_KEY")?,
                base_url: optional("OPENAI_BASE_URL"),
            },
            gmail: GmailSettings {
                client_id: required("GMAIL_CLIENT_ID")?,
                client_secret: required("GMAIL_CLIENT_SECRET")?,
                refresh_token: required("GMAIL_REFRESH_TOKEN")?,
            },
            transport: TransportSettings { timeout_seconds },
            debug_logging: parse_bool("DEBUG"),
        })
    }
}

/// Reads a required variable, treating blank values as missing.
fn required(name: &'static str) -> Result<String, ConfigError> {
    match optional(name) {
        Some(value) => Ok(value),
        None => Err(ConfigError::MissingVar(name)),
    }
}

/// Reads an optional variable, treating blank values as unset.
fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a variable with a fallback default.
fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            reason: e.to_string(),
        }),
    }
}

/// Parses a boolean flag ("true"/"1" are truthy, anything else is false).
fn parse_bool(name: &str) -> bool {
    optional(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false)
}
