// Error types for ghpeek.
// Each failure kind is assigned where it is observed, so callers never have to
// classify errors by inspecting message text.

use chrono::{DateTime, Local, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded{}", reset_suffix(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("GitHub server error: HTTP {0}")]
    ServerError(u16),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Maximum retries reached")]
    RetriesExhausted,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn reset_suffix(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(reset) => format!(", resets at {}", reset.format("%H:%M:%S UTC")),
        None => String::new(),
    }
}

impl From<reqwest::Error> for GhError {
    fn from(err: reqwest::Error) -> Self {
        GhError::Transport(err.to_string())
    }
}

impl GhError {
    /// Whether the retry loop may try again after this failure.
    ///
    /// `RateLimited` is only retryable when no reset time is known: with an
    /// exhausted quota the request cannot succeed before the reset.
    pub fn is_retryable(&self) -> bool {
        match self {
            GhError::RateLimited { reset_at } => reset_at.is_none(),
            GhError::ServerError(_) | GhError::Transport(_) => true,
            _ => false,
        }
    }

    /// Stable, user-facing description of the failure.
    pub fn user_message(&self) -> String {
        match self {
            GhError::NotFound(_) => "User not found on GitHub".to_string(),
            GhError::InvalidInput(_) => "Invalid username".to_string(),
            GhError::RateLimited { reset_at: Some(reset) } => format!(
                "GitHub rate limit reached. Try again after {}",
                reset.with_timezone(&Local).format("%H:%M:%S")
            ),
            GhError::RateLimited { reset_at: None } => {
                "GitHub rate limit reached. Try again later".to_string()
            }
            GhError::Transport(_) => "Connection error. Check your network".to_string(),
            GhError::ServerError(status) => format!("GitHub server error ({})", status),
            GhError::RetriesExhausted => {
                "GitHub did not respond after several attempts".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GhError>;
