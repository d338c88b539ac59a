//! Error Types

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Context length exceeded
    #[error("Context length exceeded: {used} tokens (max: {max})")]
    ContextOverflow { used: u32, max: u32 },

    /// Chat history storage error
    #[error("History error: {0}")]
    History(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::ProviderUnavailable(_) | CoreError::RateLimited(_) | CoreError::Io(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Provider(msg) => format!("Marcus encountered an error: {}", msg),
            CoreError::ProviderUnavailable(_) => {
                "Marcus is currently unavailable. Please try again.".into()
            }
            CoreError::ContextOverflow { .. } => {
                "The conversation is too long. Please start a new one.".into()
            }
            CoreError::RateLimited(_) => {
                "You've made too many requests. Please wait a moment.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Other(err.to_string())
    }
}
