use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Failures that happened before a well-formed envelope was available.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Transport(_) | AppError::Status { .. } | AppError::Decode(_)
        )
    }

    /// Transport detail goes to the log, never to the user.
    pub fn user_message(&self, transport_fallback: &str) -> String {
        if self.is_transport() {
            error!("request failed: {}", self);
            transport_fallback.to_string()
        } else {
            self.to_string()
        }
    }
}
