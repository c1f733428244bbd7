use thiserror::Error;

/// Errors that can occur while pushing or syncing repository content
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Credential is missing, invalid, or expired")]
    Unauthenticated,

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Credential lacks the scope required to {action}")]
    InsufficientScope { action: String },

    #[error("Too large: {count} files exceeds the limit of {limit}")]
    TooLarge { count: usize, limit: usize },

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    Invalid { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub fn not_found(what: impl Into<String>) -> Self {
        SyncError::NotFound { what: what.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        SyncError::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        SyncError::Invalid {
            message: message.into(),
        }
    }
}

/// Result type alias for push/sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
