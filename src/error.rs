//! Error types for Prescription Console

use thiserror::Error;

/// Error codes reported as process exit status by the command-line front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    NotLoggedIn = 3,
    NoSuchPrescription = 4,
    BadValue = 5,
    RemoteFailure = 6,
    Unreachable = 7,
    StorageFailure = 8,
    ConfigFailure = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A failure already turned into a user-facing message
    #[error("{message}")]
    Reported { code: ErrorCode, message: String },
}

impl AppError {
    /// Shorthand for a single-message validation failure
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) => ErrorCode::NotAuthorized,
            AppError::NotLoggedIn => ErrorCode::NotLoggedIn,
            AppError::NotFound(_) => ErrorCode::NoSuchPrescription,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Http { .. } | AppError::Decode(_) => ErrorCode::RemoteFailure,
            AppError::Transport(_) => ErrorCode::Unreachable,
            AppError::Storage(_) => ErrorCode::StorageFailure,
            AppError::Config(_) => ErrorCode::ConfigFailure,
            AppError::Internal(_) => ErrorCode::Failure,
            AppError::Reported { code, .. } => *code,
        }
    }

    /// Field messages when this is a validation failure
    pub fn validation_messages(&self) -> &[String] {
        match self {
            AppError::Validation(messages) => messages,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
