//! Error types for the alert mailer service

/// Errors that can occur in the alert mailer service
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Invalid email address: {0}")]
    Address(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for alert mailer operations
pub type Result<T> = std::result::Result<T, MailerError>;
