use thiserror::Error;

/// Application-wide error types for scrapjobs.
#[derive(Error, Debug)]
pub enum AppError {
    /// The automation engine could not be launched.
    #[error("Failed to start session: {0}")]
    SessionStart(String),

    /// Bad batch size, conflicting mode selection, or other invalid settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No adapter is registered for the requested source.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// No routing rule matches the URL.
    #[error("No source matches URL: {0}")]
    UnroutableUrl(String),

    /// Opening a page or navigating to a URL failed.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// An expected element never appeared on the page.
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    /// The page is a bot-challenge / CAPTCHA interstitial.
    #[error("Bot challenge detected: {0}")]
    BotChallenge(String),

    /// A page operation timed out.
    #[error("Page operation timed out after {0} seconds")]
    Timeout(u64),

    /// A single source's discovery failed.
    #[error("Discovery failed for {board}: {reason}")]
    Discovery { board: String, reason: String },

    /// The run was aborted through its cancellation token.
    #[error("Run cancelled")]
    Cancelled,

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Timeout(_) => true,
            AppError::Navigation(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("timeout")
                    || msg.contains("timed out")
                    || msg.contains("connect")
                    || msg.contains("reset")
            }
            _ => false,
        }
    }

    /// Returns true if this error aborts the whole run instead of a single URL.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::SessionStart(_) | AppError::InvalidConfiguration(_) | AppError::Cancelled
        )
    }
}
