//! Error types for cookmode

use thiserror::Error;

/// Result type alias for cookmode operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in a cooking session
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Recipe lookup failed; the session cannot be rendered
    #[error("recipe load failed: {0}")]
    RecipeLoad(String),

    /// Translation collaborator call failed (recoverable; retried on the next trigger)
    #[error("translation failed: {0}")]
    Translation(String),

    /// Timer started with a non-positive duration
    #[error("timer duration must be positive, got {0}")]
    InvalidDuration(u32),

    /// Step text carries no recognizable minute pattern
    #[error("no duration found in step text")]
    NoDurationFound,

    /// No speech-recognition capability on this host
    #[error("speech recognition unavailable")]
    RecognitionUnavailable,

    /// Microphone access refused by the user
    #[error("microphone permission denied")]
    PermissionDenied,

    /// Recognition engine error
    #[error("recognition error: {0}")]
    Recognition(String),

    /// The session event loop has already terminated
    #[error("session closed")]
    SessionClosed,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
