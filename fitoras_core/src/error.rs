//! Error types for the fitoras_core library.

use crate::types::Weekday;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitoras_core operations
///
/// Stale references (unknown split, day group or exercise ids) are not
/// errors: edits that cannot resolve their target leave state untouched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP error while fetching the exercise catalog
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any state changed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The exercise is already present in the target list
    #[error("Exercise '{exercise_id}' is already planned for {day}")]
    DuplicateExercise { exercise_id: String, day: Weekday },

    /// Catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Key-value store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a validation error from a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True if this is a duplicate-add rejection
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateExercise { .. })
    }
}
