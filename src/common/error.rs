//! Error types for the API tester
//!
//! These cover failures of the harness itself (bad configuration, a
//! transport that could not reach the platform, session bookkeeping).
//! Check-level verdicts such as a status mismatch live in
//! [`crate::testing::Failure`] instead; they are results, not errors.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by transport errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the API tester
#[derive(Error, Debug)]
pub enum Error {
    // === Transport Errors ===
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    // === Session Errors ===
    #[error("Session already holds a {0}; it can only be recorded once")]
    StateAlreadySet(&'static str),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a transport error for a request to `url`
    pub fn transport<E>(url: &str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport {
            url: url.to_string(),
            source: source.into(),
        }
    }
}
