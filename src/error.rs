//! Error types for autodeliver
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur while processing and relaying deliveries
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Sign-up record not found in the store
    #[error("Sign-up not found: {0}")]
    SignupNotFound(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Solution generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Notification queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// Relay error
    #[error("Relay error: {0}")]
    Relay(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for autodeliver operations
pub type Result<T> = std::result::Result<T, DeliveryError>;
