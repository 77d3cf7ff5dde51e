//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Session(#[from] tabstash_session::SessionError),

    #[error(transparent)]
    Platform(#[from] tabstash_tabs::TabError),

    #[error("Storage error: {0}")]
    Storage(#[from] tabstash_storage::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("window {0} has no active tab")]
    NoActiveTab(tabstash_tabs::WindowId),

    #[error("Invalid payload for {operation}: {reason}")]
    InvalidPayload { operation: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
