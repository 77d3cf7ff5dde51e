//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session name cannot be empty")]
    EmptyName,

    #[error("Session name already in use: {0}")]
    NameTaken(String),

    #[error("Storage error: {0}")]
    Storage(#[from] tabstash_storage::StorageError),

    #[error("Platform error: {0}")]
    Platform(#[from] tabstash_tabs::TabError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
