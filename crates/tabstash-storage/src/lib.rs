//! Tabstash Storage Layer
//!
//! The session collection is persisted as a single serialized value under a
//! fixed key. Readers and writers always fetch and store the whole value.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Whole-value key/value persistence offered by the host.
///
/// No partial reads or writes: callers fetch a value, transform it in
/// memory, and write it back.
pub trait Persistence: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
