//! Tabstash Sessions
//!
//! - A snapshot is a named capture of one window's tabs and tab groups
//! - Capture reads a live window into a snapshot
//! - The materializer restores a snapshot by appending to a window or by
//!   replacing its tabs
//! - The session store keeps the ordered, named collection of snapshots

mod capture;
mod error;
mod materialize;
mod snapshot;
mod store;

pub use capture::{capture, capture_active_tab};
pub use error::SessionError;
pub use materialize::{MaterializeReport, Materializer, RestoreStep, StepFailure, BLANK_URL};
pub use snapshot::{default_session_name, imported_session_name, Group, Snapshot, Tab};
pub use store::{ImportMode, RenameCollision, SessionStore, SESSIONS_KEY};

pub type Result<T> = std::result::Result<T, SessionError>;
