//! Tabstash Core
//!
//! Entry point for hosts: routes `{ operation, payload }` requests to the
//! session store and the live windows.

mod config;
mod dispatcher;
mod error;
mod protocol;
mod transfer;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::CoreError;
pub use protocol::{Operation, Request, Response};
pub use transfer::{export_to_file, import_from_file, parse_sessions};

// Re-export core components
pub use tabstash_session::{
    capture, Group, ImportMode, MaterializeReport, Materializer, RenameCollision, RestoreStep,
    SessionError, SessionStore, Snapshot, StepFailure, Tab,
};
pub use tabstash_storage::{Database, Persistence, StorageError};
pub use tabstash_tabs::{GroupColor, MemoryWindows, TabError, TabHost, WindowId};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. `RUST_LOG` overrides `default_filter`.
///
/// Calling this more than once is harmless; later calls keep the first
/// subscriber.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging("debug");
        init_logging("info");
        tracing::info!("still logging");
    }
}
