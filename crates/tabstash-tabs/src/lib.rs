//! Tabstash Tab Boundary
//!
//! The live browser is reached only through [`TabHost`]. Live identifiers
//! (tabs, groups, windows) are ephemeral: they never survive persistence,
//! which is why snapshots refer to tabs by position instead.

mod color;
mod error;
mod host;
mod memory;
mod tab;

pub use color::GroupColor;
pub use error::TabError;
pub use host::TabHost;
pub use memory::MemoryWindows;
pub use tab::{CreateTab, GroupId, GroupUpdate, LiveGroup, LiveTab, TabId, TabUpdate, WindowId};

pub type Result<T> = std::result::Result<T, TabError>;
