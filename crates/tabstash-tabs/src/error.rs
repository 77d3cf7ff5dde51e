//! Tab error types
//!
//! Every variant is a failed platform call. Restore logic treats these as
//! per-item failures rather than aborting.

use thiserror::Error;

use crate::tab::{GroupId, TabId, WindowId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabError {
    #[error("Tab not found: {0}")]
    NotFound(TabId),

    #[error("Window not found: {0}")]
    WindowNotFound(WindowId),

    #[error("No current window")]
    NoCurrentWindow,

    #[error("Tab group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Operation rejected: {0}")]
    Rejected(String),
}
