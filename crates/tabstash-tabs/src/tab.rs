//! Live tab and group data
//!
//! These mirror what a browser reports for an open window. None of it is
//! persisted as-is.

use serde::{Deserialize, Serialize};

use crate::color::GroupColor;

macro_rules! live_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

live_id!(TabId);
live_id!(GroupId);
live_id!(WindowId);

/// A tab as currently open in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveTab {
    pub id: TabId,
    pub window_id: WindowId,
    /// On-screen position within the window
    pub index: usize,
    pub url: String,
    /// Not every tab has a title yet (e.g. still loading)
    pub title: Option<String>,
    pub pinned: bool,
    pub active: bool,
    /// `None` for ungrouped tabs
    pub group_id: Option<GroupId>,
}

/// Tab group metadata as reported by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveGroup {
    pub id: GroupId,
    pub window_id: WindowId,
    pub title: Option<String>,
    pub color: Option<GroupColor>,
    pub collapsed: bool,
}

/// Properties for a tab to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTab {
    pub window_id: WindowId,
    pub url: String,
    pub active: bool,
    pub pinned: bool,
}

/// Fields to change on an existing tab. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabUpdate {
    pub url: Option<String>,
    pub pinned: Option<bool>,
    pub active: Option<bool>,
}

impl TabUpdate {
    pub fn activate() -> Self {
        Self {
            active: Some(true),
            ..Default::default()
        }
    }

    pub fn navigate(url: impl Into<String>, pinned: bool) -> Self {
        Self {
            url: Some(url.into()),
            pinned: Some(pinned),
            active: Some(false),
        }
    }
}

/// Fields to change on an existing group. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    pub title: Option<String>,
    pub color: Option<GroupColor>,
    pub collapsed: Option<bool>,
}
