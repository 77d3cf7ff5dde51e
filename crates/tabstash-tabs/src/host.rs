//! The browser surface the session core needs.

use crate::tab::{CreateTab, GroupId, GroupUpdate, LiveGroup, LiveTab, TabId, TabUpdate, WindowId};
use crate::Result;

/// Inspection and mutation of browser windows.
///
/// Each call is a single platform operation that may fail on its own;
/// callers decide whether a failure is fatal.
pub trait TabHost: Send + Sync {
    /// The window requests act on by default.
    fn current_window(&self) -> Result<WindowId>;

    /// All tabs of `window`. Order is unspecified; use [`LiveTab::index`].
    fn query_tabs(&self, window: WindowId) -> Result<Vec<LiveTab>>;

    /// All tab groups of `window`.
    fn query_groups(&self, window: WindowId) -> Result<Vec<LiveGroup>>;

    fn create_tab(&self, props: CreateTab) -> Result<TabId>;

    fn update_tab(&self, tab: TabId, update: TabUpdate) -> Result<()>;

    /// Put `tabs` into a new group and return its id.
    fn group_tabs(&self, tabs: &[TabId]) -> Result<GroupId>;

    fn update_group(&self, group: GroupId, update: GroupUpdate) -> Result<()>;

    /// Take `tabs` out of whatever group they are in. Groups left empty
    /// are closed.
    fn ungroup_tabs(&self, tabs: &[TabId]) -> Result<()>;

    fn remove_tabs(&self, tabs: &[TabId]) -> Result<()>;
}
