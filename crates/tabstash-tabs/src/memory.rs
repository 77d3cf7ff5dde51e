//! In-memory windows
//!
//! A [`TabHost`] that keeps windows, tabs and groups in process memory.
//! It follows browser rules closely enough for restore logic to be
//! exercised against it: unparseable URLs are refused, a non-empty window
//! always has an active tab, and groups disappear once their last tab
//! leaves.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::color::GroupColor;
use crate::error::TabError;
use crate::host::TabHost;
use crate::tab::{CreateTab, GroupId, GroupUpdate, LiveGroup, LiveTab, TabId, TabUpdate, WindowId};
use crate::Result;

#[derive(Default)]
struct Windows {
    next_id: u64,
    current: Option<WindowId>,
    /// Tab order per window
    order: HashMap<WindowId, Vec<TabId>>,
    tabs: HashMap<TabId, LiveTab>,
    groups: HashMap<GroupId, LiveGroup>,
    reject_grouping: bool,
}

impl Windows {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn order_mut(&mut self, window: WindowId) -> Result<&mut Vec<TabId>> {
        self.order
            .get_mut(&window)
            .ok_or(TabError::WindowNotFound(window))
    }

    fn activate(&mut self, tab_id: TabId) {
        let Some(window) = self.tabs.get(&tab_id).map(|t| t.window_id) else {
            return;
        };
        for tab in self.tabs.values_mut().filter(|t| t.window_id == window) {
            tab.active = tab.id == tab_id;
        }
    }

    fn ensure_active(&mut self, window: WindowId) {
        let has_active = self
            .tabs
            .values()
            .any(|t| t.window_id == window && t.active);
        if has_active {
            return;
        }
        if let Some(first) = self.order.get(&window).and_then(|o| o.first()).copied() {
            self.activate(first);
        }
    }

    fn prune_groups(&mut self) {
        let tabs = &self.tabs;
        self.groups
            .retain(|id, _| tabs.values().any(|t| t.group_id == Some(*id)));
    }
}

pub struct MemoryWindows {
    state: Arc<RwLock<Windows>>,
}

impl MemoryWindows {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(Windows::default())),
        }
    }

    /// Open an empty window. The first window opened becomes current.
    pub fn open_window(&self) -> WindowId {
        let mut state = self.state.write();
        let id = WindowId(state.next_id());
        state.order.insert(id, Vec::new());
        if state.current.is_none() {
            state.current = Some(id);
        }

        tracing::debug!(window_id = %id, "Opened window");

        id
    }

    pub fn set_current_window(&self, window: WindowId) -> Result<()> {
        let mut state = self.state.write();
        if !state.order.contains_key(&window) {
            return Err(TabError::WindowNotFound(window));
        }
        state.current = Some(window);
        Ok(())
    }

    /// Open a tab with a known title, as if the page had finished loading.
    pub fn open_tab(&self, window: WindowId, url: &str, title: &str, pinned: bool) -> Result<TabId> {
        let id = self.create_tab(CreateTab {
            window_id: window,
            url: url.to_string(),
            active: false,
            pinned,
        })?;
        self.set_title(id, title)?;
        Ok(id)
    }

    pub fn set_title(&self, tab: TabId, title: &str) -> Result<()> {
        let mut state = self.state.write();
        let record = state.tabs.get_mut(&tab).ok_or(TabError::NotFound(tab))?;
        record.title = Some(title.to_string());
        Ok(())
    }

    /// Make every subsequent grouping call fail, as a browser does when it
    /// refuses a group (e.g. for pinned tabs).
    pub fn set_reject_grouping(&self, reject: bool) {
        self.state.write().reject_grouping = reject;
    }

    pub fn tab(&self, tab: TabId) -> Result<LiveTab> {
        let state = self.state.read();
        let record = state.tabs.get(&tab).ok_or(TabError::NotFound(tab))?;
        let index = state
            .order
            .get(&record.window_id)
            .and_then(|o| o.iter().position(|id| *id == tab))
            .unwrap_or_default();
        Ok(LiveTab {
            index,
            ..record.clone()
        })
    }

    pub fn group(&self, group: GroupId) -> Result<LiveGroup> {
        self.state
            .read()
            .groups
            .get(&group)
            .cloned()
            .ok_or(TabError::GroupNotFound(group))
    }
}

impl Default for MemoryWindows {
    fn default() -> Self {
        Self::new()
    }
}

impl TabHost for MemoryWindows {
    fn current_window(&self) -> Result<WindowId> {
        self.state.read().current.ok_or(TabError::NoCurrentWindow)
    }

    fn query_tabs(&self, window: WindowId) -> Result<Vec<LiveTab>> {
        let state = self.state.read();
        let order = state
            .order
            .get(&window)
            .ok_or(TabError::WindowNotFound(window))?;

        Ok(order
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                state.tabs.get(id).map(|t| LiveTab {
                    index,
                    ..t.clone()
                })
            })
            .collect())
    }

    fn query_groups(&self, window: WindowId) -> Result<Vec<LiveGroup>> {
        let state = self.state.read();
        if !state.order.contains_key(&window) {
            return Err(TabError::WindowNotFound(window));
        }

        let mut groups: Vec<LiveGroup> = state
            .groups
            .values()
            .filter(|g| g.window_id == window)
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    fn create_tab(&self, props: CreateTab) -> Result<TabId> {
        Url::parse(&props.url).map_err(|e| TabError::InvalidUrl(format!("{}: {}", props.url, e)))?;

        let mut state = self.state.write();
        if !state.order.contains_key(&props.window_id) {
            return Err(TabError::WindowNotFound(props.window_id));
        }

        let id = TabId(state.next_id());
        let index = {
            let order = state.order_mut(props.window_id)?;
            order.push(id);
            order.len() - 1
        };
        state.tabs.insert(
            id,
            LiveTab {
                id,
                window_id: props.window_id,
                index,
                url: props.url,
                title: None,
                pinned: props.pinned,
                active: false,
                group_id: None,
            },
        );

        if props.active {
            state.activate(id);
        } else {
            state.ensure_active(props.window_id);
        }

        tracing::debug!(tab_id = %id, window_id = %props.window_id, "Created tab");

        Ok(id)
    }

    fn update_tab(&self, tab: TabId, update: TabUpdate) -> Result<()> {
        if let Some(url) = update.url.as_deref() {
            Url::parse(url).map_err(|e| TabError::InvalidUrl(format!("{}: {}", url, e)))?;
        }

        let mut state = self.state.write();
        let record = state.tabs.get_mut(&tab).ok_or(TabError::NotFound(tab))?;

        if let Some(url) = update.url {
            record.url = url;
            // Reset title until the page loads
            record.title = None;
        }
        if let Some(pinned) = update.pinned {
            record.pinned = pinned;
        }
        if update.active == Some(true) {
            state.activate(tab);
        }

        Ok(())
    }

    fn group_tabs(&self, tabs: &[TabId]) -> Result<GroupId> {
        let mut state = self.state.write();

        if state.reject_grouping {
            return Err(TabError::Rejected("grouping is not allowed".to_string()));
        }

        let first = tabs
            .first()
            .ok_or_else(|| TabError::Rejected("no tabs to group".to_string()))?;
        let window = state
            .tabs
            .get(first)
            .ok_or(TabError::NotFound(*first))?
            .window_id;
        for id in tabs {
            let record = state.tabs.get(id).ok_or(TabError::NotFound(*id))?;
            if record.window_id != window {
                return Err(TabError::Rejected(
                    "tabs belong to different windows".to_string(),
                ));
            }
        }

        let group_id = GroupId(state.next_id());
        state.groups.insert(
            group_id,
            LiveGroup {
                id: group_id,
                window_id: window,
                title: None,
                color: Some(GroupColor::default()),
                collapsed: false,
            },
        );
        for id in tabs {
            if let Some(record) = state.tabs.get_mut(id) {
                record.group_id = Some(group_id);
            }
        }
        state.prune_groups();

        tracing::debug!(group_id = %group_id, tab_count = tabs.len(), "Grouped tabs");

        Ok(group_id)
    }

    fn update_group(&self, group: GroupId, update: GroupUpdate) -> Result<()> {
        let mut state = self.state.write();
        let record = state
            .groups
            .get_mut(&group)
            .ok_or(TabError::GroupNotFound(group))?;

        if let Some(title) = update.title {
            record.title = Some(title);
        }
        if let Some(color) = update.color {
            record.color = Some(color);
        }
        if let Some(collapsed) = update.collapsed {
            record.collapsed = collapsed;
        }

        Ok(())
    }

    fn ungroup_tabs(&self, tabs: &[TabId]) -> Result<()> {
        let mut state = self.state.write();

        if let Some(missing) = tabs.iter().find(|id| !state.tabs.contains_key(*id)) {
            return Err(TabError::NotFound(*missing));
        }

        for id in tabs {
            if let Some(record) = state.tabs.get_mut(id) {
                record.group_id = None;
            }
        }
        state.prune_groups();

        tracing::debug!(tab_count = tabs.len(), "Ungrouped tabs");

        Ok(())
    }

    fn remove_tabs(&self, tabs: &[TabId]) -> Result<()> {
        let mut state = self.state.write();

        // All or nothing, like the browser call
        if let Some(missing) = tabs.iter().find(|id| !state.tabs.contains_key(*id)) {
            return Err(TabError::NotFound(*missing));
        }

        let mut touched = Vec::new();
        for id in tabs {
            if let Some(record) = state.tabs.remove(id) {
                if let Some(order) = state.order.get_mut(&record.window_id) {
                    order.retain(|t| t != id);
                }
                touched.push(record.window_id);
            }
        }
        for window in touched {
            state.ensure_active(window);
        }
        state.prune_groups();

        tracing::debug!(tab_count = tabs.len(), "Removed tabs");

        Ok(())
    }
}

impl Clone for MemoryWindows {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(host: &MemoryWindows, window: WindowId) -> Vec<String> {
        host.query_tabs(window)
            .unwrap()
            .into_iter()
            .map(|t| t.url)
            .collect()
    }

    #[test]
    fn test_create_and_query_tabs() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        assert_eq!(host.current_window().unwrap(), window);

        let a = host
            .open_tab(window, "https://example.com/a", "A", false)
            .unwrap();
        let b = host
            .open_tab(window, "https://example.com/b", "B", true)
            .unwrap();

        let tabs = host.query_tabs(window).unwrap();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].id, a);
        assert_eq!(tabs[0].index, 0);
        assert_eq!(tabs[1].id, b);
        assert_eq!(tabs[1].index, 1);
        assert!(tabs[1].pinned);

        // First tab in an empty window becomes active
        assert!(tabs[0].active);
        assert!(!tabs[1].active);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let host = MemoryWindows::new();
        let window = host.open_window();

        let result = host.create_tab(CreateTab {
            window_id: window,
            url: "not a url".to_string(),
            active: false,
            pinned: false,
        });
        assert!(matches!(result, Err(TabError::InvalidUrl(_))));
        assert!(host.query_tabs(window).unwrap().is_empty());
    }

    #[test]
    fn test_update_tab_navigates_and_activates() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let a = host.open_tab(window, "https://a.test/", "A", false).unwrap();
        let b = host.open_tab(window, "https://b.test/", "B", false).unwrap();

        host.update_tab(b, TabUpdate::navigate("https://c.test/", true))
            .unwrap();
        let updated = host.tab(b).unwrap();
        assert_eq!(updated.url, "https://c.test/");
        assert!(updated.pinned);
        assert_eq!(updated.title, None);

        host.update_tab(b, TabUpdate::activate()).unwrap();
        assert!(host.tab(b).unwrap().active);
        assert!(!host.tab(a).unwrap().active);
    }

    #[test]
    fn test_grouping_moves_tabs_and_prunes_empty_groups() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let a = host.open_tab(window, "https://a.test/", "A", false).unwrap();
        let b = host.open_tab(window, "https://b.test/", "B", false).unwrap();

        let first = host.group_tabs(&[a, b]).unwrap();
        host.update_group(
            first,
            GroupUpdate {
                title: Some("Work".to_string()),
                color: Some(GroupColor::Blue),
                collapsed: Some(true),
            },
        )
        .unwrap();

        let group = host.group(first).unwrap();
        assert_eq!(group.title.as_deref(), Some("Work"));
        assert_eq!(group.color, Some(GroupColor::Blue));
        assert!(group.collapsed);

        // Regrouping every member leaves the first group empty
        let second = host.group_tabs(&[a, b]).unwrap();
        assert!(host.group(first).is_err());
        assert_eq!(host.query_groups(window).unwrap().len(), 1);
        assert_eq!(host.tab(a).unwrap().group_id, Some(second));
    }

    #[test]
    fn test_ungroup_closes_emptied_groups() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let a = host.open_tab(window, "https://a.test/", "A", false).unwrap();
        let b = host.open_tab(window, "https://b.test/", "B", false).unwrap();
        let group = host.group_tabs(&[a, b]).unwrap();

        host.ungroup_tabs(&[a]).unwrap();
        assert_eq!(host.tab(a).unwrap().group_id, None);
        assert_eq!(host.tab(b).unwrap().group_id, Some(group));

        host.ungroup_tabs(&[b]).unwrap();
        assert!(host.group(group).is_err());
        assert!(host.query_groups(window).unwrap().is_empty());

        // Ungrouping a tab outside any group is a no-op
        host.ungroup_tabs(&[a]).unwrap();
        assert!(matches!(
            host.ungroup_tabs(&[TabId(999)]),
            Err(TabError::NotFound(TabId(999)))
        ));
    }

    #[test]
    fn test_grouping_can_be_rejected() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let a = host.open_tab(window, "https://a.test/", "A", false).unwrap();

        host.set_reject_grouping(true);
        assert!(matches!(host.group_tabs(&[a]), Err(TabError::Rejected(_))));
        assert!(matches!(host.group_tabs(&[]), Err(TabError::Rejected(_))));
    }

    #[test]
    fn test_remove_tabs_reassigns_active() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let a = host.open_tab(window, "https://a.test/", "A", false).unwrap();
        let b = host.open_tab(window, "https://b.test/", "B", false).unwrap();
        host.group_tabs(&[a]).unwrap();

        host.remove_tabs(&[a]).unwrap();
        assert_eq!(urls(&host, window), vec!["https://b.test/"]);
        assert!(host.tab(b).unwrap().active);
        assert!(host.query_groups(window).unwrap().is_empty());

        // Unknown ids fail the whole call
        assert!(host.remove_tabs(&[b, TabId(999)]).is_err());
        assert_eq!(urls(&host, window), vec!["https://b.test/"]);
    }

    #[test]
    fn test_clones_share_state() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let other = host.clone();
        host.open_tab(window, "https://a.test/", "A", false).unwrap();
        assert_eq!(other.query_tabs(window).unwrap().len(), 1);
    }
}
