//! Capture: live window state into a snapshot.

use tabstash_tabs::{GroupId, LiveTab, TabHost, WindowId};

use crate::snapshot::{Group, Snapshot, Tab};
use crate::Result;

/// Read `window` into an unnamed snapshot. Read-only against the window.
///
/// Tab order is the window's on-screen order. Groups are listed in order of
/// their first member and reference tabs by that order.
pub fn capture<H: TabHost + ?Sized>(host: &H, window: WindowId) -> Result<Snapshot> {
    let tabs = sorted_tabs(host, window)?;
    let metadata = host.query_groups(window)?;

    let mut members: Vec<(GroupId, Vec<usize>)> = Vec::new();
    for (position, tab) in tabs.iter().enumerate() {
        let Some(group_id) = tab.group_id else {
            continue;
        };
        match members.iter_mut().find(|(id, _)| *id == group_id) {
            Some((_, indices)) => indices.push(position),
            None => members.push((group_id, vec![position])),
        }
    }

    let groups = members
        .into_iter()
        .map(|(id, indices)| {
            let meta = metadata.iter().find(|g| g.id == id);
            Group {
                indices,
                title: meta.and_then(|g| g.title.clone()).unwrap_or_default(),
                color: meta.and_then(|g| g.color).unwrap_or_default(),
                collapsed: meta.is_some_and(|g| g.collapsed),
            }
        })
        .collect::<Vec<_>>();

    let mut snapshot = Snapshot::new(String::new());
    snapshot.active_index = tabs.iter().position(|t| t.active);
    snapshot.tabs = tabs.into_iter().map(to_tab).collect();
    snapshot.groups = groups;

    tracing::debug!(
        window_id = %window,
        tab_count = snapshot.tabs.len(),
        group_count = snapshot.groups.len(),
        "Captured window"
    );

    Ok(snapshot)
}

/// The active tab of `window`, if it has one.
pub fn capture_active_tab<H: TabHost + ?Sized>(host: &H, window: WindowId) -> Result<Option<Tab>> {
    Ok(host
        .query_tabs(window)?
        .into_iter()
        .find(|t| t.active)
        .map(to_tab))
}

fn sorted_tabs<H: TabHost + ?Sized>(host: &H, window: WindowId) -> Result<Vec<LiveTab>> {
    let mut tabs = host.query_tabs(window)?;
    tabs.sort_by_key(|t| t.index);
    Ok(tabs)
}

fn to_tab(tab: LiveTab) -> Tab {
    Tab {
        url: tab.url,
        title: tab.title.unwrap_or_default(),
        pinned: tab.pinned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabstash_tabs::{GroupColor, GroupUpdate, MemoryWindows};

    #[test]
    fn test_capture_empty_window() {
        let host = MemoryWindows::new();
        let window = host.open_window();

        let snapshot = capture(&host, window).unwrap();
        assert!(snapshot.tabs.is_empty());
        assert!(snapshot.groups.is_empty());
        assert_eq!(snapshot.active_index, None);
    }

    #[test]
    fn test_capture_tabs_and_active() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        host.open_tab(window, "https://a.test/", "A", true).unwrap();
        let b = host.open_tab(window, "https://b.test/", "B", false).unwrap();
        host.update_tab(b, tabstash_tabs::TabUpdate::activate())
            .unwrap();

        let snapshot = capture(&host, window).unwrap();
        assert_eq!(
            snapshot.tabs,
            vec![
                Tab::new("https://a.test/", "A", true),
                Tab::new("https://b.test/", "B", false),
            ]
        );
        assert_eq!(snapshot.active_index, Some(1));
    }

    #[test]
    fn test_capture_group_example() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let first = host.open_tab(window, "https://a.test/", "A", false).unwrap();
        host.open_tab(window, "https://b.test/", "B", false).unwrap();

        let group = host.group_tabs(&[first]).unwrap();
        host.update_group(
            group,
            GroupUpdate {
                title: Some("Work".to_string()),
                color: Some(GroupColor::Blue),
                collapsed: None,
            },
        )
        .unwrap();

        let snapshot = capture(&host, window).unwrap();
        assert_eq!(
            snapshot.groups,
            vec![Group {
                indices: vec![0],
                title: "Work".to_string(),
                color: GroupColor::Blue,
                collapsed: false,
            }]
        );
    }

    #[test]
    fn test_capture_non_contiguous_group_in_first_seen_order() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        let a = host.open_tab(window, "https://a.test/", "A", false).unwrap();
        let b = host.open_tab(window, "https://b.test/", "B", false).unwrap();
        let c = host.open_tab(window, "https://c.test/", "C", false).unwrap();

        host.group_tabs(&[b]).unwrap();
        host.group_tabs(&[a, c]).unwrap();

        let snapshot = capture(&host, window).unwrap();
        assert_eq!(snapshot.groups.len(), 2);
        assert_eq!(snapshot.groups[0].indices, vec![0, 2]);
        assert_eq!(snapshot.groups[1].indices, vec![1]);
        // No metadata set: defaults
        assert_eq!(snapshot.groups[0].title, "");
        assert_eq!(snapshot.groups[0].color, GroupColor::Grey);
    }

    #[test]
    fn test_capture_active_tab() {
        let host = MemoryWindows::new();
        let window = host.open_window();
        assert_eq!(capture_active_tab(&host, window).unwrap(), None);

        host.open_tab(window, "https://a.test/", "A", false).unwrap();
        let active = capture_active_tab(&host, window).unwrap().unwrap();
        assert_eq!(active.url, "https://a.test/");
    }

    #[test]
    fn test_capture_unknown_window_fails() {
        let host = MemoryWindows::new();
        assert!(capture(&host, WindowId(42)).is_err());
    }
}
