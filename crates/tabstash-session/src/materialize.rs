//! Materializer: a snapshot back into a live window.
//!
//! Platform calls are made one item at a time. A failed item is logged and
//! recorded in the [`MaterializeReport`]; the remaining items still run and
//! nothing is rolled back.

use serde::Serialize;
use std::collections::HashSet;

use tabstash_tabs::{CreateTab, GroupUpdate, TabError, TabHost, TabId, TabUpdate, WindowId};

use crate::snapshot::Snapshot;
use crate::Result;

/// Where the anchor tab is sent when the snapshot has no tabs at all.
pub const BLANK_URL: &str = "about:blank";

/// The unit of work a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "camelCase")]
pub enum RestoreStep {
    /// Reusing (or creating) the first tab of a replaced window
    Anchor,
    /// Creating the tab at this snapshot position
    Tab(usize),
    /// Creating the group at this position of the snapshot's groups
    Group(usize),
    Activate,
    /// Closing the window's previous tabs
    Remove,
}

impl std::fmt::Display for RestoreStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestoreStep::Anchor => write!(f, "anchor tab"),
            RestoreStep::Tab(i) => write!(f, "tab #{}", i),
            RestoreStep::Group(i) => write!(f, "group #{}", i),
            RestoreStep::Activate => write!(f, "activation"),
            RestoreStep::Remove => write!(f, "tab removal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub step: RestoreStep,
    pub error: String,
}

/// Outcome of restoring a snapshot into a window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializeReport {
    pub tabs_created: usize,
    /// 1 when an existing tab was navigated in place instead of created
    pub tabs_reused: usize,
    pub groups_created: usize,
    pub tabs_removed: usize,
    pub failures: Vec<StepFailure>,
}

impl MaterializeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        let base = format!(
            "Restored {} tab(s) in {} group(s)",
            self.tabs_created + self.tabs_reused,
            self.groups_created
        );
        if self.is_complete() {
            base
        } else {
            format!("{} ({} failure(s))", base, self.failures.len())
        }
    }

    fn fail(&mut self, step: RestoreStep, error: &TabError) {
        tracing::warn!(step = %step, error = %error, "Restore step failed");
        self.failures.push(StepFailure {
            step,
            error: error.to_string(),
        });
    }
}

/// Restores snapshots through a [`TabHost`].
pub struct Materializer<'a, H: TabHost + ?Sized> {
    host: &'a H,
}

impl<'a, H: TabHost + ?Sized> Materializer<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Open the snapshot's tabs and groups in `window` after whatever is
    /// already there. Existing tabs are left alone.
    pub fn append(&self, snapshot: &Snapshot, window: WindowId) -> MaterializeReport {
        tracing::info!(
            session_name = %snapshot.name,
            window_id = %window,
            tab_count = snapshot.tab_count(),
            "Appending session to window"
        );

        let mut report = MaterializeReport::default();
        let mut slots = Vec::with_capacity(snapshot.tab_count());

        self.create_tabs(snapshot, window, 0, &mut slots, &mut report);
        self.apply_groups(snapshot, &slots, &mut report);
        self.activate_first(&slots, &mut report);

        tracing::info!(session_name = %snapshot.name, "{}", report.summary());

        report
    }

    /// Make `window` hold exactly the snapshot's tabs and groups.
    ///
    /// The active tab (or the first one) is navigated in place so the window
    /// is never empty; every other previous tab is closed at the end. Fails
    /// only if the window's current tabs cannot be read, before anything is
    /// changed.
    pub fn replace(&self, snapshot: &Snapshot, window: WindowId) -> Result<MaterializeReport> {
        let mut before = self.host.query_tabs(window)?;
        before.sort_by_key(|t| t.index);

        tracing::info!(
            session_name = %snapshot.name,
            window_id = %window,
            tab_count = snapshot.tab_count(),
            replacing = before.len(),
            "Replacing window with session"
        );

        let mut report = MaterializeReport::default();
        let mut slots = Vec::with_capacity(snapshot.tab_count().max(1));
        let mut keep = HashSet::new();

        let (url, pinned) = snapshot
            .tabs
            .first()
            .map(|t| (t.url.as_str(), t.pinned))
            .unwrap_or((BLANK_URL, false));

        let anchor = before.iter().find(|t| t.active).or_else(|| before.first());
        match anchor {
            Some(tab) => {
                // Kept even if navigation fails, so the window is never tab-less
                keep.insert(tab.id);
                match self.host.update_tab(tab.id, TabUpdate::navigate(url, pinned)) {
                    Ok(()) => {
                        report.tabs_reused += 1;
                        slots.push(Some(tab.id));
                    }
                    Err(e) => {
                        report.fail(RestoreStep::Anchor, &e);
                        slots.push(None);
                    }
                }
                // Its old group must not survive into the restored layout
                if tab.group_id.is_some() {
                    if let Err(e) = self.host.ungroup_tabs(&[tab.id]) {
                        report.fail(RestoreStep::Anchor, &e);
                    }
                }
            }
            None => {
                let created = self.host.create_tab(CreateTab {
                    window_id: window,
                    url: url.to_string(),
                    active: false,
                    pinned,
                });
                match created {
                    Ok(id) => {
                        report.tabs_created += 1;
                        slots.push(Some(id));
                    }
                    Err(e) => {
                        report.fail(RestoreStep::Anchor, &e);
                        slots.push(None);
                    }
                }
            }
        }

        self.create_tabs(snapshot, window, 1, &mut slots, &mut report);
        self.apply_groups(snapshot, &slots, &mut report);
        self.activate_first(&slots, &mut report);

        keep.extend(slots.iter().flatten().copied());
        let to_remove: Vec<TabId> = before
            .iter()
            .map(|t| t.id)
            .filter(|id| !keep.contains(id))
            .collect();
        if !to_remove.is_empty() {
            match self.host.remove_tabs(&to_remove) {
                Ok(()) => report.tabs_removed = to_remove.len(),
                Err(e) => report.fail(RestoreStep::Remove, &e),
            }
        }

        tracing::info!(
            session_name = %snapshot.name,
            removed = report.tabs_removed,
            "{}",
            report.summary()
        );

        Ok(report)
    }

    /// Create the snapshot's tabs from position `start` on, pushing one slot
    /// per tab. A failed tab leaves a `None` so positions stay aligned.
    fn create_tabs(
        &self,
        snapshot: &Snapshot,
        window: WindowId,
        start: usize,
        slots: &mut Vec<Option<TabId>>,
        report: &mut MaterializeReport,
    ) {
        for (position, tab) in snapshot.tabs.iter().enumerate().skip(start) {
            let created = self.host.create_tab(CreateTab {
                window_id: window,
                url: tab.url.clone(),
                active: false,
                pinned: tab.pinned,
            });
            match created {
                Ok(id) => {
                    report.tabs_created += 1;
                    slots.push(Some(id));
                }
                Err(e) => {
                    report.fail(RestoreStep::Tab(position), &e);
                    slots.push(None);
                }
            }
        }
    }

    fn apply_groups(
        &self,
        snapshot: &Snapshot,
        slots: &[Option<TabId>],
        report: &mut MaterializeReport,
    ) {
        for (position, group) in snapshot.groups.iter().enumerate() {
            let members: Vec<TabId> = group
                .indices
                .iter()
                .filter_map(|&index| slots.get(index).copied().flatten())
                .collect();
            if members.is_empty() {
                continue;
            }

            let result = self.host.group_tabs(&members).and_then(|group_id| {
                self.host.update_group(
                    group_id,
                    GroupUpdate {
                        title: Some(group.title.clone()),
                        color: Some(group.color),
                        collapsed: Some(group.collapsed),
                    },
                )
            });
            match result {
                Ok(()) => report.groups_created += 1,
                Err(e) => report.fail(RestoreStep::Group(position), &e),
            }
        }
    }

    fn activate_first(&self, slots: &[Option<TabId>], report: &mut MaterializeReport) {
        let Some(first) = slots.iter().flatten().next() else {
            return;
        };
        if let Err(e) = self.host.update_tab(*first, TabUpdate::activate()) {
            report.fail(RestoreStep::Activate, &e);
        }
    }
}
