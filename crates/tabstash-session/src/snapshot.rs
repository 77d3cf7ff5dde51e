//! Snapshot data structures
//!
//! The persisted shape of a session. Field names on the wire are camelCase
//! (`createdAt`, `activeIndex`) so exported files stay readable by the
//! browser-side tooling that produced earlier exports.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use tabstash_tabs::GroupColor;

/// One tab at capture time. Its identity is its position in the owning
/// snapshot's `tabs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinned: bool,
}

impl Tab {
    pub fn new(url: impl Into<String>, title: impl Into<String>, pinned: bool) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            pinned,
        }
    }
}

/// A tab group, referring to its members by position in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub indices: Vec<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: GroupColor,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Unique within a store; uniqueness is enforced when writing
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tabs: Vec<Tab>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default, with = "active_index")]
    pub active_index: Option<usize>,
}

impl Snapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            tabs: Vec::new(),
            groups: Vec::new(),
            active_index: None,
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Mark the snapshot as modified now.
    pub fn touch(&mut self) {
        self.created_at = Utc::now();
    }

    /// Take the captured contents of `other`, keeping this snapshot's name.
    pub fn replace_contents(&mut self, other: Snapshot) {
        self.tabs = other.tabs;
        self.groups = other.groups;
        self.active_index = other.active_index;
        self.touch();
    }

    /// Drop group indices that do not point at a tab of this snapshot.
    ///
    /// A tab belongs to at most one group: the first group listing it keeps
    /// it. Groups left without members are removed, and an out-of-range
    /// active index is cleared. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let tab_count = self.tabs.len();
        let mut claimed = vec![false; tab_count];
        let mut changed = false;

        for group in &mut self.groups {
            let before = group.indices.len();
            group.indices.retain(|&index| {
                if index < tab_count && !claimed[index] {
                    claimed[index] = true;
                    true
                } else {
                    false
                }
            });
            changed |= group.indices.len() != before;
        }

        let before = self.groups.len();
        self.groups.retain(|g| !g.indices.is_empty());
        changed |= self.groups.len() != before;

        if self.active_index.is_some_and(|i| i >= tab_count) {
            self.active_index = None;
            changed = true;
        }

        if changed {
            tracing::warn!(
                session_name = %self.name,
                tab_count,
                "Dropped out-of-range or duplicate group references"
            );
        }

        changed
    }
}

/// Name used when a session is saved without one.
pub fn default_session_name() -> String {
    format!("Session {}", display_date(Utc::now()))
}

/// Name used for an imported session that has none.
pub fn imported_session_name(created_at: DateTime<Utc>) -> String {
    format!("Imported {}", display_date(created_at))
}

fn display_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `Option<usize>` on the wire as an integer, `-1` meaning none.
mod active_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(index) => serializer.serialize_u64(*index as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.and_then(|i| usize::try_from(i).ok()))
    }
}
