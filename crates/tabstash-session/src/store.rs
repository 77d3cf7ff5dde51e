//! Session Store
//!
//! An ordered, named collection of snapshots kept as one serialized value.
//! Every mutation fetches the whole collection, transforms it in memory and
//! writes it back while holding the store's writer lock, so mutations made
//! through one store (or any of its clones) are applied one after another.
//! Separate processes sharing the same database are not coordinated.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tabstash_storage::Persistence;

use crate::error::SessionError;
use crate::snapshot::{imported_session_name, Snapshot, Tab};
use crate::Result;

/// Key the collection is persisted under.
pub const SESSIONS_KEY: &str = "sessions";

/// What `rename` does when the new name already belongs to another session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameCollision {
    /// Rename anyway; both sessions carry the name and lookups find the
    /// first one.
    #[default]
    Allow,
    /// Fail with [`SessionError::NameTaken`].
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Insert incoming sessions at the front, renaming on collision
    #[default]
    Merge,
    /// Replace the whole collection
    Overwrite,
}

pub struct SessionStore<P> {
    persistence: P,
    /// Held across every fetch-modify-store cycle
    write_lock: Arc<Mutex<()>>,
    rename_collision: RenameCollision,
}

impl<P: Persistence> SessionStore<P> {
    pub fn new(persistence: P) -> Self {
        Self {
            persistence,
            write_lock: Arc::new(Mutex::new(())),
            rename_collision: RenameCollision::default(),
        }
    }

    pub fn with_rename_collision(mut self, policy: RenameCollision) -> Self {
        self.rename_collision = policy;
        self
    }

    pub fn rename_collision(&self) -> RenameCollision {
        self.rename_collision
    }

    /// Load the collection, validating group references on the way in.
    fn load(&self) -> Result<Vec<Snapshot>> {
        let Some(raw) = self.persistence.get(SESSIONS_KEY)? else {
            return Ok(Vec::new());
        };

        let mut sessions: Vec<Snapshot> = serde_json::from_str(&raw)?;
        for session in &mut sessions {
            session.normalize();
        }
        Ok(sessions)
    }

    fn store(&self, sessions: &[Snapshot]) -> Result<()> {
        let serialized = serde_json::to_string(sessions)?;
        self.persistence.set(SESSIONS_KEY, &serialized)?;
        Ok(())
    }

    /// Run one fetch-modify-store cycle. Nothing is written if `f` fails.
    fn mutate<F>(&self, f: F) -> Result<Vec<Snapshot>>
    where
        F: FnOnce(&mut Vec<Snapshot>) -> Result<()>,
    {
        let _guard = self.write_lock.lock();
        let mut sessions = self.load()?;
        f(&mut sessions)?;
        self.store(&sessions)?;
        Ok(sessions)
    }

    pub fn list(&self) -> Result<Vec<Snapshot>> {
        self.load()
    }

    pub fn get(&self, name: &str) -> Result<Snapshot> {
        self.load()?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))
    }

    /// Store `snapshot` as `name`: in place if the name exists, otherwise at
    /// the front.
    pub fn save(&self, name: &str, mut snapshot: Snapshot) -> Result<Vec<Snapshot>> {
        if name.trim().is_empty() {
            return Err(SessionError::EmptyName);
        }
        snapshot.name = name.to_string();
        snapshot.normalize();

        let sessions = self.mutate(|sessions| {
            match sessions.iter().position(|s| s.name == name) {
                Some(index) => sessions[index] = snapshot,
                None => sessions.insert(0, snapshot),
            }
            Ok(())
        })?;

        tracing::info!(session_name = %name, total = sessions.len(), "Saved session");

        Ok(sessions)
    }

    /// Remove the session called `name`. Missing names are not an error.
    pub fn delete(&self, name: &str) -> Result<Vec<Snapshot>> {
        let mut removed = 0;
        let sessions = self.mutate(|sessions| {
            let before = sessions.len();
            sessions.retain(|s| s.name != name);
            removed = before - sessions.len();
            Ok(())
        })?;

        tracing::info!(session_name = %name, removed, "Deleted session");

        Ok(sessions)
    }

    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<Vec<Snapshot>> {
        if new_name.trim().is_empty() {
            return Err(SessionError::EmptyName);
        }

        let policy = self.rename_collision;
        let sessions = self.mutate(|sessions| {
            let index = sessions
                .iter()
                .position(|s| s.name == old_name)
                .ok_or_else(|| SessionError::NotFound(old_name.to_string()))?;

            if old_name == new_name {
                return Ok(());
            }

            if sessions.iter().any(|s| s.name == new_name) {
                match policy {
                    RenameCollision::Reject => {
                        return Err(SessionError::NameTaken(new_name.to_string()))
                    }
                    RenameCollision::Allow => tracing::warn!(
                        session_name = %new_name,
                        "Rename shadows an existing session with the same name"
                    ),
                }
            }

            sessions[index].name = new_name.to_string();
            Ok(())
        })?;

        tracing::info!(from = %old_name, to = %new_name, "Renamed session");

        Ok(sessions)
    }

    /// Rewrite the collection as exactly the sessions named in `order`, in
    /// that order.
    ///
    /// This is the visible-order contract: sessions whose names are not in
    /// `order` are removed from the store, and names that match nothing are
    /// ignored.
    pub fn reorder<S: AsRef<str>>(&self, order: &[S]) -> Result<Vec<Snapshot>> {
        let mut dropped = Vec::new();
        let sessions = self.mutate(|sessions| {
            let mut remaining: Vec<Option<Snapshot>> =
                std::mem::take(sessions).into_iter().map(Some).collect();

            for name in order {
                let name = name.as_ref();
                let found = remaining
                    .iter_mut()
                    .find(|slot| slot.as_ref().is_some_and(|s| s.name == name))
                    .and_then(Option::take);
                if let Some(session) = found {
                    sessions.push(session);
                }
            }

            dropped = remaining.into_iter().flatten().map(|s| s.name).collect();
            Ok(())
        })?;

        if !dropped.is_empty() {
            tracing::warn!(dropped = ?dropped, "Reorder removed sessions missing from the new order");
        }

        Ok(sessions)
    }

    pub fn import(&self, incoming: Vec<Snapshot>, mode: ImportMode) -> Result<Vec<Snapshot>> {
        let count = incoming.len();
        let sessions = self.mutate(|sessions| {
            match mode {
                ImportMode::Overwrite => {
                    *sessions = incoming;
                    for session in sessions.iter_mut() {
                        session.normalize();
                    }
                }
                ImportMode::Merge => {
                    for mut session in incoming {
                        session.name = unique_import_name(sessions, &session);
                        session.normalize();
                        sessions.insert(0, session);
                    }
                }
            }
            Ok(())
        })?;

        tracing::info!(imported = count, mode = ?mode, total = sessions.len(), "Imported sessions");

        Ok(sessions)
    }

    /// The collection in the export file format.
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.load()?)?)
    }

    /// Remove every session.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.persistence.remove(SESSIONS_KEY)?;

        tracing::info!("Cleared all sessions");

        Ok(())
    }

    /// Append `tab` to the session called `name`.
    pub fn add_tab(&self, name: &str, tab: Tab) -> Result<Vec<Snapshot>> {
        let url = tab.url.clone();
        let sessions = self.mutate(|sessions| {
            let session = find_mut(sessions, name)?;
            session.tabs.push(tab);
            session.touch();
            Ok(())
        })?;

        tracing::info!(session_name = %name, url = %url, "Added tab to session");

        Ok(sessions)
    }

    /// Replace the contents of the session called `name` with `captured`,
    /// keeping its name and position.
    pub fn update(&self, name: &str, mut captured: Snapshot) -> Result<Vec<Snapshot>> {
        captured.normalize();
        let tab_count = captured.tab_count();
        let sessions = self.mutate(|sessions| {
            find_mut(sessions, name)?.replace_contents(captured);
            Ok(())
        })?;

        tracing::info!(session_name = %name, tab_count, "Updated session contents");

        Ok(sessions)
    }
}

impl<P: Clone> Clone for SessionStore<P> {
    fn clone(&self) -> Self {
        Self {
            persistence: self.persistence.clone(),
            write_lock: Arc::clone(&self.write_lock),
            rename_collision: self.rename_collision,
        }
    }
}

fn find_mut<'a>(sessions: &'a mut [Snapshot], name: &str) -> Result<&'a mut Snapshot> {
    sessions
        .iter_mut()
        .find(|s| s.name == name)
        .ok_or_else(|| SessionError::NotFound(name.to_string()))
}

/// Pick a name for an imported session that no current session uses.
///
/// Blank names become `Imported <date>`. On collision the suffix ` (N)` is
/// appended to the original name (or `Imported`), counting up from 1.
fn unique_import_name(sessions: &[Snapshot], incoming: &Snapshot) -> String {
    let base = Some(incoming.name.as_str())
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string);
    let taken = |candidate: &str| sessions.iter().any(|s| s.name == candidate);

    let mut name = base
        .clone()
        .unwrap_or_else(|| imported_session_name(incoming.created_at));
    let stem = base.unwrap_or_else(|| "Imported".to_string());
    let mut attempt = 1;
    while taken(&name) {
        name = format!("{} ({})", stem, attempt);
        attempt += 1;
    }
    name
}
