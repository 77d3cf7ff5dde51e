//! Session export and import files
//!
//! The file format is the store's own: a JSON array of snapshots.

use std::path::Path;

use tabstash_session::{ImportMode, SessionStore, Snapshot};
use tabstash_storage::Persistence;

use crate::Result;

/// Parse the contents of an export file.
pub fn parse_sessions(text: &str) -> Result<Vec<Snapshot>> {
    Ok(serde_json::from_str(text)?)
}

pub fn export_to_file<P: Persistence, Q: AsRef<Path>>(
    store: &SessionStore<P>,
    path: Q,
) -> Result<usize> {
    let exported = store.export()?;
    std::fs::write(path.as_ref(), &exported)?;

    let count = store.list()?.len();
    tracing::info!(path = %path.as_ref().display(), count, "Exported sessions");

    Ok(count)
}

pub fn import_from_file<P: Persistence, Q: AsRef<Path>>(
    store: &SessionStore<P>,
    path: Q,
    mode: ImportMode,
) -> Result<Vec<Snapshot>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let incoming = parse_sessions(&text)?;

    tracing::info!(
        path = %path.as_ref().display(),
        count = incoming.len(),
        "Read session file"
    );

    Ok(store.import(incoming, mode)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabstash_session::Tab;
    use tabstash_storage::Database;

    fn store_with(names: &[&str]) -> SessionStore<Database> {
        let store = SessionStore::new(Database::open_in_memory().unwrap());
        for name in names {
            let mut snapshot = Snapshot::new(*name);
            snapshot.tabs.push(Tab::new("https://example.com/", "Example", false));
            store.save(name, snapshot).unwrap();
        }
        store
    }

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");

        let source = store_with(&["A", "B"]);
        assert_eq!(export_to_file(&source, &path).unwrap(), 2);

        let target = store_with(&["A"]);
        let sessions = import_from_file(&target, &path, ImportMode::Merge).unwrap();
        let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
        // Imported in file order, each pushed to the front
        assert_eq!(names, vec!["A (1)", "B", "A"]);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_sessions(r#"{ "name": "A" }"#).is_err());
        assert!(parse_sessions("[]").unwrap().is_empty());
    }

    #[test]
    fn test_import_missing_file() {
        let store = store_with(&[]);
        assert!(import_from_file(&store, "/nonexistent/sessions.json", ImportMode::Merge).is_err());
    }
}
