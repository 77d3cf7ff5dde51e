//! Request dispatcher
//!
//! Routes protocol requests to the session store and the tab host. Holds no
//! state of its own beyond those two.

use serde::Serialize;
use serde_json::Value;

use tabstash_session::{
    capture, capture_active_tab, default_session_name, ImportMode, MaterializeReport,
    Materializer, SessionStore, Snapshot,
};
use tabstash_storage::{Database, Persistence};
use tabstash_tabs::TabHost;

use crate::config::Config;
use crate::error::CoreError;
use crate::protocol::{
    ImportPayload, NamePayload, Operation, RenamePayload, ReorderPayload, Request, Response,
    SavePayload,
};
use crate::Result;

pub struct Dispatcher<H, P = Database> {
    store: SessionStore<P>,
    host: H,
}

impl<H: TabHost> Dispatcher<H, Database> {
    /// Open the configured database and build a dispatcher over it.
    pub fn open(config: &Config, host: H) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::open(&config.database_path)?;
        let store = SessionStore::new(db).with_rename_collision(config.rename_collision);

        tracing::info!(
            path = %config.database_path.display(),
            rename_collision = ?store.rename_collision(),
            "Dispatcher ready"
        );

        Ok(Self::new(store, host))
    }
}

impl<H: TabHost, P: Persistence> Dispatcher<H, P> {
    pub fn new(store: SessionStore<P>, host: H) -> Self {
        Self { store, host }
    }

    pub fn store(&self) -> &SessionStore<P> {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Handle one request. Failures are reported in the response, never
    /// returned.
    pub fn handle(&self, request: Request) -> Response {
        match self.dispatch(&request) {
            Ok(data) => Response::ok(data),
            Err(e) => {
                tracing::warn!(operation = %request.operation, error = %e, "Request failed");
                Response::err(e.to_string())
            }
        }
    }

    /// Handle a request given as JSON text and answer with JSON text.
    pub fn handle_json(&self, text: &str) -> String {
        let response = match serde_json::from_str::<Request>(text) {
            Ok(request) => self.handle(request),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request");
                Response::err(CoreError::from(e).to_string())
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| failure_json(&e.to_string()))
    }

    fn dispatch(&self, request: &Request) -> Result<Value> {
        let operation: Operation = request.operation.parse()?;
        tracing::debug!(%operation, "Dispatching request");

        match operation {
            Operation::Save => {
                let SavePayload { name } = request.payload()?;
                to_value(self.save(name)?)
            }
            Operation::List => to_value(self.store.list()?),
            Operation::Get => {
                let NamePayload { name } = request.payload()?;
                to_value(self.store.get(&name)?)
            }
            Operation::AddToWindow => {
                let NamePayload { name } = request.payload()?;
                to_value(self.add_to_window(&name)?)
            }
            Operation::ReplaceWindow => {
                let NamePayload { name } = request.payload()?;
                to_value(self.replace_window(&name)?)
            }
            Operation::Delete => {
                let NamePayload { name } = request.payload()?;
                to_value(self.store.delete(&name)?)
            }
            Operation::Rename => {
                let RenamePayload { old_name, new_name } = request.payload()?;
                to_value(self.store.rename(&old_name, &new_name)?)
            }
            Operation::Reorder => {
                let ReorderPayload { order } = request.payload()?;
                to_value(self.store.reorder(order.as_slice())?)
            }
            Operation::Import => {
                let ImportPayload { sessions, mode } = request.payload()?;
                to_value(self.import(sessions, mode)?)
            }
            Operation::Export => Ok(Value::String(self.store.export()?)),
            Operation::AddTab => {
                let NamePayload { name } = request.payload()?;
                to_value(self.add_tab(&name)?)
            }
            Operation::Refresh => {
                let NamePayload { name } = request.payload()?;
                to_value(self.refresh(&name)?)
            }
            Operation::Clear => {
                self.store.clear()?;
                Ok(Value::Array(Vec::new()))
            }
        }
    }

    /// Capture the current window and store it under `name`, or under a
    /// dated default name.
    pub fn save(&self, name: Option<String>) -> Result<Vec<Snapshot>> {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(default_session_name);

        let window = self.host.current_window()?;
        let snapshot = capture(&self.host, window)?;
        Ok(self.store.save(&name, snapshot)?)
    }

    /// Open a stored session's tabs after the current window's tabs.
    pub fn add_to_window(&self, name: &str) -> Result<MaterializeReport> {
        let snapshot = self.store.get(name)?;
        let window = self.host.current_window()?;
        let report = Materializer::new(&self.host).append(&snapshot, window);

        tracing::info!(session_name = %name, summary = %report.summary(), "Added session to window");
        Ok(report)
    }

    /// Make the current window hold exactly a stored session's tabs.
    pub fn replace_window(&self, name: &str) -> Result<MaterializeReport> {
        let snapshot = self.store.get(name)?;
        let window = self.host.current_window()?;
        let report = Materializer::new(&self.host).replace(&snapshot, window)?;

        tracing::info!(session_name = %name, summary = %report.summary(), "Replaced window with session");
        Ok(report)
    }

    pub fn import(&self, sessions: Vec<Snapshot>, mode: ImportMode) -> Result<Vec<Snapshot>> {
        Ok(self.store.import(sessions, mode)?)
    }

    /// Append the current window's active tab to a stored session.
    pub fn add_tab(&self, name: &str) -> Result<Vec<Snapshot>> {
        let window = self.host.current_window()?;
        let tab = capture_active_tab(&self.host, window)?.ok_or(CoreError::NoActiveTab(window))?;
        Ok(self.store.add_tab(name, tab)?)
    }

    /// Replace a stored session's contents with the current window.
    pub fn refresh(&self, name: &str) -> Result<Vec<Snapshot>> {
        let window = self.host.current_window()?;
        let snapshot = capture(&self.host, window)?;
        Ok(self.store.update(name, snapshot)?)
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// A failure reply built without going through [`Response`].
fn failure_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}
