use crate::core::db;
use crate::core::error;
use crate::core::schemas;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Single entry point for word store access.
/// Serializes connections in-process and appends one audit line per mutating operation.
/// Reads go through [`DbBroker::with_read_conn`] and leave no audit line.
pub struct DbBroker {
    audit_log_path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

static DB_LOCK: Mutex<()> = Mutex::new(());

impl DbBroker {
    pub fn new(root: &Path) -> Self {
        Self {
            audit_log_path: root.join(schemas::EVENTS_LOG_NAME),
        }
    }

    pub fn audit_log_path(&self) -> &Path {
        &self.audit_log_path
    }

    /// Execute a writing closure with a serialized connection and audit the outcome.
    pub fn with_conn<F, R>(
        &self,
        db_path: &Path,
        actor: &str,
        op_name: &str,
        f: F,
    ) -> Result<R, error::VaultError>
    where
        F: FnOnce(&Connection) -> Result<R, error::VaultError>,
    {
        let _lock = DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let conn = db::db_connect(&db_path.to_string_lossy())?;

        let result = f(&conn);

        let status = if result.is_ok() { "success" } else { "error" };
        self.log_event(actor, op_name, &db_id, status)?;

        result
    }

    /// Execute a read-only closure with a serialized connection. Not audited.
    pub fn with_read_conn<F, R>(&self, db_path: &Path, f: F) -> Result<R, error::VaultError>
    where
        F: FnOnce(&Connection) -> Result<R, error::VaultError>,
    {
        let _lock = DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let conn = db::db_connect(&db_path.to_string_lossy())?;
        f(&conn)
    }

    fn log_event(
        &self,
        actor: &str,
        op: &str,
        db_id: &str,
        status: &str,
    ) -> Result<(), error::VaultError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: actor.to_string(),
            op: op.to_string(),
            db_id: db_id.to_string(),
            status: status.to_string(),
        };

        let line = serde_json::to_string(&ev)
            .map_err(|e| error::VaultError::ValidationError(e.to_string()))?;

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(error::VaultError::IoError)?;

        writeln!(f, "{}", line).map_err(error::VaultError::IoError)?;
        Ok(())
    }
}

/// Read back the audit log, skipping lines that fail to parse.
pub fn read_events(root: &Path) -> Result<Vec<BrokerEvent>, error::VaultError> {
    let path = root.join(schemas::EVENTS_LOG_NAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(error::VaultError::IoError)?;
    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str::<BrokerEvent>(line).ok())
        .collect())
}
