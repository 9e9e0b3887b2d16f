use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::migration;
use crate::core::store::Store;
use rusqlite::Connection;
use std::fs;

pub fn db_connect(db_path: &str) -> Result<Connection, error::VaultError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::VaultError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::VaultError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::VaultError::RusqliteError)?;
    Ok(conn)
}

/// Create the store directory and bring the word database up to the current schema version.
///
/// Any failure here means the vault cannot run at all, so it is reported as
/// `StoreUnavailable` rather than the underlying SQLite/I/O error.
pub fn initialize_vault(store: &Store) -> Result<migration::SchemaReport, error::VaultError> {
    let unavailable = |e: error::VaultError| {
        error::VaultError::StoreUnavailable(format!("{}: {}", store.db_path().display(), e))
    };

    fs::create_dir_all(&store.root)
        .map_err(error::VaultError::IoError)
        .map_err(unavailable)?;

    let broker = DbBroker::new(&store.root);
    let report = broker
        .with_conn(store.db_path(), "wordvault", "vault.init", migration::ensure_schema)
        .map_err(unavailable)?;

    log::debug!(
        "word store ready at {} (schema v{})",
        store.db_path().display(),
        report.to_version
    );
    Ok(report)
}
