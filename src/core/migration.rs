//! Schema versioning and migration for the word database.
//!
//! The persisted schema carries an explicit version tag (`meta.schema_version`).
//! Databases written before the tag existed have no `meta` table and are treated as
//! version 1; they are recognised by table presence only, never by column inspection.
//!
//! - **Migrations run automatically** when a store is opened.
//! - **Each migration runs in one transaction** and bumps the version on success.
//! - **Newer-than-binary databases are refused** instead of being rewritten.

use crate::core::error;
use crate::core::schemas;
use crate::core::time;
use crate::plugins::sm2;
use crate::plugins::words::WordStatus;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

/// One step from `from_version` to `from_version + 1`.
pub struct Migration {
    pub from_version: u32,
    pub description: &'static str,
    pub up: fn(&Connection) -> Result<(), error::VaultError>,
}

/// What `ensure_schema` did to the database.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SchemaReport {
    pub from_version: u32,
    pub to_version: u32,
    pub applied: Vec<&'static str>,
}

/// All migrations in chronological order.
pub fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        from_version: 1,
        description: "Rebuild words keyed by word, map legacy status labels",
        up: migrate_legacy_words,
    }]
}

/// Create or upgrade the schema so the connection is at `SCHEMA_VERSION`.
pub fn ensure_schema(conn: &Connection) -> Result<SchemaReport, error::VaultError> {
    let from_version = match stored_version(conn)? {
        Some(v) => v,
        None if table_exists(conn, "words")? => schemas::LEGACY_SCHEMA_VERSION,
        None => schemas::SCHEMA_VERSION,
    };

    if from_version > schemas::SCHEMA_VERSION {
        return Err(error::VaultError::ValidationError(format!(
            "word database is at schema v{} but this build only understands up to v{}",
            from_version,
            schemas::SCHEMA_VERSION
        )));
    }

    let mut applied = Vec::new();
    let mut version = from_version;
    for migration in all_migrations() {
        if migration.from_version != version {
            continue;
        }
        log::info!(
            "migrating word database v{} -> v{}: {}",
            version,
            version + 1,
            migration.description
        );
        let tx = conn.unchecked_transaction()?;
        (migration.up)(&tx)?;
        version += 1;
        write_version(&tx, version)?;
        tx.commit()?;
        applied.push(migration.description);
    }

    conn.execute(schemas::META_DB_SCHEMA, [])?;
    conn.execute(schemas::WORDS_DB_SCHEMA, [])?;
    conn.execute(schemas::WORDS_DB_INDEX_REVIEW_ORDER, [])?;
    write_version(conn, version)?;

    Ok(SchemaReport {
        from_version,
        to_version: version,
        applied,
    })
}

/// Version tag stored in `meta`, or `None` when the table or row is absent.
pub fn stored_version(conn: &Connection) -> Result<Option<u32>, error::VaultError> {
    if !table_exists(conn, "meta")? {
        return Ok(None);
    }
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    match raw {
        None => Ok(None),
        Some(v) => v.trim().parse::<u32>().map(Some).map_err(|_| {
            error::VaultError::ValidationError(format!("unreadable schema_version '{}'", v))
        }),
    }
}

fn write_version(conn: &Connection, version: u32) -> Result<(), error::VaultError> {
    conn.execute(schemas::META_DB_SCHEMA, [])?;
    conn.execute(
        "INSERT INTO meta(key, value) VALUES('schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![version.to_string()],
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, error::VaultError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

struct LegacyRow {
    word: String,
    translation: Option<String>,
    phonetic: Option<String>,
    example: Option<String>,
    status: Option<String>,
    interval: Option<i64>,
    repetitions: Option<i64>,
    easiness_factor: Option<f64>,
}

fn migrate_legacy_words(conn: &Connection) -> Result<(), error::VaultError> {
    conn.execute("ALTER TABLE words RENAME TO words_legacy", [])?;
    conn.execute(schemas::WORDS_DB_SCHEMA, [])?;

    let rows = {
        let mut stmt = conn.prepare(
            "SELECT word, translation, phonetic, example, status, interval, repetitions, easiness_factor
             FROM words_legacy ORDER BY id",
        )?;
        let mapped = stmt.query_map([], |row| {
            Ok(LegacyRow {
                word: row.get(0)?,
                translation: row.get(1)?,
                phonetic: row.get(2)?,
                example: row.get(3)?,
                status: row.get(4)?,
                interval: row.get(5)?,
                repetitions: row.get(6)?,
                easiness_factor: row.get(7)?,
            })
        })?;
        mapped.collect::<Result<Vec<_>, _>>()?
    };

    let now = time::now_epoch_z();
    for row in &rows {
        let repetitions = row.repetitions.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        let interval = row.interval.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        let legacy_mastered = row.status.as_deref() == Some(schemas::LEGACY_MASTERED_LABEL);

        let (status, easiness_factor) = if legacy_mastered {
            (WordStatus::Mastered, sm2::MAX_EASINESS)
        } else {
            let ef = sm2::normalize_easiness(row.easiness_factor.unwrap_or(sm2::DEFAULT_EASINESS));
            (sm2::derive_status(repetitions, ef), ef)
        };

        conn.execute(
            "INSERT OR IGNORE INTO words(word, translation, phonetic, example, status, interval, repetitions, easiness_factor, created_at, updated_at)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                row.word,
                blank_to_none(&row.translation),
                blank_to_none(&row.phonetic),
                blank_to_none(&row.example),
                status.as_str(),
                interval,
                repetitions,
                easiness_factor,
                now
            ],
        )?;
    }

    conn.execute("DROP TABLE words_legacy", [])?;
    log::info!("migrated {} legacy word rows", rows.len());
    Ok(())
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
