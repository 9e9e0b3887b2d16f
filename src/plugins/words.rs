//! Word record store.
//!
//! One row per vocabulary term, keyed by the word itself (case-sensitive). Scheduling
//! columns are only written through [`update_schedule`] (the review path) and
//! [`set_status`] (manual override).

use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::sm2::{self, Schedule};
use clap::ValueEnum;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SELECT_COLUMNS: &str = "word, translation, phonetic, example, status, interval, repetitions, easiness_factor, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Unlearned,
    Learning,
    Consolidating,
    Mastered,
}

impl WordStatus {
    pub const ALL: [WordStatus; 4] = [
        WordStatus::Unlearned,
        WordStatus::Learning,
        WordStatus::Consolidating,
        WordStatus::Mastered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WordStatus::Unlearned => "unlearned",
            WordStatus::Learning => "learning",
            WordStatus::Consolidating => "consolidating",
            WordStatus::Mastered => "mastered",
        }
    }
}

impl fmt::Display for WordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordStatus {
    type Err = error::VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unlearned" => Ok(WordStatus::Unlearned),
            "learning" => Ok(WordStatus::Learning),
            "consolidating" => Ok(WordStatus::Consolidating),
            "mastered" => Ok(WordStatus::Mastered),
            other => Err(error::VaultError::ValidationError(format!(
                "unknown word status '{}'",
                other
            ))),
        }
    }
}

/// Descriptive fields filled in by the lookup service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDetails {
    pub translation: Option<String>,
    pub phonetic: Option<String>,
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub translation: Option<String>,
    pub phonetic: Option<String>,
    pub example: Option<String>,
    pub status: WordStatus,
    pub interval: u32,
    pub repetitions: u32,
    pub easiness_factor: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl WordRecord {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            status: self.status,
            interval: self.interval,
            repetitions: self.repetitions,
            easiness_factor: self.easiness_factor,
        }
    }

    pub fn has_details(&self) -> bool {
        self.translation.is_some() || self.phonetic.is_some() || self.example.is_some()
    }

    /// Case-insensitive comparison used for typed recall answers.
    pub fn matches_answer(&self, answer: &str) -> bool {
        self.word.trim().to_lowercase() == answer.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub unlearned: usize,
    pub learning: usize,
    pub consolidating: usize,
    pub mastered: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.unlearned + self.learning + self.consolidating + self.mastered
    }

    fn bump(&mut self, status: WordStatus, n: usize) {
        match status {
            WordStatus::Unlearned => self.unlearned += n,
            WordStatus::Learning => self.learning += n,
            WordStatus::Consolidating => self.consolidating += n,
            WordStatus::Mastered => self.mastered += n,
        }
    }
}

/// Default review eligibility: everything that is not mastered yet.
pub fn not_mastered(record: &WordRecord) -> bool {
    record.status != WordStatus::Mastered
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<WordRecord> {
    let status: String = row.get(4)?;
    let status = status.parse::<WordStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(WordRecord {
        word: row.get(0)?,
        translation: row.get(1)?,
        phonetic: row.get(2)?,
        example: row.get(3)?,
        status,
        interval: row.get(5)?,
        repetitions: row.get(6)?,
        easiness_factor: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn query_one(conn: &Connection, word: &str) -> Result<Option<WordRecord>, error::VaultError> {
    let sql = format!("SELECT {} FROM words WHERE word = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&sql, params![word], read_record).optional()?)
}

fn with_words<F, R>(store: &Store, op: &str, f: F) -> Result<R, error::VaultError>
where
    F: FnOnce(&Connection) -> Result<R, error::VaultError>,
{
    let broker = DbBroker::new(&store.root);
    broker.with_conn(store.db_path(), "wordvault", op, f)
}

fn read_words<F, R>(store: &Store, f: F) -> Result<R, error::VaultError>
where
    F: FnOnce(&Connection) -> Result<R, error::VaultError>,
{
    DbBroker::new(&store.root).with_read_conn(store.db_path(), f)
}

pub fn find_word(store: &Store, word: &str) -> Result<Option<WordRecord>, error::VaultError> {
    read_words(store, |conn| query_one(conn, word))
}

pub fn get_word(store: &Store, word: &str) -> Result<WordRecord, error::VaultError> {
    find_word(store, word)?.ok_or_else(|| error::VaultError::NotFound(format!("word '{}'", word)))
}

/// Insert a fresh record with the default schedule. Existing words are left untouched.
pub fn insert_word(
    store: &Store,
    word: &str,
    details: &WordDetails,
) -> Result<InsertOutcome, error::VaultError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(error::VaultError::ValidationError(
            "word must not be empty".to_string(),
        ));
    }
    let schedule = Schedule::default();
    let now = time::now_epoch_z();

    with_words(store, "words.insert", |conn| {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO words(word, translation, phonetic, example, status, interval, repetitions, easiness_factor, created_at, updated_at)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                word,
                clean(details.translation.as_deref()),
                clean(details.phonetic.as_deref()),
                clean(details.example.as_deref()),
                schedule.status.as_str(),
                schedule.interval,
                schedule.repetitions,
                schedule.easiness_factor,
                now
            ],
        )?;
        if inserted == 0 {
            log::debug!("'{}' already stored, insert skipped", word);
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    })
}

/// Records matching `predicate`, weakest first: ascending by `(easiness_factor, repetitions)`.
pub fn eligible_for_review<P>(store: &Store, predicate: P) -> Result<Vec<WordRecord>, error::VaultError>
where
    P: Fn(&WordRecord) -> bool,
{
    let all = read_words(store, |conn| {
        let sql = format!(
            "SELECT {} FROM words ORDER BY easiness_factor ASC, repetitions ASC, word ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], read_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })?;
    Ok(all.into_iter().filter(|r| predicate(r)).collect())
}

/// Overwrite the scheduling columns of an existing word.
///
/// The stored status is derived from the normalised easiness and repetitions;
/// `schedule.status` is ignored.
pub fn update_schedule(
    store: &Store,
    word: &str,
    schedule: &Schedule,
) -> Result<(), error::VaultError> {
    let now = time::now_epoch_z();
    let easiness = sm2::normalize_easiness(schedule.easiness_factor);
    let status = sm2::derive_status(schedule.repetitions, easiness);
    let changed = with_words(store, "words.update", |conn| {
        Ok(conn.execute(
            "UPDATE words SET status = ?1, interval = ?2, repetitions = ?3, easiness_factor = ?4, updated_at = ?5
             WHERE word = ?6",
            params![
                status.as_str(),
                schedule.interval,
                schedule.repetitions,
                easiness,
                now,
                word
            ],
        )?)
    })?;
    if changed == 0 {
        return Err(error::VaultError::NotFound(format!("word '{}'", word)));
    }
    Ok(())
}

/// Manual status override. Forcing `Mastered` also pins easiness to the ceiling;
/// any other status leaves easiness and repetitions as they are.
pub fn set_status(
    store: &Store,
    word: &str,
    status: WordStatus,
) -> Result<WordRecord, error::VaultError> {
    let now = time::now_epoch_z();
    with_words(store, "words.set_status", |conn| {
        let changed = if status == WordStatus::Mastered {
            conn.execute(
                "UPDATE words SET status = ?1, easiness_factor = ?2, updated_at = ?3 WHERE word = ?4",
                params![status.as_str(), sm2::MAX_EASINESS, now, word],
            )?
        } else {
            conn.execute(
                "UPDATE words SET status = ?1, updated_at = ?2 WHERE word = ?3",
                params![status.as_str(), now, word],
            )?
        };
        if changed == 0 {
            return Err(error::VaultError::NotFound(format!("word '{}'", word)));
        }
        query_one(conn, word)?
            .ok_or_else(|| error::VaultError::NotFound(format!("word '{}'", word)))
    })
}

/// Replace translation and/or example. Blank or identical values count as no change.
pub fn edit_details(
    store: &Store,
    word: &str,
    translation: Option<&str>,
    example: Option<&str>,
) -> Result<EditOutcome, error::VaultError> {
    let now = time::now_epoch_z();
    with_words(store, "words.edit", |conn| {
        let current = query_one(conn, word)?
            .ok_or_else(|| error::VaultError::NotFound(format!("word '{}'", word)))?;

        let translation = clean(translation).or(current.translation.clone());
        let example = clean(example).or(current.example.clone());
        if translation == current.translation && example == current.example {
            return Ok(EditOutcome::Unchanged);
        }

        conn.execute(
            "UPDATE words SET translation = ?1, example = ?2, updated_at = ?3 WHERE word = ?4",
            params![translation, example, now, word],
        )?;
        Ok(EditOutcome::Updated)
    })
}

/// All words, alphabetically, optionally restricted to one status.
pub fn list_words(
    store: &Store,
    status: Option<WordStatus>,
) -> Result<Vec<WordRecord>, error::VaultError> {
    read_words(store, |conn| {
        let records = match status {
            Some(s) => {
                let sql = format!(
                    "SELECT {} FROM words WHERE status = ?1 ORDER BY word COLLATE NOCASE",
                    SELECT_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![s.as_str()], read_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM words ORDER BY word COLLATE NOCASE",
                    SELECT_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], read_record)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(records)
    })
}

pub fn status_counts(store: &Store) -> Result<StatusCounts, error::VaultError> {
    read_words(store, |conn| {
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM words GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut counts = StatusCounts::default();
        for row in rows {
            let (status, n) = row?;
            counts.bump(status.parse::<WordStatus>()?, n.max(0) as usize);
        }
        Ok(counts)
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "words",
        "version": "0.2.0",
        "description": "Vocabulary records and their review schedule",
        "commands": [
            { "name": "query", "parameters": ["word"] },
            { "name": "list", "parameters": ["status"] },
            { "name": "mark", "parameters": ["word", "status"] },
            { "name": "edit", "parameters": ["word", "translation", "example"] },
            { "name": "stats", "parameters": [] }
        ],
        "storage": ["words.db"]
    })
}
