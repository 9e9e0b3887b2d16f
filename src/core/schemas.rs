//! Centralized database schema definitions for the word vault.
//!
//! The vault keeps a single SQLite database (`words.db`) with two tables:
//! 1. meta: key/value pairs, including the explicit `schema_version` tag.
//! 2. words: one row per vocabulary term with its scheduling state.

pub const WORDS_DB_NAME: &str = "words.db";
pub const EVENTS_LOG_NAME: &str = "vault.events.jsonl";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Version written to `meta.schema_version` for freshly created databases.
pub const SCHEMA_VERSION: u32 = 2;

/// Implicit version of databases created before the `meta` table existed.
pub const LEGACY_SCHEMA_VERSION: u32 = 1;

pub const META_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
";

pub const WORDS_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS words (
        word TEXT PRIMARY KEY,
        translation TEXT,
        phonetic TEXT,
        example TEXT,
        status TEXT NOT NULL DEFAULT 'unlearned',
        interval INTEGER NOT NULL DEFAULT 0,
        repetitions INTEGER NOT NULL DEFAULT 0,
        easiness_factor REAL NOT NULL DEFAULT 2.5,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
";

pub const WORDS_DB_INDEX_REVIEW_ORDER: &str =
    "CREATE INDEX IF NOT EXISTS idx_words_review_order ON words(easiness_factor, repetitions)";

/// Layout written by the first releases: surrogate integer key and free-text status labels.
/// Kept for tests and for the 1 -> 2 migration.
pub const LEGACY_WORDS_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT UNIQUE NOT NULL,
        translation TEXT,
        phonetic TEXT,
        example TEXT,
        status TEXT DEFAULT '需复习',
        interval INTEGER DEFAULT 0,
        repetitions INTEGER DEFAULT 0,
        easiness_factor REAL DEFAULT 2.5
    )
";

/// Status label the legacy layout used for mastered words.
pub const LEGACY_MASTERED_LABEL: &str = "已掌握";
