use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Word store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Lookup error: {0}")]
    LookupError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
