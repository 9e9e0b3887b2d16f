//! Store abstraction for the word vault.
//!
//! A store is a directory holding `words.db`, its audit log and an optional
//! `config.toml`. Project stores live in a `.wordvault/` directory; the user store
//! lives under `$HOME/.wordvault/`.

use crate::core::error;
use crate::core::schemas;
use std::path::{Path, PathBuf};

pub const STORE_DIR_NAME: &str = ".wordvault";
pub const DB_ENV_VAR: &str = "WORDVAULT_DB";

/// Where a store was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// `.wordvault/` found in the working directory or one of its ancestors
    Project,
    /// `$HOME/.wordvault/`
    User,
    /// Database path given via `--db` or `WORDVAULT_DB`
    Explicit,
}

#[derive(Debug, Clone)]
pub struct Store {
    pub kind: StoreKind,
    /// Directory that holds the database, audit log and config
    pub root: PathBuf,
    /// SQLite file, `<root>/words.db` unless given explicitly
    pub db_file: PathBuf,
}

impl Store {
    pub fn new(kind: StoreKind, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            kind,
            db_file: root.join(schemas::WORDS_DB_NAME),
            root,
        }
    }

    /// Store rooted at `root` with the default database file name.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self::new(StoreKind::Explicit, root)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_file
    }

    /// Resolve the active store. First match wins: explicit db path, `WORDVAULT_DB`,
    /// nearest `.wordvault/` ancestor, then the user store.
    pub fn resolve(explicit_db: Option<&Path>, cwd: &Path) -> Result<Self, error::VaultError> {
        let from_env = std::env::var(DB_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        if let Some(db) = explicit_db.map(Path::to_path_buf).or(from_env) {
            let root = db
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf());
            return Ok(Self {
                kind: StoreKind::Explicit,
                root,
                db_file: db,
            });
        }

        if let Some(project) = find_project_store(cwd) {
            return Ok(Self::new(StoreKind::Project, project));
        }

        let home = std::env::var("HOME").map_err(|_| {
            error::VaultError::StoreUnavailable(format!(
                "no '{}' directory in {} or its parents and $HOME is not set",
                STORE_DIR_NAME,
                cwd.display()
            ))
        })?;
        Ok(Self::new(
            StoreKind::User,
            PathBuf::from(home).join(STORE_DIR_NAME),
        ))
    }
}

fn find_project_store(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        let candidate = current_dir.join(STORE_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current_dir.pop() {
            return None;
        }
    }
}
