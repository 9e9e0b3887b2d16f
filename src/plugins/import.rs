//! Adding words: single queries, batches, and word-list files.
//!
//! Every path funnels through [`add_word`]: existing words are skipped untouched, new
//! words are looked up, and a lookup failure still stores a bare record.

use crate::core::config::ImportConfig;
use crate::core::error::VaultError;
use crate::core::store::Store;
use crate::plugins::lookup::{Lookup, LookupFailure};
use crate::plugins::words::{self, InsertOutcome, WordDetails};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Stored with translation, phonetic and example
    Added,
    /// Stored without details because the lookup failed
    AddedBare(LookupFailure),
    /// Already present; nothing changed
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub read: usize,
    pub added: usize,
    pub bare: usize,
    pub skipped: usize,
    pub blank: usize,
    pub failed_files: Vec<FileFailure>,
}

impl ImportReport {
    fn record(&mut self, outcome: &AddOutcome) {
        match outcome {
            AddOutcome::Added => self.added += 1,
            AddOutcome::AddedBare(_) => {
                self.added += 1;
                self.bare += 1;
            }
            AddOutcome::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFileSummary {
    pub path: PathBuf,
    pub words: Option<usize>,
    pub error: Option<String>,
}

/// Store `word` unless it already exists, filling details from `lookup` when possible.
pub fn add_word<L>(store: &Store, lookup: &L, word: &str) -> Result<AddOutcome, VaultError>
where
    L: Lookup + ?Sized,
{
    let word = word.trim();
    if word.is_empty() {
        return Err(VaultError::ValidationError(
            "word must not be empty".to_string(),
        ));
    }

    if words::find_word(store, word)?.is_some() {
        log::info!("'{}' already exists, skipped", word);
        return Ok(AddOutcome::Skipped);
    }

    let (details, outcome) = match lookup.lookup(word) {
        Ok(details) => (details, AddOutcome::Added),
        Err(failure) => {
            log::warn!("lookup for '{}' failed: {}; storing bare word", word, failure);
            (WordDetails::default(), AddOutcome::AddedBare(failure))
        }
    };

    match words::insert_word(store, word, &details)? {
        InsertOutcome::Inserted => Ok(outcome),
        InsertOutcome::AlreadyExists => Ok(AddOutcome::Skipped),
    }
}

/// Add a batch of candidate words, calling `on_word` after each one.
pub fn import_words<L, I, F>(
    store: &Store,
    lookup: &L,
    candidates: I,
    mut on_word: F,
) -> Result<ImportReport, VaultError>
where
    L: Lookup + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
    F: FnMut(&str, &AddOutcome),
{
    let mut report = ImportReport::default();
    for candidate in candidates {
        let word = candidate.as_ref().trim();
        report.read += 1;
        if word.is_empty() {
            report.blank += 1;
            continue;
        }
        let outcome = add_word(store, lookup, word)?;
        on_word(word, &outcome);
        report.record(&outcome);
    }
    Ok(report)
}

/// Word lists in `dir`: files with the configured extension whose lower-cased name
/// contains the name filter, sorted by name.
pub fn discover_word_files(dir: &Path, config: &ImportConfig) -> Result<Vec<PathBuf>, VaultError> {
    let filter = config.name_filter.to_lowercase();
    let extension = config.extension.trim_start_matches('.').to_lowercase();

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let ext_ok = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase() == extension)
            .unwrap_or(false);
        let name_ok = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase().contains(&filter))
            .unwrap_or(false);
        if ext_ok && name_ok {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Trimmed, non-empty lines of a word list.
pub fn read_word_file(path: &Path) -> Result<Vec<String>, VaultError> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Import every file in order. Unreadable files are recorded and skipped.
pub fn import_files<L, F>(
    store: &Store,
    lookup: &L,
    files: &[PathBuf],
    mut on_word: F,
) -> Result<ImportReport, VaultError>
where
    L: Lookup + ?Sized,
    F: FnMut(&str, &AddOutcome),
{
    let mut report = ImportReport::default();
    for path in files {
        let candidates = match read_word_file(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                report.failed_files.push(FileFailure {
                    path: path.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        log::info!("importing {} word(s) from {}", candidates.len(), path.display());
        let part = import_words(store, lookup, &candidates, &mut on_word)?;
        report.read += part.read;
        report.added += part.added;
        report.bare += part.bare;
        report.skipped += part.skipped;
        report.blank += part.blank;
    }
    Ok(report)
}

/// Candidate word lists with their word counts, without touching the store.
pub fn detect_word_files(dir: &Path, config: &ImportConfig) -> Result<Vec<WordFileSummary>, VaultError> {
    Ok(discover_word_files(dir, config)?
        .into_iter()
        .map(|path| match read_word_file(&path) {
            Ok(words) => WordFileSummary {
                path,
                words: Some(words.len()),
                error: None,
            },
            Err(e) => WordFileSummary {
                path,
                words: None,
                error: Some(e.to_string()),
            },
        })
        .collect())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "import",
        "version": "0.2.0",
        "description": "Add words by hand or from word-list files, looking up details",
        "commands": [
            { "name": "add", "parameters": ["words"] },
            { "name": "import", "parameters": ["dir", "files"] },
            { "name": "detect", "parameters": ["dir"] }
        ],
        "storage": ["words.db"]
    })
}
