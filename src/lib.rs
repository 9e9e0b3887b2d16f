//! Wordvault: a local-first vocabulary vault.
//!
//! Words are stored with a translation, an IPA transcription and an example sentence
//! (filled in by an OpenAI-compatible lookup service when one is configured) and are
//! reviewed on an SM-2 derived schedule until they are mastered.
//!
//! # Architecture
//!
//! ## Stores
//!
//! - **Project store** (`<dir>/.wordvault/`): found by walking up from the working directory
//! - **User store** (`~/.wordvault/`): fallback when no project store exists
//! - **Explicit database** (`--db` or `WORDVAULT_DB`): wins over both
//!
//! ## The Thin Waist
//!
//! All database access routes through `DbBroker` for:
//! - Serialization (in-process lock)
//! - Audit logging of writes (`vault.events.jsonl`)
//!
//! ## Subsystems (Plugins)
//!
//! - `words`: record storage, status overrides and counts
//! - `sm2`: the pure scheduling update
//! - `review`: the review session state machine and its `Reviewer` channel
//! - `console`: the terminal `Reviewer`
//! - `lookup`: word details from a chat-completions endpoint
//! - `import`: single words, batches and word-list files
//!
//! # Examples
//!
//! ```bash
//! wordvault init
//! wordvault add photosynthesis mitosis
//! wordvault import --dir ./lists
//! wordvault review --mode production
//! wordvault stats --format json
//! ```

pub mod core;
pub mod plugins;

mod cli;
mod subsystems;

use crate::cli::{Cli, Command, OutputFormat};
use crate::core::{
    config::VaultConfig,
    db, error, output, schemas,
    store::{STORE_DIR_NAME, Store, StoreKind},
    time, tui,
};
use crate::plugins::{
    console::ConsoleReviewer,
    import::{self, AddOutcome},
    lookup::{DisabledLookup, LlmLookup, Lookup},
    review::{ReviewSession, SessionEnd, SessionSummary},
    words::{self, EditOutcome, WordStatus},
};

use clap::Parser;
use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub fn run() -> Result<(), error::VaultError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;
    let format = cli.format;

    match &cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Schema => {
            print_json(&subsystems::schema_document())?;
            return Ok(());
        }
        Command::Init { dir } => {
            let dir = dir.clone().unwrap_or_else(|| current_dir.clone());
            return run_init(&dir, format);
        }
        _ => {}
    }

    let store = Store::resolve(cli.db.as_deref(), &current_dir)?;
    let report = db::initialize_vault(&store)?;
    if !report.applied.is_empty() {
        eprintln!(
            "{} word database upgraded v{} -> v{}",
            "▸".bright_cyan(),
            report.from_version,
            report.to_version
        );
        for step in &report.applied {
            eprintln!("    {}", step.bright_black());
        }
    }
    log::debug!("using {:?} store at {}", store.kind, store.root.display());

    let config = VaultConfig::load(&store.root)?;

    match cli.command {
        Command::Query { word } => run_query(&store, &config, &word, format),
        Command::Add { words } => run_add(&store, &config, words, format),
        Command::Import { dir, files } => {
            let dir = dir.unwrap_or_else(|| current_dir.clone());
            run_import(&store, &config, &dir, files, format)
        }
        Command::Detect { dir } => {
            let dir = dir.unwrap_or_else(|| current_dir.clone());
            run_detect(&config, &dir, format)
        }
        Command::List { status } => run_list(&store, status, format),
        Command::Review { mode, seed } => {
            let mode = mode.unwrap_or(config.review.default_mode);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            let session =
                ReviewSession::start(&store, mode, &config.review.quit_token, &mut rng)?;
            run_review(&store, session, &config.review.quit_token, format)
        }
        Command::Mark { word, status } => {
            let record = words::set_status(&store, &word, status)?;
            match format {
                OutputFormat::Json => print_json(&time::command_envelope(
                    "mark",
                    "ok",
                    serde_json::json!({ "record": record }),
                )),
                OutputFormat::Text => {
                    tui::print_item(
                        &format!("{} -> {}", record.word, output::status_label(record.status)),
                        tui::ItemStatus::Info,
                    );
                    Ok(())
                }
            }
        }
        Command::Edit {
            word,
            translation,
            example,
        } => {
            if translation.is_none() && example.is_none() {
                return Err(error::VaultError::ValidationError(
                    "nothing to edit: pass --translation and/or --example".to_string(),
                ));
            }
            let outcome =
                words::edit_details(&store, &word, translation.as_deref(), example.as_deref())?;
            match format {
                OutputFormat::Json => print_json(&time::command_envelope(
                    "edit",
                    "ok",
                    serde_json::json!({ "word": word, "outcome": outcome }),
                )),
                OutputFormat::Text => {
                    match outcome {
                        EditOutcome::Updated => {
                            tui::print_item(&format!("{} updated", word), tui::ItemStatus::Added)
                        }
                        EditOutcome::Unchanged => tui::print_item(
                            &format!("{} unchanged", word),
                            tui::ItemStatus::Skipped,
                        ),
                    }
                    Ok(())
                }
            }
        }
        Command::Stats => run_stats(&store, format),
        Command::Version | Command::Schema | Command::Init { .. } => Ok(()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), error::VaultError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| error::VaultError::ValidationError(format!("cannot encode output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn run_init(dir: &Path, format: OutputFormat) -> Result<(), error::VaultError> {
    let store = Store::new(StoreKind::Project, dir.join(STORE_DIR_NAME));
    let report = db::initialize_vault(&store)?;

    let config_path = store.root.join(schemas::CONFIG_FILE_NAME);
    let wrote_config = if config_path.exists() {
        false
    } else {
        let defaults = toml::to_string_pretty(&VaultConfig::default())
            .map_err(|e| error::VaultError::ConfigError(e.to_string()))?;
        fs::write(&config_path, defaults)?;
        true
    };

    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "init",
            "ok",
            serde_json::json!({
                "root": store.root,
                "schema": report,
                "config_written": wrote_config,
            }),
        )),
        OutputFormat::Text => {
            tui::render_box(
                &mut io::stdout(),
                "Word vault ready",
                &output::compact_line(&store.root.display().to_string(), 46),
                tui::BoxStyle::Success,
            )?;
            if wrote_config {
                tui::print_item(
                    &format!("wrote default {}", config_path.display()),
                    tui::ItemStatus::Added,
                );
            }
            Ok(())
        }
    }
}

/// LLM lookup when an API key is configured, otherwise a lookup that always fails.
fn build_lookup(config: &VaultConfig) -> Result<Box<dyn Lookup>, error::VaultError> {
    match config.lookup.api_key() {
        Some(key) => Ok(Box::new(LlmLookup::new(&config.lookup, key)?)),
        None => {
            log::warn!("no API key configured; new words are stored without details");
            Ok(Box::new(DisabledLookup))
        }
    }
}

fn outcome_item(word: &str, outcome: &AddOutcome) -> (String, tui::ItemStatus) {
    match outcome {
        AddOutcome::Added => (format!("{} added", word), tui::ItemStatus::Added),
        AddOutcome::AddedBare(failure) => (
            format!("{} added without details ({})", word, failure),
            tui::ItemStatus::Bare,
        ),
        AddOutcome::Skipped => (format!("{} already stored", word), tui::ItemStatus::Skipped),
    }
}

fn outcome_label(outcome: &AddOutcome) -> &'static str {
    match outcome {
        AddOutcome::Added => "added",
        AddOutcome::AddedBare(_) => "added_bare",
        AddOutcome::Skipped => "skipped",
    }
}

fn run_query(
    store: &Store,
    config: &VaultConfig,
    word: &str,
    format: OutputFormat,
) -> Result<(), error::VaultError> {
    let word = word.trim();
    let outcome = match words::find_word(store, word)? {
        Some(_) => None,
        None => {
            let lookup = build_lookup(config)?;
            Some(import::add_word(store, lookup.as_ref(), word)?)
        }
    };
    let record = words::get_word(store, word)?;

    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "query",
            "ok",
            serde_json::json!({
                "added": outcome.as_ref().map(outcome_label),
                "record": record,
            }),
        )),
        OutputFormat::Text => {
            if let Some(outcome) = &outcome {
                let (message, status) = outcome_item(word, outcome);
                tui::print_item(&message, status);
                println!();
            }
            println!("{}", output::word_card(&record));
            Ok(())
        }
    }
}

/// Words typed on stdin, one per line, until a blank line or end of input.
fn read_words_from_stdin(format: OutputFormat) -> Result<Vec<String>, error::VaultError> {
    if format == OutputFormat::Text {
        eprintln!(
            "{}",
            "Enter words, one per line. A blank line finishes.".bright_black()
        );
    }
    let mut collected = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let word = line.trim();
        if word.is_empty() {
            break;
        }
        collected.push(word.to_string());
    }
    Ok(collected)
}

fn run_add(
    store: &Store,
    config: &VaultConfig,
    candidates: Vec<String>,
    format: OutputFormat,
) -> Result<(), error::VaultError> {
    let candidates = if candidates.is_empty() {
        read_words_from_stdin(format)?
    } else {
        candidates
    };
    let lookup = build_lookup(config)?;

    let mut results = Vec::new();
    let report = import::import_words(store, lookup.as_ref(), &candidates, |word, outcome| {
        match format {
            OutputFormat::Text => {
                let (message, status) = outcome_item(word, outcome);
                tui::print_item(&message, status);
            }
            OutputFormat::Json => results.push(serde_json::json!({
                "word": word,
                "outcome": outcome_label(outcome),
            })),
        }
    })?;

    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "add",
            "ok",
            serde_json::json!({ "report": report, "words": results }),
        )),
        OutputFormat::Text => {
            println!(
                "\n{} added, {} without details, {} already stored",
                report.added, report.bare, report.skipped
            );
            Ok(())
        }
    }
}

fn run_import(
    store: &Store,
    config: &VaultConfig,
    dir: &Path,
    files: Vec<PathBuf>,
    format: OutputFormat,
) -> Result<(), error::VaultError> {
    let files = if files.is_empty() {
        import::discover_word_files(dir, &config.import)?
    } else {
        files
    };
    if files.is_empty() {
        log::info!("no word lists found in {}", dir.display());
    }
    let lookup = build_lookup(config)?;

    if format == OutputFormat::Text {
        tui::print_section(&format!("Importing {} file(s)", files.len()));
    }
    let report = import::import_files(store, lookup.as_ref(), &files, |word, outcome| {
        if format == OutputFormat::Text {
            let (message, status) = outcome_item(word, outcome);
            tui::print_item(&message, status);
        }
    })?;

    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "import",
            if report.failed_files.is_empty() { "ok" } else { "partial" },
            serde_json::json!({ "files": files, "report": report }),
        )),
        OutputFormat::Text => {
            for failure in &report.failed_files {
                tui::print_item(
                    &format!("{}: {}", failure.path.display(), failure.error),
                    tui::ItemStatus::Failed,
                );
            }
            println!(
                "\n{} read, {} added, {} without details, {} already stored, {} blank",
                report.read, report.added, report.bare, report.skipped, report.blank
            );
            Ok(())
        }
    }
}

fn run_detect(config: &VaultConfig, dir: &Path, format: OutputFormat) -> Result<(), error::VaultError> {
    let found = import::detect_word_files(dir, &config.import)?;
    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "detect",
            "ok",
            serde_json::json!({ "dir": dir, "files": found }),
        )),
        OutputFormat::Text => {
            if found.is_empty() {
                tui::print_item(
                    &format!(
                        "no *.{} files with '{}' in the name under {}",
                        config.import.extension,
                        config.import.name_filter,
                        dir.display()
                    ),
                    tui::ItemStatus::Info,
                );
            }
            for summary in &found {
                match (&summary.words, &summary.error) {
                    (Some(n), _) => tui::print_item(
                        &format!("{} ({} words)", summary.path.display(), n),
                        tui::ItemStatus::Info,
                    ),
                    (None, Some(e)) => tui::print_item(
                        &format!("{}: {}", summary.path.display(), e),
                        tui::ItemStatus::Failed,
                    ),
                    (None, None) => {}
                }
            }
            Ok(())
        }
    }
}

fn run_list(
    store: &Store,
    status: Option<WordStatus>,
    format: OutputFormat,
) -> Result<(), error::VaultError> {
    let records = words::list_words(store, status)?;
    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "list",
            "ok",
            serde_json::json!({ "count": records.len(), "words": records }),
        )),
        OutputFormat::Text => {
            if records.is_empty() {
                println!("{}", "No words stored.".bright_black());
                return Ok(());
            }
            let width = tui::terminal_width().saturating_sub(38).max(20);
            for record in &records {
                println!("{}", output::word_row(record, width));
            }
            Ok(())
        }
    }
}

fn run_review(
    store: &Store,
    session: ReviewSession,
    quit_token: &str,
    format: OutputFormat,
) -> Result<(), error::VaultError> {
    let stdin = io::stdin();
    let summary = match format {
        OutputFormat::Text => {
            let mut reviewer = ConsoleReviewer::new(stdin.lock(), io::stdout(), quit_token);
            session.run(store, &mut reviewer)?
        }
        // Prompts go to stderr so stdout carries only the envelope.
        OutputFormat::Json => {
            let mut reviewer = ConsoleReviewer::new(stdin.lock(), io::stderr(), quit_token);
            session.run(store, &mut reviewer)?
        }
    };

    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "review",
            "ok",
            serde_json::json!({ "summary": summary }),
        )),
        OutputFormat::Text => {
            print_review_summary(&summary)?;
            Ok(())
        }
    }
}

fn print_review_summary(summary: &SessionSummary) -> io::Result<()> {
    if matches!(summary.end, SessionEnd::AllMastered | SessionEnd::NothingDue) {
        return Ok(());
    }
    let mut out = io::stdout();
    writeln!(
        out,
        "{} of {} presented: {} passed, {} failed",
        summary.presented,
        summary.total,
        summary.succeeded.to_string().bright_green(),
        summary.failed.to_string().bright_red()
    )
}

fn run_stats(store: &Store, format: OutputFormat) -> Result<(), error::VaultError> {
    let counts = words::status_counts(store)?;
    match format {
        OutputFormat::Json => print_json(&time::command_envelope(
            "stats",
            "ok",
            serde_json::json!({ "total": counts.total(), "counts": counts }),
        )),
        OutputFormat::Text => {
            tui::print_section(&format!("{} word(s)", counts.total()));
            for status in WordStatus::ALL {
                let n = match status {
                    WordStatus::Unlearned => counts.unlearned,
                    WordStatus::Learning => counts.learning,
                    WordStatus::Consolidating => counts.consolidating,
                    WordStatus::Mastered => counts.mastered,
                };
                println!("  {} {}", output::status_column(status, 14), n);
            }
            Ok(())
        }
    }
}
