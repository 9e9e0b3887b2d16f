//! CLI struct definitions for the wordvault command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use crate::plugins::review::ReviewMode;
use crate::plugins::words::WordStatus;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "wordvault",
    version = env!("CARGO_PKG_VERSION"),
    about = "Store vocabulary with translations, phonetics and examples, and review it on a spaced-repetition schedule."
)]
pub(crate) struct Cli {
    /// Word database to use (overrides WORDVAULT_DB and `.wordvault/` discovery).
    #[clap(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Output format: 'text' or 'json'.
    #[clap(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create a project store (`.wordvault/`) in a directory
    Init {
        /// Directory to initialize (defaults to current working directory).
        #[clap(short, long)]
        dir: Option<PathBuf>,
    },
    /// Show a word, looking it up and storing it first if it is new
    Query {
        #[clap(value_name = "WORD")]
        word: String,
    },
    /// Add words; reads one word per line from stdin (blank line ends) when none are given
    Add {
        #[clap(value_name = "WORD")]
        words: Vec<String>,
    },
    /// Import word-list files (by default every matching file in --dir)
    Import {
        /// Directory to scan for word lists.
        #[clap(long)]
        dir: Option<PathBuf>,
        /// Explicit files to import instead of scanning.
        #[clap(value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// List word-list files that `import` would pick up
    Detect {
        /// Directory to scan (defaults to current working directory).
        #[clap(long)]
        dir: Option<PathBuf>,
    },
    /// List stored words
    List {
        /// Only show words with this status.
        #[clap(long, value_enum)]
        status: Option<WordStatus>,
    },
    /// Review every word that is not mastered yet
    Review {
        /// Presentation mode (defaults to review.default_mode from config).
        #[clap(long, value_enum)]
        mode: Option<ReviewMode>,
        /// Seed for the presentation shuffle, for reproducible sessions.
        #[clap(long)]
        seed: Option<u64>,
    },
    /// Force a word's status (mastered also sets easiness to 2.8)
    Mark {
        #[clap(value_name = "WORD")]
        word: String,
        #[clap(value_enum, value_name = "STATUS")]
        status: WordStatus,
    },
    /// Change a word's translation and/or example sentence
    Edit {
        #[clap(value_name = "WORD")]
        word: String,
        #[clap(long)]
        translation: Option<String>,
        #[clap(long)]
        example: Option<String>,
    },
    /// Word counts per status
    Stats,
    /// Print the command/storage schema as JSON
    Schema,
    /// Print version
    Version,
}
