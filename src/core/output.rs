//! Compact output rendering helpers for CLI surfaces.

use crate::plugins::words::{WordRecord, WordStatus};
use colored::{ColoredString, Colorize};

const PLACEHOLDER: &str = "(none)";

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

pub fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn status_label(status: WordStatus) -> ColoredString {
    paint_status(status, status.as_str())
}

/// Status label left-aligned to `width` columns. Padding goes inside the colour codes,
/// which `{:<N}` on a `ColoredString` would count as width.
pub fn status_column(status: WordStatus, width: usize) -> ColoredString {
    paint_status(status, &format!("{:<width$}", status.as_str()))
}

fn paint_status(status: WordStatus, text: &str) -> ColoredString {
    match status {
        WordStatus::Unlearned => text.bright_red(),
        WordStatus::Learning => text.yellow(),
        WordStatus::Consolidating => text.bright_cyan(),
        WordStatus::Mastered => text.bright_green(),
    }
}

/// One line per word for `list`.
pub fn word_row(record: &WordRecord, max_chars: usize) -> String {
    format!(
        "{:<20} {} {}",
        record.word,
        status_column(record.status, 14),
        compact_line(&or_placeholder(record.translation.as_deref()), max_chars)
    )
}

/// Multi-line block for `query`.
pub fn word_card(record: &WordRecord) -> String {
    let mut lines = vec![format!("{} {}", "Word:".cyan(), record.word.bold())];
    for (label, value) in [
        ("Translation:", &record.translation),
        ("Phonetic:", &record.phonetic),
        ("Example:", &record.example),
    ] {
        lines.push(format!("{} {}", label.cyan(), or_placeholder(value.as_deref())));
    }
    lines.push(format!(
        "{} {} (interval {}d, repetitions {}, easiness {:.2})",
        "Status:".cyan(),
        status_label(record.status),
        record.interval,
        record.repetitions,
        record.easiness_factor
    ));
    lines.join("\n")
}
