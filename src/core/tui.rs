use colored::{ColoredString, Colorize};
use std::env;
use std::io::{self, Write};

const MIN_BOX_WIDTH: usize = 40;
const MAX_BOX_WIDTH: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoxStyle {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemStatus {
    Added,
    Bare,
    Skipped,
    Failed,
    Info,
}

impl ItemStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            ItemStatus::Added => "✨",
            ItemStatus::Bare => "📎",
            ItemStatus::Skipped => "⏭",
            ItemStatus::Failed => "💥",
            ItemStatus::Info => "💡",
        }
    }

    fn paint(&self, s: &str) -> ColoredString {
        match self {
            ItemStatus::Added => s.bright_green(),
            ItemStatus::Bare => s.bright_yellow(),
            ItemStatus::Skipped => s.bright_black(),
            ItemStatus::Failed => s.bright_red(),
            ItemStatus::Info => s.cyan(),
        }
    }
}

pub fn terminal_width() -> usize {
    env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(80)
}

fn effective_width() -> usize {
    terminal_width().clamp(MIN_BOX_WIDTH, MAX_BOX_WIDTH)
}

pub fn box_top(width: usize) -> String {
    format!("╔{}╗", "═".repeat(width.saturating_sub(2)))
}

pub fn box_bottom(width: usize) -> String {
    format!("╚{}╝", "═".repeat(width.saturating_sub(2)))
}

pub fn box_row(left: &str, content: &str, right: &str, width: usize) -> String {
    let content_len = content.chars().count();
    let padding = width.saturating_sub(2).saturating_sub(content_len);
    let left_pad = padding / 2;
    let right_pad = padding - left_pad;
    format!(
        "{}{}{}{}{}",
        left,
        " ".repeat(left_pad),
        content,
        " ".repeat(right_pad),
        right
    )
}

pub fn render_box<W: Write + ?Sized>(
    out: &mut W,
    title: &str,
    subtitle: &str,
    style: BoxStyle,
) -> io::Result<()> {
    let width = effective_width();
    let paint = |s: String, bold: bool| -> ColoredString {
        let c = match style {
            BoxStyle::Info => s.bright_cyan(),
            BoxStyle::Success => s.bright_green(),
            BoxStyle::Warning => s.bright_yellow(),
            BoxStyle::Error => s.bright_red(),
        };
        if bold { c.bold() } else { c }
    };

    writeln!(out, "{}", paint(box_top(width), false))?;
    writeln!(out, "{}", paint(box_row("║", title, "║", width), true))?;
    if !subtitle.is_empty() {
        writeln!(out, "{}", paint(box_row("║", subtitle, "║", width), false))?;
    }
    writeln!(out, "{}", paint(box_bottom(width), false))?;
    Ok(())
}

pub fn print_item(item: &str, status: ItemStatus) {
    println!("  {} {}", status.paint(status.icon()), item.bright_white());
}

pub fn print_section(title: &str) {
    println!();
    println!("{}", title.bold());
}
