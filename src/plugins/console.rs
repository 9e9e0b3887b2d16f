//! Terminal reviewer: renders prompts with `colored` and reads answers line by line.
//!
//! Generic over its streams so sessions can be scripted from memory in tests.
//! End of input is treated as the reviewer quitting.

use crate::core::error::VaultError;
use crate::core::output;
use crate::core::tui;
use crate::plugins::review::{
    Judgment, Notice, Pending, Progress, ReviewMode, Reviewer, SessionEnd, Verdict,
};
use crate::plugins::sm2;
use crate::plugins::words::WordRecord;
use colored::Colorize;
use std::io::{BufRead, Write};

pub struct ConsoleReviewer<R, W> {
    input: R,
    output: W,
    quit_token: String,
}

impl<R: BufRead, W: Write> ConsoleReviewer<R, W> {
    pub fn new(input: R, output: W, quit_token: &str) -> Self {
        Self {
            input,
            output,
            quit_token: quit_token.trim().to_string(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Prompt and read one line; `None` on end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, VaultError> {
        write!(self.output, "{} ", prompt.bright_white().bold())?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask a yes/no question until the answer parses. `None` means quit.
    fn ask_yes_no(&mut self, prompt: &str) -> Result<Option<bool>, VaultError> {
        let prompt = format!("{} [y/n, {} to quit]:", prompt, self.quit_token);
        loop {
            let Some(answer) = self.ask(&prompt)? else {
                return Ok(None);
            };
            let answer = answer.trim().to_lowercase();
            if answer == self.quit_token.to_lowercase() {
                return Ok(None);
            }
            match answer.as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => writeln!(self.output, "  {}", "Please answer y or n.".yellow())?,
            }
        }
    }

    fn write_details(&mut self, record: &WordRecord) -> Result<(), VaultError> {
        writeln!(self.output, "  {} {}", "Word:".cyan(), record.word.bold())?;
        for (label, value) in [
            ("Translation:", &record.translation),
            ("Phonetic:", &record.phonetic),
            ("Example:", &record.example),
        ] {
            writeln!(
                self.output,
                "  {} {}",
                label.cyan(),
                output::or_placeholder(value.as_deref())
            )?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Reviewer for ConsoleReviewer<R, W> {
    fn present(
        &mut self,
        mode: ReviewMode,
        record: &WordRecord,
        progress: Progress,
    ) -> Result<(), VaultError> {
        let counter = format!("[{}/{}]", progress.position, progress.total);
        writeln!(self.output)?;
        match mode {
            ReviewMode::Recognition => writeln!(
                self.output,
                "{} {} {}",
                counter.bright_black(),
                "Word:".cyan(),
                record.word.bright_white().bold()
            )?,
            ReviewMode::Production => writeln!(
                self.output,
                "{} {} {}",
                counter.bright_black(),
                "Translation:".cyan(),
                output::or_placeholder(record.translation.as_deref()).bright_white().bold()
            )?,
        }
        Ok(())
    }

    fn reveal(&mut self, record: &WordRecord, verdict: &Verdict) -> Result<(), VaultError> {
        match verdict {
            Verdict::Recognized | Verdict::NotRecognized => {}
            Verdict::Correct => writeln!(self.output, "  {}", "Correct!".bright_green().bold())?,
            Verdict::Incorrect { answer } => writeln!(
                self.output,
                "  {} you typed '{}', the answer is '{}'",
                "Wrong.".bright_red().bold(),
                answer,
                record.word.bold()
            )?,
        }
        self.write_details(record)
    }

    fn notify(&mut self, notice: &Notice<'_>) -> Result<(), VaultError> {
        match notice {
            Notice::Started { mode, total } => {
                let title = format!("{} word(s) to review", total);
                let subtitle = match mode {
                    ReviewMode::Recognition => "recognition: do you know the word?",
                    ReviewMode::Production => "production: type the word",
                };
                tui::render_box(&mut self.output, &title, subtitle, tui::BoxStyle::Info)?;
            }
            Notice::EmptyAnswer => writeln!(
                self.output,
                "  {}",
                format!("Type the word, or '{}' to quit.", self.quit_token).yellow()
            )?,
            Notice::Scored(outcome) => {
                let after = &outcome.after;
                writeln!(
                    self.output,
                    "  {} interval={} ({}) repetitions={} easiness={:.2} status={}",
                    "▸".bright_cyan(),
                    after.interval,
                    sm2::format_interval(after.interval),
                    after.repetitions,
                    after.easiness_factor,
                    output::status_label(after.status)
                )?;
            }
            Notice::Ended(end) => {
                let (title, style) = match end {
                    SessionEnd::Exhausted => ("Session complete", tui::BoxStyle::Success),
                    SessionEnd::Aborted => ("Session stopped", tui::BoxStyle::Warning),
                    SessionEnd::AllMastered => ("Every word is mastered", tui::BoxStyle::Success),
                    SessionEnd::NothingDue => ("Nothing to review", tui::BoxStyle::Info),
                };
                writeln!(self.output)?;
                tui::render_box(&mut self.output, title, "", style)?;
            }
        }
        Ok(())
    }

    fn judge(&mut self, pending: Pending, _record: &WordRecord) -> Result<Judgment, VaultError> {
        let judgment = match pending {
            Pending::Recognition => match self.ask_yes_no("Do you recognize it?")? {
                Some(known) => Judgment::Recognized(known),
                None => Judgment::Abort,
            },
            Pending::RecallCheck => match self.ask_yes_no("Did you recall it correctly?")? {
                Some(correct) => Judgment::RecallCorrect(correct),
                None => Judgment::Abort,
            },
            Pending::TypedAnswer => {
                let prompt = format!("Type the word ({} to quit):", self.quit_token);
                match self.ask(&prompt)? {
                    Some(typed) => Judgment::Typed(typed),
                    None => Judgment::Abort,
                }
            }
        };
        Ok(judgment)
    }
}
