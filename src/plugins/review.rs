//! Review sessions.
//!
//! A session walks the eligible pool once, as an explicit state machine:
//!
//! ```text
//! Presenting -> AwaitingJudgment -> Scoring -> Presenting | Done
//! ```
//!
//! The session only waits on the reviewer in `AwaitingJudgment`. Every scored item is
//! written back before the next one is presented, so aborting keeps earlier progress
//! and discards only the item on screen.

use crate::core::error::VaultError;
use crate::core::store::Store;
use crate::plugins::sm2::{self, Quality, Schedule};
use crate::plugins::words::{self, WordRecord};
use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    /// Show the word; the reviewer says whether they know it
    Recognition,
    /// Show the translation; the reviewer types the word
    Production,
}

/// Which answer the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pending {
    /// Recognition mode: "do you know this word?"
    Recognition,
    /// Recognition mode, after a yes: "was your recall actually right?"
    RecallCheck,
    /// Production mode: the typed word
    TypedAnswer,
}

/// Reviewer response to a pending question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgment {
    Recognized(bool),
    RecallCorrect(bool),
    Typed(String),
    Abort,
}

/// What is revealed alongside the full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Recognized,
    NotRecognized,
    Correct,
    Incorrect { answer: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// Every item in the pool was visited once
    Exhausted,
    /// The reviewer quit; the item on screen was not scored
    Aborted,
    /// Nothing eligible and every stored word is mastered
    AllMastered,
    /// Nothing eligible (including an empty store)
    NothingDue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Presenting,
    AwaitingJudgment(Pending),
    Scoring(Quality),
    Done(SessionEnd),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 1-based position of the item in the session
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub word: String,
    pub quality: Quality,
    pub before: Schedule,
    pub after: Schedule,
}

/// Session status events for the presentation channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice<'a> {
    Started { mode: ReviewMode, total: usize },
    EmptyAnswer,
    Scored(&'a ReviewOutcome),
    Ended(SessionEnd),
}

/// The presentation/reviewer channel. Only `judge` blocks on the reviewer.
pub trait Reviewer {
    fn present(
        &mut self,
        mode: ReviewMode,
        record: &WordRecord,
        progress: Progress,
    ) -> Result<(), VaultError>;

    fn reveal(&mut self, record: &WordRecord, verdict: &Verdict) -> Result<(), VaultError>;

    fn notify(&mut self, notice: &Notice<'_>) -> Result<(), VaultError>;

    fn judge(&mut self, pending: Pending, record: &WordRecord) -> Result<Judgment, VaultError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub mode: ReviewMode,
    pub end: SessionEnd,
    pub total: usize,
    pub presented: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<ReviewOutcome>,
}

pub struct ReviewSession {
    mode: ReviewMode,
    quit_token: String,
    queue: Vec<WordRecord>,
    cursor: usize,
    presented: usize,
    state: SessionState,
    outcomes: Vec<ReviewOutcome>,
}

impl ReviewSession {
    /// Fetch the eligible pool (weakest first), shuffle it, and get ready to present.
    pub fn start<R>(
        store: &Store,
        mode: ReviewMode,
        quit_token: &str,
        rng: &mut R,
    ) -> Result<Self, VaultError>
    where
        R: Rng + ?Sized,
    {
        let mut queue = words::eligible_for_review(store, words::not_mastered)?;
        if queue.is_empty() {
            let counts = words::status_counts(store)?;
            let end = if counts.total() > 0 && counts.mastered == counts.total() {
                SessionEnd::AllMastered
            } else {
                SessionEnd::NothingDue
            };
            log::info!("review session not started: {:?}", end);
            let mut session = Self::with_queue(mode, quit_token, Vec::new());
            session.state = SessionState::Done(end);
            return Ok(session);
        }

        queue.shuffle(rng);
        log::info!("review session started: {} words, {:?} mode", queue.len(), mode);
        Ok(Self::with_queue(mode, quit_token, queue))
    }

    /// Session over an explicit queue, presented in the given order.
    pub fn with_queue(mode: ReviewMode, quit_token: &str, queue: Vec<WordRecord>) -> Self {
        let state = if queue.is_empty() {
            SessionState::Done(SessionEnd::NothingDue)
        } else {
            SessionState::Presenting
        };
        Self {
            mode,
            quit_token: quit_token.trim().to_lowercase(),
            queue,
            cursor: 0,
            presented: 0,
            state,
            outcomes: Vec::new(),
        }
    }

    pub fn mode(&self) -> ReviewMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn queue(&self) -> &[WordRecord] {
        &self.queue
    }

    pub fn current(&self) -> Option<&WordRecord> {
        match self.state {
            SessionState::Done(_) => None,
            _ => self.queue.get(self.cursor),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, SessionState::Done(_))
    }

    fn is_quit(&self, typed: &str) -> bool {
        typed.trim().to_lowercase() == self.quit_token
    }

    /// Advance the machine by one transition.
    pub fn step<V>(&mut self, store: &Store, reviewer: &mut V) -> Result<SessionState, VaultError>
    where
        V: Reviewer + ?Sized,
    {
        let next = match self.state {
            SessionState::Done(_) => return Ok(self.state),
            SessionState::Presenting => {
                let record = &self.queue[self.cursor];
                let progress = Progress {
                    position: self.cursor + 1,
                    total: self.queue.len(),
                };
                reviewer.present(self.mode, record, progress)?;
                self.presented += 1;
                match self.mode {
                    ReviewMode::Recognition => SessionState::AwaitingJudgment(Pending::Recognition),
                    ReviewMode::Production => SessionState::AwaitingJudgment(Pending::TypedAnswer),
                }
            }
            SessionState::AwaitingJudgment(pending) => {
                let record = &self.queue[self.cursor];
                let judgment = reviewer.judge(pending, record)?;
                match (pending, judgment) {
                    (_, Judgment::Abort) => SessionState::Done(SessionEnd::Aborted),
                    (Pending::Recognition, Judgment::Recognized(true)) => {
                        reviewer.reveal(record, &Verdict::Recognized)?;
                        SessionState::AwaitingJudgment(Pending::RecallCheck)
                    }
                    (Pending::Recognition, Judgment::Recognized(false)) => {
                        reviewer.reveal(record, &Verdict::NotRecognized)?;
                        SessionState::Scoring(Quality::Failure)
                    }
                    (Pending::RecallCheck, Judgment::RecallCorrect(correct)) => {
                        SessionState::Scoring(if correct {
                            Quality::Success
                        } else {
                            Quality::Failure
                        })
                    }
                    (Pending::TypedAnswer, Judgment::Typed(answer)) => {
                        // A correct answer wins over a quit token spelled the same.
                        if answer.trim().is_empty() {
                            reviewer.notify(&Notice::EmptyAnswer)?;
                            SessionState::AwaitingJudgment(Pending::TypedAnswer)
                        } else if record.matches_answer(&answer) {
                            reviewer.reveal(record, &Verdict::Correct)?;
                            SessionState::Scoring(Quality::Success)
                        } else if self.is_quit(&answer) {
                            SessionState::Done(SessionEnd::Aborted)
                        } else {
                            reviewer.reveal(
                                record,
                                &Verdict::Incorrect {
                                    answer: answer.trim().to_string(),
                                },
                            )?;
                            SessionState::Scoring(Quality::Failure)
                        }
                    }
                    (pending, judgment) => {
                        return Err(VaultError::ValidationError(format!(
                            "{:?} does not answer a {:?} prompt",
                            judgment, pending
                        )));
                    }
                }
            }
            SessionState::Scoring(quality) => {
                let record = &self.queue[self.cursor];
                let before = record.schedule();
                let after = sm2::apply_review(&before, quality);
                words::update_schedule(store, &record.word, &after)?;
                log::debug!(
                    "scored '{}' {:?}: interval {} -> {}, ef {:.2} -> {:.2}",
                    record.word,
                    quality,
                    before.interval,
                    after.interval,
                    before.easiness_factor,
                    after.easiness_factor
                );

                self.outcomes.push(ReviewOutcome {
                    word: record.word.clone(),
                    quality,
                    before,
                    after,
                });
                if let Some(outcome) = self.outcomes.last() {
                    reviewer.notify(&Notice::Scored(outcome))?;
                }

                self.cursor += 1;
                if self.cursor < self.queue.len() {
                    SessionState::Presenting
                } else {
                    SessionState::Done(SessionEnd::Exhausted)
                }
            }
        };

        if let SessionState::Done(end) = next {
            log::info!("review session ended: {:?}", end);
        }
        self.state = next;
        Ok(next)
    }

    /// Drive the session to completion and report what happened.
    pub fn run<V>(mut self, store: &Store, reviewer: &mut V) -> Result<SessionSummary, VaultError>
    where
        V: Reviewer + ?Sized,
    {
        if !self.is_done() {
            reviewer.notify(&Notice::Started {
                mode: self.mode,
                total: self.queue.len(),
            })?;
        }
        while !self.is_done() {
            self.step(store, reviewer)?;
        }
        let summary = self.summary();
        reviewer.notify(&Notice::Ended(summary.end))?;
        Ok(summary)
    }

    pub fn summary(&self) -> SessionSummary {
        let succeeded = self
            .outcomes
            .iter()
            .filter(|o| o.quality == Quality::Success)
            .count();
        SessionSummary {
            mode: self.mode,
            end: match self.state {
                SessionState::Done(end) => end,
                _ => SessionEnd::Aborted,
            },
            total: self.queue.len(),
            presented: self.presented,
            succeeded,
            failed: self.outcomes.len() - succeeded,
            outcomes: self.outcomes.clone(),
        }
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "review",
        "version": "0.2.0",
        "description": "Spaced-repetition review sessions over non-mastered words",
        "commands": [
            { "name": "review", "parameters": ["mode", "seed"] }
        ],
        "modes": ["recognition", "production"],
        "storage": ["words.db"]
    })
}
