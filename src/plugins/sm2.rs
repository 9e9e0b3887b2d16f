//! SM-2 derived update algorithm.
//!
//! Reviews are judged on two levels only: `Success` (quality 4) and `Failure`
//! (quality 2). Of the classical 0-5 scale only the "quality >= 3" branch split is ever
//! exercised, and the easiness adjustment is the linear `0.1 * (quality - 3)`.
//!
//! Status is derived from `(repetitions, easiness_factor)` after every update:
//! - `Mastered` once easiness reaches the 2.8 ceiling
//! - `Consolidating` after three straight successes with easiness >= 2.0
//! - `Learning` after at least one success
//! - `Unlearned` otherwise

use crate::plugins::words::WordStatus;
use serde::{Deserialize, Serialize};

pub const MIN_EASINESS: f64 = 1.3;
pub const MAX_EASINESS: f64 = 2.8;
pub const DEFAULT_EASINESS: f64 = 2.5;

const CONSOLIDATING_REPETITIONS: u32 = 3;
const CONSOLIDATING_EASINESS: f64 = 2.0;

/// Recall judgment for one review event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Recalled correctly (quality 4)
    Success,
    /// Not recalled (quality 2)
    Failure,
}

impl Quality {
    pub fn value(self) -> i32 {
        match self {
            Quality::Success => 4,
            Quality::Failure => 2,
        }
    }

    pub fn is_pass(self) -> bool {
        self.value() >= 3
    }
}

/// Scheduling state of a word; the only fields the scheduler ever writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub status: WordStatus,
    /// Days until the next suggested review
    pub interval: u32,
    /// Consecutive successful recalls since the last failure
    pub repetitions: u32,
    pub easiness_factor: f64,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            status: WordStatus::Unlearned,
            interval: 0,
            repetitions: 0,
            easiness_factor: DEFAULT_EASINESS,
        }
    }
}

/// Compute the state that follows `state` after a review judged `quality`.
pub fn apply_review(state: &Schedule, quality: Quality) -> Schedule {
    let (interval, repetitions) = if quality.is_pass() {
        let interval = match state.repetitions {
            0 => 1,
            1 => 6,
            _ => (state.interval as f64 * state.easiness_factor).round() as u32,
        };
        (interval, state.repetitions.saturating_add(1))
    } else {
        (1, 0)
    };

    let delta = 0.1 * (quality.value() - 3) as f64;
    let easiness_factor = normalize_easiness(state.easiness_factor + delta);

    Schedule {
        status: derive_status(repetitions, easiness_factor),
        interval,
        repetitions,
        easiness_factor,
    }
}

/// Mastery bucket for a freshly updated state.
pub fn derive_status(repetitions: u32, easiness_factor: f64) -> WordStatus {
    if easiness_factor >= MAX_EASINESS {
        WordStatus::Mastered
    } else if repetitions >= CONSOLIDATING_REPETITIONS && easiness_factor >= CONSOLIDATING_EASINESS
    {
        WordStatus::Consolidating
    } else if repetitions > 0 {
        WordStatus::Learning
    } else {
        WordStatus::Unlearned
    }
}

/// Quantise to hundredths, then clamp into `[MIN_EASINESS, MAX_EASINESS]`.
///
/// Repeated `+0.1` steps drift in binary floating point (2.7 + 0.1 is not 2.8); the
/// quantisation keeps every stored value on the decimal grid the thresholds are written in.
pub fn normalize_easiness(raw: f64) -> f64 {
    if !raw.is_finite() {
        return DEFAULT_EASINESS;
    }
    let quantised = (raw * 100.0).round() / 100.0;
    quantised.clamp(MIN_EASINESS, MAX_EASINESS)
}

/// Format an interval in days to a short human-readable string.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
