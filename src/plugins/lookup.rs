//! Word-definition lookup against an OpenAI-compatible chat completions endpoint.
//!
//! The lookup is a collaborator, not part of the scheduling core: every failure is
//! reported as a [`LookupFailure`] and callers fall back to a bare record.

use crate::core::config::LookupConfig;
use crate::core::error;
use crate::plugins::words::WordDetails;
use serde::{Deserialize, Serialize};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

/// Marker the model is asked to answer with when it has nothing for a word.
pub const UNAVAILABLE_MARKER: &str = "UNAVAILABLE";

/// `Label: value`, optionally behind a bullet or list number; ASCII or full-width colon.
static LABELLED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*•]|\d+[.)])?\s*(translation|phonetic|example)\s*[:：]\s*(\S.*)$")
        .unwrap()
});

const TRANSLATION_LABEL: &str = "Translation:";
const PHONETIC_LABEL: &str = "Phonetic:";
const EXAMPLE_LABEL: &str = "Example:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// No API key configured
    NotConfigured,
    /// Transport error or non-success HTTP status
    Unreachable(String),
    /// Response arrived but could not be parsed into all three fields
    Malformed(String),
    /// The service explicitly had nothing for this word
    NoData,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::NotConfigured => write!(f, "lookup service not configured"),
            LookupFailure::Unreachable(msg) => write!(f, "lookup service unreachable: {}", msg),
            LookupFailure::Malformed(msg) => write!(f, "malformed lookup response: {}", msg),
            LookupFailure::NoData => write!(f, "no data for word"),
        }
    }
}

pub trait Lookup {
    fn lookup(&self, word: &str) -> Result<WordDetails, LookupFailure>;
}

/// Stand-in used when no API key is configured.
pub struct DisabledLookup;

impl Lookup for DisabledLookup {
    fn lookup(&self, _word: &str) -> Result<WordDetails, LookupFailure> {
        Err(LookupFailure::NotConfigured)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct LlmLookup {
    config: LookupConfig,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl LlmLookup {
    pub fn new(config: &LookupConfig, api_key: &str) -> Result<Self, error::VaultError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| error::VaultError::LookupError(e.to_string()))?;
        Ok(Self {
            config: config.clone(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim().trim_end_matches('/')
        )
    }
}

impl Lookup for LlmLookup {
    fn lookup(&self, word: &str) -> Result<WordDetails, LookupFailure> {
        let messages = [
            ChatMessage {
                role: "system".into(),
                content: "You are a precise vocabulary assistant for language learners.".into(),
            },
            ChatMessage {
                role: "user".into(),
                content: build_prompt(word, &self.config.target_language, self.config.topic.as_deref()),
            },
        ];
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": 150,
            "temperature": 0.5,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| LookupFailure::Unreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(LookupFailure::Unreachable(format!("HTTP {}: {}", status, body.trim())));
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| LookupFailure::Malformed(e.to_string()))?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| LookupFailure::Malformed("empty choices".to_string()))?;

        parse_details(content)
    }
}

pub fn build_prompt(word: &str, target_language: &str, topic: Option<&str>) -> String {
    let topic_line = match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => format!("The word comes from a {} vocabulary list.\n", t),
        None => String::new(),
    };
    format!(
        "{topic_line}Give the following for the English word '{word}':\n\
         1. A concise {lang} translation\n\
         2. The IPA transcription, e.g. /ˈɛk.səm.pəl/\n\
         3. One simple English example sentence using the word, followed by its {lang} translation\n\
         Answer in exactly this format:\n\
         {TRANSLATION_LABEL} <translation>\n\
         {PHONETIC_LABEL} <ipa>\n\
         {EXAMPLE_LABEL} <sentence> | <translated sentence>\n\
         If the word is not valid or you cannot answer, reply with {UNAVAILABLE_MARKER} only.",
        lang = target_language,
    )
}

/// Pull the three labelled lines out of a model reply. All three must be present.
pub fn parse_details(content: &str) -> Result<WordDetails, LookupFailure> {
    let content = content.trim();
    if content.contains(UNAVAILABLE_MARKER) {
        return Err(LookupFailure::NoData);
    }

    let mut details = WordDetails::default();
    for line in content.lines() {
        let Some(caps) = LABELLED_LINE.captures(line) else {
            continue;
        };
        let value = caps[2].trim().to_string();
        match caps[1].to_ascii_lowercase().as_str() {
            "translation" => details.translation = Some(value),
            "phonetic" => details.phonetic = Some(value),
            _ => details.example = Some(value),
        }
    }

    let missing: Vec<&str> = [
        (details.translation.is_none(), "translation"),
        (details.phonetic.is_none(), "phonetic"),
        (details.example.is_none(), "example"),
    ]
    .iter()
    .filter(|(absent, _)| *absent)
    .map(|(_, name)| *name)
    .collect();

    if !missing.is_empty() {
        return Err(LookupFailure::Malformed(format!("missing {}", missing.join(", "))));
    }
    Ok(details)
}
