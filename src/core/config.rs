//! Vault configuration: `<store root>/config.toml` plus environment overrides.
//!
//! A missing file means defaults. Environment variables win over the file and are
//! ignored when blank.

use crate::core::error::VaultError;
use crate::core::schemas;
use crate::plugins::review::ReviewMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const MODEL_ENV: &str = "OPENAI_MODEL";
pub const QUIT_TOKEN_ENV: &str = "WORDVAULT_QUIT_TOKEN";

/// Answers the recognition prompts read, so none of them can double as the quit token.
const RESERVED_ANSWERS: &[&str] = &["y", "yes", "n", "no"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub lookup: LookupConfig,
    pub review: ReviewConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub target_language: String,
    /// Optional domain hint, e.g. "biology"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            target_language: "Chinese".to_string(),
            topic: None,
        }
    }
}

impl LookupConfig {
    /// API key if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub default_mode: ReviewMode,
    /// Typed answer that ends a session, compared case-insensitively
    pub quit_token: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            default_mode: ReviewMode::Recognition,
            quit_token: "q".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Case-insensitive substring a word list's file name must contain
    pub name_filter: String,
    pub extension: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            name_filter: "word".to_string(),
            extension: "txt".to_string(),
        }
    }
}

impl VaultConfig {
    /// Load `config.toml` from the store root, then apply environment overrides.
    pub fn load(store_root: &Path) -> Result<Self, VaultError> {
        let mut config = Self::from_file(&store_root.join(schemas::CONFIG_FILE_NAME))?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, VaultError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(VaultError::IoError)?;
        Self::parse(&content)
            .map_err(|e| VaultError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, VaultError> {
        let config: Self =
            toml::from_str(content).map_err(|e| VaultError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VaultError> {
        let token = self.review.quit_token.trim().to_lowercase();
        if token.is_empty() {
            return Err(VaultError::ConfigError(
                "review.quit_token must not be blank".to_string(),
            ));
        }
        if RESERVED_ANSWERS.contains(&token.as_str()) {
            return Err(VaultError::ConfigError(format!(
                "review.quit_token '{}' collides with a y/n answer",
                self.review.quit_token
            )));
        }
        Ok(())
    }

    /// Apply overrides from `lookup_env`, which stands in for `std::env::var` in tests.
    pub fn apply_env<F>(&mut self, lookup_env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup_env(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(API_KEY_ENV) {
            self.lookup.api_key = Some(key);
        }
        if let Some(url) = var(BASE_URL_ENV) {
            self.lookup.base_url = url;
        }
        if let Some(model) = var(MODEL_ENV) {
            self.lookup.model = model;
        }
        if let Some(token) = var(QUIT_TOKEN_ENV) {
            self.review.quit_token = token.trim().to_string();
        }
    }
}
