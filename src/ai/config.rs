//! Process tuning parsed from environment variables.
//!
//! Persisted user choices (API key, model, flags) live in [`crate::settings`].
//! This module covers what an operator sets once per process: endpoint,
//! timeouts and generation parameters.

use std::path::PathBuf;

use super::types::{AiError, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect_secs: u64,
    pub read_secs: u64,
    pub write_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_secs: DEFAULT_READ_TIMEOUT_SECS,
            write_secs: DEFAULT_WRITE_TIMEOUT_SECS,
        }
    }
}

/// Generation parameters that are not persisted with the user settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self { temperature: DEFAULT_TEMPERATURE, max_tokens: DEFAULT_MAX_TOKENS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
    pub tuning: Tuning,
    /// Overrides the platform config directory for `settings.json`.
    pub config_dir: Option<PathBuf>,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeouts: Timeouts::default(),
            tuning: Tuning::default(),
            config_dir: None,
        }
    }
}

impl AssistConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `GEMINI_BASE_URL`: default `https://generativelanguage.googleapis.com/v1beta`
    /// - `AI_CONNECT_TIMEOUT_SECS` / `AI_READ_TIMEOUT_SECS` / `AI_WRITE_TIMEOUT_SECS`: 30 / 60 / 30
    /// - `AI_TEMPERATURE`: default 0.7, must lie in `[0, 1]`
    /// - `AI_MAX_TOKENS`: default 2048, must be > 0
    /// - `POCKET_ASSIST_CONFIG_DIR`: settings directory override
    ///
    /// # Errors
    ///
    /// Returns [`AiError::ConfigParse`] if a generation parameter is malformed
    /// or out of range.
    pub fn from_env() -> Result<Self, AiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AssistConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`AssistConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AiError> {
        let base_url = lookup("GEMINI_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeouts = Timeouts {
            connect_secs: parse_or(&lookup, "AI_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            read_secs: parse_or(&lookup, "AI_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS),
            write_secs: parse_or(&lookup, "AI_WRITE_TIMEOUT_SECS", DEFAULT_WRITE_TIMEOUT_SECS),
        };

        let temperature = parse_strict(&lookup, "AI_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(AiError::ConfigParse(format!("AI_TEMPERATURE out of range [0, 1]: {temperature}")));
        }
        let max_tokens = parse_strict(&lookup, "AI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(AiError::ConfigParse("AI_MAX_TOKENS must be greater than 0".into()));
        }

        let config_dir = lookup("POCKET_ASSIST_CONFIG_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { base_url, timeouts, tuning: Tuning { temperature, max_tokens }, config_dir })
    }
}

/// Timeouts fall back to the default on garbage; they are not worth failing startup over.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_strict<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AiError>
where
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AiError::ConfigParse(format!("invalid {key}: {raw}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
