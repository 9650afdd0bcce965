//! AI types — requests, responses, config and errors.
//!
//! Provider-neutral types shared by the prompt builder, the Gemini client
//! and the session. Requests and responses are closed enums so every
//! consumer matches them exhaustively.

use std::fmt;
use std::str::FromStr;

use crate::context::CodeContext;
use crate::settings::SettingsError;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced before or during the HTTP exchange.
///
/// Provider-side failures (non-2xx, `error` envelopes, empty candidates) are
/// not errors at this level; the parser turns them into [`AiResponse::Error`].
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// No API key has been saved.
    #[error("API key not configured")]
    MissingApiKey,

    /// An environment tuning value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// Connect, send, or timeout failure talking to the provider.
    #[error("{0}")]
    Transport(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Reading or writing persisted settings failed.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl crate::error::ErrorCode for AiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "E_MISSING_API_KEY",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::Transport(_) => "E_TRANSPORT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Settings(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

// =============================================================================
// MODEL + CONFIG
// =============================================================================

pub const MODEL_GEMINI_FLASH: &str = "gemini-1.5-flash";
pub const MODEL_GEMINI_PRO: &str = "gemini-pro";
pub const MODEL_GEMINI_PRO_VISION: &str = "gemini-pro-vision";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Gemini model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiModel {
    #[default]
    Fast,
    Quality,
    Vision,
}

impl AiModel {
    /// Model id as it appears in the request URL.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Fast => MODEL_GEMINI_FLASH,
            Self::Quality => MODEL_GEMINI_PRO,
            Self::Vision => MODEL_GEMINI_PRO_VISION,
        }
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AiModel {
    type Err = AiError;

    /// Accepts either the model id or the short alias (`fast`, `quality`, `vision`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            MODEL_GEMINI_FLASH | "fast" => Ok(Self::Fast),
            MODEL_GEMINI_PRO | "quality" => Ok(Self::Quality),
            MODEL_GEMINI_PRO_VISION | "vision" => Ok(Self::Vision),
            other => Err(AiError::ConfigParse(format!("unknown model: {other}"))),
        }
    }
}

/// Behavior flags and generation parameters, read once per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiConfig {
    pub model: AiModel,
    pub context_enabled: bool,
    pub auto_complete_enabled: bool,
    pub code_review_enabled: bool,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f32,
    /// Upper bound on generated tokens; always > 0.
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: AiModel::Fast,
            context_enabled: true,
            auto_complete_enabled: true,
            code_review_enabled: true,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// One user-initiated assistant task.
#[derive(Debug, Clone, PartialEq)]
pub enum AiRequest {
    CodeCompletion { context: CodeContext, partial_code: String },
    CodeExplanation { context: CodeContext, code: String },
    CodeReview { context: CodeContext, code: String },
    BugFix { context: CodeContext, error_message: String },
    CodeOptimization { context: CodeContext, code: String },
    GenerateDocstring { context: CodeContext, function: String },
    CustomQuery { context: CodeContext, query: String },
}

impl AiRequest {
    /// The code context snapshot carried by every variant.
    #[must_use]
    pub fn context(&self) -> &CodeContext {
        match self {
            Self::CodeCompletion { context, .. }
            | Self::CodeExplanation { context, .. }
            | Self::CodeReview { context, .. }
            | Self::BugFix { context, .. }
            | Self::CodeOptimization { context, .. }
            | Self::GenerateDocstring { context, .. }
            | Self::CustomQuery { context, .. } => context,
        }
    }

    /// Short task name for log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CodeCompletion { .. } => "code_completion",
            Self::CodeExplanation { .. } => "code_explanation",
            Self::CodeReview { .. } => "code_review",
            Self::BugFix { .. } => "bug_fix",
            Self::CodeOptimization { .. } => "code_optimization",
            Self::GenerateDocstring { .. } => "generate_docstring",
            Self::CustomQuery { .. } => "custom_query",
        }
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Outcome of a request. Exactly one is produced per [`AiRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiResponse {
    Success { content: String, suggestions: Vec<String> },
    Error { message: String, code: Option<u16> },
    Loading,
}

impl AiResponse {
    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into(), code: None }
    }
}

/// Raw HTTP outcome handed from the transport to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    /// `None` when the body could not be read.
    pub body: Option<String>,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Per-request generation parameters sent as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&AiConfig> for GenerationParams {
    fn from(config: &AiConfig) -> Self {
        Self { temperature: config.temperature, max_tokens: config.max_tokens }
    }
}

// =============================================================================
// TRANSPORT TRAIT
// =============================================================================

/// Provider transport seam. Enables mocking in tests.
#[async_trait::async_trait]
pub trait GenerateContent: Send + Sync {
    /// Issue one `generateContent` call and return the raw HTTP outcome.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Transport`] if the request cannot be sent or times out.
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<RawResponse, AiError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
