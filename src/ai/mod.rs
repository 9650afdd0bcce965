//! AI — prompt → Gemini → parsed response.
//!
//! DESIGN
//! ======
//! `AiService` is constructed once by the application and shared as
//! `Arc<AiService>`. It owns no mutable state of its own: settings come from
//! the injected [`SettingsStore`] (read once per request as a snapshot) and
//! the network goes through the injected [`GenerateContent`] transport.
//! `process_request` never fails; every failure becomes
//! [`AiResponse::Error`].

pub mod config;
pub mod gemini;
pub mod prompt;
pub mod suggestions;
pub mod types;

use std::sync::Arc;

use tracing::{info, warn};

use crate::context::CodeContext;
use crate::error::ErrorCode;
use crate::settings::SettingsStore;
use config::AssistConfig;
use gemini::GeminiClient;
pub use types::{AiConfig, AiError, AiModel, AiRequest, AiResponse, GenerateContent, GenerationParams, RawResponse};

pub const MISSING_KEY_MESSAGE: &str = "API key not configured. Please set your Gemini API key in settings.";

/// Suggestions returned by [`AiService::quick_completion`] unless the caller asks for fewer.
pub const DEFAULT_QUICK_SUGGESTIONS: usize = 3;

// =============================================================================
// SERVICE
// =============================================================================

pub struct AiService {
    settings: Arc<SettingsStore>,
    transport: Arc<dyn GenerateContent>,
}

impl AiService {
    #[must_use]
    pub fn new(settings: Arc<SettingsStore>, transport: Arc<dyn GenerateContent>) -> Self {
        Self { settings, transport }
    }

    /// Build a service talking to Gemini with the endpoint and timeouts from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_gemini(settings: Arc<SettingsStore>, config: &AssistConfig) -> Result<Self, AiError> {
        let client = GeminiClient::new(&config.base_url, config.timeouts)?;
        Ok(Self::new(settings, Arc::new(client)))
    }

    #[must_use]
    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// Run one request through prompt building, transport and parsing.
    pub async fn process_request(&self, request: &AiRequest) -> AiResponse {
        match self.try_process(request).await {
            Ok(response) => response,
            Err(AiError::MissingApiKey) => {
                warn!(kind = request.kind(), code = AiError::MissingApiKey.error_code(), "ai: no API key");
                AiResponse::error(MISSING_KEY_MESSAGE)
            }
            Err(e) => {
                warn!(kind = request.kind(), code = e.error_code(), retryable = e.retryable(), error = %e, "ai: request failed");
                AiResponse::error(format!("AI request failed: {e}"))
            }
        }
    }

    async fn try_process(&self, request: &AiRequest) -> Result<AiResponse, AiError> {
        let api_key = self
            .settings
            .api_key()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AiError::MissingApiKey)?;

        // Single snapshot for the whole request.
        let config = self.settings.config();
        let prompt = prompt::build_prompt(request, &config);
        info!(
            kind = request.kind(),
            model = %config.model,
            context = config.context_enabled,
            prompt_len = prompt.len(),
            "ai: sending request"
        );

        let raw = self
            .transport
            .generate(&api_key, config.model.id(), &prompt, GenerationParams::from(&config))
            .await?;
        let response = gemini::parse_response(&raw);

        match &response {
            AiResponse::Success { content, suggestions } => {
                info!(status = raw.status, content_len = content.len(), suggestions = suggestions.len(), "ai: response ok");
            }
            AiResponse::Error { message, .. } => {
                warn!(status = raw.status, %message, "ai: provider error");
            }
            AiResponse::Loading => {}
        }
        Ok(response)
    }

    /// Completion suggestions for inline use. Empty when auto-complete is off
    /// or the request fails.
    pub async fn quick_completion(&self, context: CodeContext, partial_code: &str, max: usize) -> Vec<String> {
        if !self.settings.config().auto_complete_enabled {
            return Vec::new();
        }
        let request = AiRequest::CodeCompletion { context, partial_code: partial_code.to_string() };
        match self.process_request(&request).await {
            AiResponse::Success { mut suggestions, .. } => {
                suggestions.truncate(max);
                suggestions
            }
            AiResponse::Error { .. } | AiResponse::Loading => Vec::new(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
