//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper: one POST per request, no retry. The transport returns
//! the raw status and body; `parse_response` is pure for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::config::Timeouts;
use super::suggestions::extract_suggestions;
use super::types::{AiError, AiResponse, GenerateContent, GenerationParams, RawResponse};

pub const TOP_P: f32 = 0.95;
pub const TOP_K: u32 = 40;

pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

// =============================================================================
// CLIENT
// =============================================================================

/// Shared, pooled HTTP client. Safe to call concurrently.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`AiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, AiError> {
        // reqwest has no write timeout; the overall deadline covers the sum of all three phases.
        let total = timeouts
            .connect_secs
            .saturating_add(timeouts.read_secs)
            .saturating_add(timeouts.write_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .read_timeout(Duration::from_secs(timeouts.read_secs))
            .timeout(Duration::from_secs(total))
            .build()
            .map_err(|e| AiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    fn endpoint(&self, model: &str) -> String {
        endpoint_url(&self.base_url, model)
    }
}

#[async_trait::async_trait]
impl GenerateContent for GeminiClient {
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<RawResponse, AiError> {
        let body = build_request_body(prompt, params);

        let response = self
            .http
            .post(self.endpoint(model))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e.without_url(), status = status.as_u16(), "gemini: response body unreadable");
                None
            }
        };
        debug!(status = status.as_u16(), body_len = body.as_ref().map_or(0, String::len), "gemini: response");

        Ok(RawResponse { status: status.as_u16(), status_text, body })
    }
}

/// `{base}/models/{model}:generateContent`. The API key travels as the `key` query parameter.
pub(crate) fn endpoint_url(base_url: &str, model: &str) -> String {
    format!("{base_url}/models/{model}:generateContent")
}

// =============================================================================
// WIRE TYPES: REQUEST
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

pub(crate) fn build_request_body(prompt: &str, params: GenerationParams) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: [RequestContent { parts: [RequestPart { text: prompt }] }],
        generation_config: GenerationConfig {
            temperature: params.temperature,
            max_output_tokens: params.max_tokens,
            top_p: TOP_P,
            top_k: TOP_K,
        },
        safety_settings: SAFETY_CATEGORIES
            .into_iter()
            .map(|category| SafetySetting { category, threshold: SAFETY_THRESHOLD })
            .collect(),
    }
}

// =============================================================================
// WIRE TYPES: RESPONSE
// =============================================================================

#[derive(Deserialize)]
struct Envelope {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

// =============================================================================
// PARSING
// =============================================================================

/// Map a raw HTTP outcome onto exactly one [`AiResponse`].
#[must_use]
pub fn parse_response(raw: &RawResponse) -> AiResponse {
    if !raw.is_success() {
        return AiResponse::Error {
            message: format!("API request failed: {} {}", raw.status, raw.status_text),
            code: Some(raw.status),
        };
    }

    let Some(body) = raw.body.as_deref().filter(|b| !b.trim().is_empty()) else {
        return AiResponse::error("Empty response");
    };

    match parse_body(body) {
        Ok(response) => response,
        Err(detail) => AiResponse::error(format!("Failed to parse response: {detail}")),
    }
}

fn parse_body(body: &str) -> Result<AiResponse, String> {
    let json: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;

    if let Some(error) = json.get("error").filter(|e| e.is_object()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| "error object has no message".to_string())?;
        return Ok(AiResponse::error(format!("API Error: {message}")));
    }

    let envelope: Envelope = serde_json::from_value(json).map_err(|e| e.to_string())?;
    let candidates = envelope
        .candidates
        .ok_or_else(|| "missing field `candidates`".to_string())?;

    let Some(candidate) = candidates.into_iter().next() else {
        return Ok(AiResponse::error("No response generated"));
    };
    let Some(part) = candidate.content.parts.into_iter().next() else {
        return Ok(AiResponse::error("Empty content in response"));
    };

    let suggestions = extract_suggestions(&part.text);
    Ok(AiResponse::Success { content: part.text, suggestions })
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
