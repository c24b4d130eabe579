//! Gemini `generateContent` client behind the `MealAnalyzer` seam.
//!
//! - API key travels in the `x-goog-api-key` header, never in the URL
//! - `responseMimeType` + `responseSchema` constrain the output; the text
//!   is still parsed and validated locally
//! - provider error bodies are logged, callers only get a short message

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::error::AnalysisError;
use super::parse::parse_analysis;
use super::prompts::{analysis_response_schema, ANALYSIS_PROMPT};
use super::types::AnalysisResult;
use crate::config::GeminiConfig;
use crate::images::CapturedImage;

#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    async fn analyze(&self, image: &CapturedImage) -> Result<AnalysisResult, AnalysisError>;
}

/// Slack on top of the session timeout so the session's own timer fires first.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct GeminiAnalyzer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiAnalyzer {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout() + HTTP_TIMEOUT_SLACK)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url, config.model
            ),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

/// Two-part request: instruction text, then the inline photo.
pub fn build_request_body(image: &CapturedImage) -> serde_json::Value {
    serde_json::json!({
        "contents": [
            {
                "role": "user",
                "parts": [
                    { "text": ANALYSIS_PROMPT },
                    {
                        "inlineData": {
                            "mimeType": image.mime_type,
                            "data": image.base64()
                        }
                    }
                ]
            }
        ],
        "generationConfig": {
            "temperature": 0.2,
            "responseMimeType": "application/json",
            "responseSchema": analysis_response_schema()
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

const BLOCKED_MESSAGE: &str =
    "This image could not be analyzed under the AI provider's content policy.";

const BLOCKING_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Short user-facing message for a non-2xx provider status.
pub fn status_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        401 | 403 => "The AI service rejected the configured credentials.",
        429 => "The AI service is busy right now. Please try again in a moment.",
        _ => AnalysisError::GENERIC_PROVIDER_MESSAGE,
    }
}

/// Extract the model's answer text from a `generateContent` response body.
fn response_text(body: &str) -> Result<String, AnalysisError> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "unexpected generateContent response shape");
        AnalysisError::malformed(e.to_string())
    })?;

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        warn!(block_reason = %reason, "prompt blocked by provider");
        return Err(AnalysisError::provider(BLOCKED_MESSAGE));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AnalysisError::malformed("response has no candidates"))?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKING_FINISH_REASONS.contains(&reason) {
            warn!(finish_reason = %reason, "candidate blocked by provider");
            return Err(AnalysisError::provider(BLOCKED_MESSAGE));
        }
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalysisError::malformed("candidate has no text"));
    }
    Ok(text)
}

#[async_trait]
impl MealAnalyzer for GeminiAnalyzer {
    #[instrument(skip_all, fields(model = %self.model, mime = %image.mime_type, bytes = image.bytes.len()))]
    async fn analyze(&self, image: &CapturedImage) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request_body(image))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "generateContent request failed");
                if e.is_timeout() {
                    AnalysisError::Timeout
                } else {
                    AnalysisError::generic_provider()
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "failed to read generateContent body");
            AnalysisError::generic_provider()
        })?;

        if !status.is_success() {
            error!(%status, body = %body, "provider returned an error");
            return Err(AnalysisError::provider(status_message(status)));
        }

        let text = response_text(&body)?;
        let result = parse_analysis(&text)?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            dish = %result.dish_name,
            ingredients = result.ingredients.len(),
            "meal analyzed"
        );
        Ok(result)
    }
}
