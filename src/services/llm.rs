use crate::config::LlmSettings;
use crate::error::{ApiError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const MAX_TEXT_PREVIEW_LENGTH: usize = 200;

lazy_static! {
    /// Gemini quota errors carry `"retryDelay": "34s"` in their details.
    static ref RETRY_DELAY: Regex = Regex::new(r#"retryDelay":\s*"(\d+)"#).unwrap();
}

/// Markers that identify a provider-side rate limit in an error payload.
const RATE_LIMIT_MARKERS: [&str; 2] = ["RateLimitError", "RESOURCE_EXHAUSTED"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Seconds to wait before retrying, as suggested by a rate-limit payload.
pub fn retry_delay_secs(error_text: &str) -> Option<u64> {
    RETRY_DELAY
        .captures(error_text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn is_rate_limit(status: StatusCode, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || RATE_LIMIT_MARKERS.iter().any(|m| body.contains(m))
}

fn preview(text: &str) -> String {
    text.chars().take(MAX_TEXT_PREVIEW_LENGTH).collect()
}

/// Minimal client for a hosted Gemini model that answers in JSON.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings, api_key: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        info!("Initialized LLM client for model {}", model);
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user prompt and return the raw text of the first candidate.
    ///
    /// A successful call without usable text (safety blocks, unknown envelopes)
    /// yields `None`; transport failures and non-2xx statuses are errors.
    pub async fn generate_json(&self, prompt: &str) -> Result<Option<String>> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        debug!("Sending {} prompt characters to {}", prompt.len(), self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if is_rate_limit(status, &body) {
                return Err(ApiError::RateLimited {
                    retry_after_secs: retry_delay_secs(&body),
                    message: preview(&body),
                });
            }
            return Err(ApiError::ExternalServiceError(format!(
                "{} returned {}: {}",
                self.model,
                status,
                preview(&body)
            )));
        }

        let parsed: GenerateResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("{} answered with an unexpected envelope: {}", self.model, e);
                return Ok(None);
            }
        };

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text);
        if text.is_none() {
            warn!("{} returned no candidate text: {}", self.model, preview(&body));
        }
        Ok(text)
    }
}
