//! Gemini `generateContent` client.
//!
//! Sends a single user prompt with search grounding enabled and returns the
//! concatenated text of the first candidate. Search grounding cannot be combined
//! with a response schema, so the caller parses free text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::types::errors::AnalysisError;
use crate::types::settings::AISettings;

/// Fallback environment variable consulted when the configured one is unset.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

/// Opaque text-generation call used by the analysis client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<RequestTool>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct RequestTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<Zeroizing<String>>,
    api_key_env: String,
    enable_search: bool,
}

impl GeminiClient {
    /// Creates a client with an explicit key (or none).
    pub fn new(settings: &AISettings, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.filter(|k| !k.is_empty()).map(Zeroizing::new),
            api_key_env: settings.api_key_env.clone(),
            enable_search: settings.enable_search,
        }
    }

    /// Creates a client reading the key from the configured environment variable,
    /// then from [`FALLBACK_API_KEY_ENV`].
    pub fn from_env(settings: &AISettings) -> Self {
        let key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(FALLBACK_API_KEY_ENV).ok());
        Self::new(settings, key)
    }

    /// Full `generateContent` URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        let tools = if self.enable_search {
            vec![RequestTool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            tools,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AnalysisError::MissingApiKey(self.api_key_env.clone()))?;

        tracing::debug!(model = %self.model, search = self.enable_search, "sending generateContent request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", key.as_str())
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(text)
    }
}
