//! Bookmark analysis for Markwise.
//!
//! Turns a URL into pre-filled form data by asking a text-generation model to
//! describe the page, then pulling a JSON object out of the free-form reply.
//! `analyze` never fails: any error is logged and replaced by a fixed fallback
//! record so the user can still edit and save.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::services::gemini_client::TextGenerator;
use crate::types::bookmark::BookmarkFormData;
use crate::types::errors::AnalysisError;

pub const DEFAULT_DESCRIPTION: &str = "No description available.";
pub const DEFAULT_SUMMARY: &str = "No summary available.";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

pub const FAILED_DESCRIPTION: &str = "Analysis failed.";
pub const FAILED_SUMMARY: &str = "AI could not summarize this link.";
pub const FAILED_CATEGORY: &str = "Unknown";
pub const FAILED_TAG: &str = "Untagged";

/// Trait defining the analysis operation consumed by the add flow.
#[async_trait]
pub trait BookmarkAnalyzerTrait: Send + Sync {
    async fn analyze(&self, url: &str) -> BookmarkFormData;
}

/// Analysis client over any [`TextGenerator`].
pub struct AnalysisService {
    generator: Arc<dyn TextGenerator>,
    summary_language: String,
}

impl AnalysisService {
    pub fn new(generator: Arc<dyn TextGenerator>, summary_language: impl Into<String>) -> Self {
        Self {
            generator,
            summary_language: summary_language.into(),
        }
    }

    /// Builds the fixed prompt for `url`.
    pub fn build_prompt(&self, url: &str) -> String {
        format!(
            r#"You are an intelligent bookmark assistant.
Analyze the following URL: {url}.

Your task is to:
1. Identify the likely Title of the page.
2. Write a short description of what the page is about.
3. Generate a comprehensive summary in {lang}, between 100-150 words.
4. Extract 3 to 5 key points in {lang}.
5. Suggest a single short primary category (e.g., Technology, Design, Business).
6. Suggest 3 to 5 relevant tags (e.g., React, AI, CSS, Product).

Return the result STRICTLY as a raw JSON object. Do not wrap it in markdown code fences.
The JSON structure must be:
{{
  "title": "string",
  "description": "string",
  "ai_summary": "string",
  "ai_key_points": ["string", "string", ...],
  "ai_category": "string",
  "ai_tags": ["string", "string", ...]
}}"#,
            url = url,
            lang = self.summary_language,
        )
    }

    /// Runs the model call and decode, surfacing the failure reason.
    pub async fn try_analyze(&self, url: &str) -> Result<BookmarkFormData, AnalysisError> {
        let prompt = self.build_prompt(url);
        let text = self.generator.generate(&prompt).await?;
        parse_analysis(url, &text)
    }
}

#[async_trait]
impl BookmarkAnalyzerTrait for AnalysisService {
    async fn analyze(&self, url: &str) -> BookmarkFormData {
        match self.try_analyze(url).await {
            Ok(form) => {
                tracing::info!(url, category = %form.ai_category, "analysis complete");
                form
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "analysis failed, using fallback record");
                fallback_form(url)
            }
        }
    }
}

/// Decodes model output into form data with per-field defaults.
///
/// Only the object itself must be valid JSON. A field that is missing, blank,
/// or of the wrong type falls back on its own without discarding the others.
pub fn parse_analysis(url: &str, text: &str) -> Result<BookmarkFormData, AnalysisError> {
    let object = extract_json_object(text).ok_or(AnalysisError::NoJsonFound)?;
    let payload: Map<String, Value> =
        serde_json::from_str(object).map_err(|e| AnalysisError::Decode(e.to_string()))?;

    Ok(BookmarkFormData {
        url: url.to_string(),
        title: text_field(&payload, "title").unwrap_or_else(|| url.to_string()),
        description: text_field(&payload, "description")
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        ai_summary: text_field(&payload, "ai_summary")
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        ai_key_points: list_field(&payload, "ai_key_points"),
        ai_category: text_field(&payload, "ai_category")
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        ai_tags: list_field(&payload, "ai_tags"),
        is_public: true,
    })
}

/// Non-blank string value of `key`.
fn text_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// String entries of the array at `key`; anything else yields an empty list.
fn list_field(payload: &Map<String, Value>, key: &str) -> Vec<String> {
    match payload.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => {
            tracing::debug!(key, found = %other, "ignoring non-list field in model output");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// The degraded record returned whenever analysis fails.
pub fn fallback_form(url: &str) -> BookmarkFormData {
    BookmarkFormData {
        url: url.to_string(),
        title: url.to_string(),
        description: FAILED_DESCRIPTION.to_string(),
        ai_summary: FAILED_SUMMARY.to_string(),
        ai_key_points: Vec::new(),
        ai_category: FAILED_CATEGORY.to_string(),
        ai_tags: vec![FAILED_TAG.to_string()],
        is_public: true,
    }
}

impl BookmarkFormData {
    /// True when this form is the analysis fallback rather than model output.
    pub fn is_degraded(&self) -> bool {
        self.ai_category == FAILED_CATEGORY
            && self.description == FAILED_DESCRIPTION
            && self.ai_summary == FAILED_SUMMARY
    }
}

/// Returns the first balanced `{...}` substring of `text`.
///
/// Braces inside JSON string literals (including escaped quotes) do not count
/// toward nesting. Returns `None` when no object opens or the first one never
/// closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
