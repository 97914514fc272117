//! Unit tests for the analysis client: prompt, JSON extraction, field
//! defaults, and the fallback record.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::rstest;

use markwise::services::analysis_service::{
    extract_json_object, fallback_form, parse_analysis, AnalysisService, BookmarkAnalyzerTrait,
    DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_SUMMARY, FAILED_CATEGORY, FAILED_TAG,
};
use markwise::services::gemini_client::TextGenerator;
use markwise::types::errors::AnalysisError;

/// Generator returning a canned reply and recording the prompts it saw.
struct ScriptedGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(AnalysisError::Network)
    }
}

const URL: &str = "https://example.com/post";

#[rstest]
#[case::bare(r#"{"a":1}"#, Some(r#"{"a":1}"#))]
#[case::prose_around(r#"Here you go: {"a":1} hope it helps"#, Some(r#"{"a":1}"#))]
#[case::markdown_fence("```json\n{\"a\":{\"b\":2}}\n```", Some("{\"a\":{\"b\":2}}"))]
#[case::first_of_two(r#"{"a":1} and {"b":2}"#, Some(r#"{"a":1}"#))]
#[case::brace_in_string(r#"{"t":"x}y"}"#, Some(r#"{"t":"x}y"}"#))]
#[case::no_object("I cannot browse that page.", None)]
#[case::unterminated(r#"{"a":"#, None)]
fn test_extract_json_object(#[case] text: &str, #[case] expected: Option<&str>) {
    assert_eq!(extract_json_object(text), expected);
}

#[test]
fn test_parse_full_payload() {
    let text = r#"Result:
{"title":"Post","description":"About things","ai_summary":"長摘要","ai_key_points":["一","二"],"ai_category":"Business","ai_tags":["AI","Product"]}"#;
    let form = parse_analysis(URL, text).unwrap();

    assert_eq!(form.url, URL);
    assert_eq!(form.title, "Post");
    assert_eq!(form.description, "About things");
    assert_eq!(form.ai_summary, "長摘要");
    assert_eq!(form.ai_key_points, vec!["一", "二"]);
    assert_eq!(form.ai_category, "Business");
    assert_eq!(form.ai_tags, vec!["AI", "Product"]);
    assert!(form.is_public);
    assert!(!form.is_degraded());
}

#[test]
fn test_parse_missing_fields_use_defaults() {
    let form = parse_analysis(URL, "{}").unwrap();
    assert_eq!(form.title, URL);
    assert_eq!(form.description, DEFAULT_DESCRIPTION);
    assert_eq!(form.ai_summary, DEFAULT_SUMMARY);
    assert_eq!(form.ai_category, DEFAULT_CATEGORY);
    assert!(form.ai_key_points.is_empty());
    assert!(form.ai_tags.is_empty());
}

#[test]
fn test_parse_blank_strings_count_as_missing() {
    let form = parse_analysis(URL, r#"{"title":"  ","ai_category":""}"#).unwrap();
    assert_eq!(form.title, URL);
    assert_eq!(form.ai_category, DEFAULT_CATEGORY);
}

#[rstest]
#[case::no_json("plain prose")]
#[case::array_not_object("[1, 2]")]
#[case::invalid_json(r#"{title: Post}"#)]
fn test_parse_rejects_unusable_output(#[case] text: &str) {
    assert!(parse_analysis(URL, text).is_err());
}

#[test]
fn test_parse_wrong_typed_field_keeps_the_others() {
    let text = r#"{"title":"Post","ai_summary":"Good","ai_category":"Business","ai_tags":"React, AI","ai_key_points":[1,"kept"],"description":42}"#;
    let form = parse_analysis(URL, text).unwrap();

    assert_eq!(form.title, "Post");
    assert_eq!(form.ai_summary, "Good");
    assert_eq!(form.ai_category, "Business");
    assert!(form.ai_tags.is_empty());
    assert_eq!(form.ai_key_points, vec!["kept"]);
    assert_eq!(form.description, DEFAULT_DESCRIPTION);
    assert!(!form.is_degraded());
}

#[test]
fn test_prompt_names_url_language_and_fields() {
    let service = AnalysisService::new(ScriptedGenerator::ok("{}"), "English");
    let prompt = service.build_prompt(URL);
    assert!(prompt.contains(URL));
    assert!(prompt.contains("English"));
    for field in ["title", "description", "ai_summary", "ai_key_points", "ai_category", "ai_tags"] {
        assert!(prompt.contains(field), "prompt should mention {}", field);
    }
}

#[tokio::test]
async fn test_analyze_sends_one_prompt_and_parses() {
    let generator = ScriptedGenerator::ok(r#"{"title":"T","ai_category":"Design","ai_tags":["CSS"]}"#);
    let service = AnalysisService::new(generator.clone(), "English");

    let form = service.analyze(URL).await;

    assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    assert_eq!(form.title, "T");
    assert_eq!(form.ai_category, "Design");
    assert_eq!(form.ai_tags, vec!["CSS"]);
}

#[tokio::test]
async fn test_analyze_falls_back_on_transport_error() {
    let service = AnalysisService::new(ScriptedGenerator::failing("connection refused"), "English");
    let form = service.analyze(URL).await;
    assert_eq!(form, fallback_form(URL));
    assert_eq!(form.ai_category, FAILED_CATEGORY);
    assert_eq!(form.ai_tags, vec![FAILED_TAG]);
    assert!(form.is_degraded());
}

#[tokio::test]
async fn test_analyze_falls_back_on_non_json_reply() {
    let service = AnalysisService::new(ScriptedGenerator::ok("Sorry, I can't."), "English");
    let form = service.analyze(URL).await;
    assert!(form.is_degraded());
    assert_eq!(form.title, URL);
}

#[tokio::test]
async fn test_try_analyze_surfaces_reason() {
    let service = AnalysisService::new(ScriptedGenerator::ok("nothing here"), "English");
    let err = service.try_analyze(URL).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoJsonFound));
}
