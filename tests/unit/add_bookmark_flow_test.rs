//! Unit tests for the add-bookmark flow state machine.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use markwise::managers::add_bookmark_flow::{AddBookmarkFlow, FlowStep, ANALYSIS_FAILED_NOTICE};
use markwise::services::analysis_service::{fallback_form, BookmarkAnalyzerTrait};
use markwise::types::bookmark::BookmarkFormData;
use markwise::types::errors::FlowError;

struct FixedAnalyzer(BookmarkFormData);

#[async_trait]
impl BookmarkAnalyzerTrait for FixedAnalyzer {
    async fn analyze(&self, _url: &str) -> BookmarkFormData {
        self.0.clone()
    }
}

struct FailingAnalyzer;

#[async_trait]
impl BookmarkAnalyzerTrait for FailingAnalyzer {
    async fn analyze(&self, url: &str) -> BookmarkFormData {
        fallback_form(url)
    }
}

fn analyzed_form() -> BookmarkFormData {
    BookmarkFormData {
        url: "https://ignored.example".to_string(),
        title: "Rust Book".to_string(),
        description: "The book".to_string(),
        ai_summary: "摘要".to_string(),
        ai_key_points: vec!["ownership".to_string()],
        ai_category: "Technology".to_string(),
        ai_tags: vec!["Rust".to_string()],
        is_public: true,
    }
}

#[test]
fn test_new_flow_starts_at_input() {
    let flow = AddBookmarkFlow::new();
    assert_eq!(flow.step(), FlowStep::Input);
    assert!(flow.notice().is_none());
}

#[test]
fn test_empty_url_is_rejected() {
    let mut flow = AddBookmarkFlow::new();
    assert_eq!(flow.begin_analysis("   "), Err(FlowError::EmptyUrl));
    assert_eq!(flow.step(), FlowStep::Input);
}

#[test]
fn test_resubmission_while_analyzing_is_rejected() {
    let mut flow = AddBookmarkFlow::new();
    flow.begin_analysis("https://a.io").unwrap();
    assert_eq!(
        flow.begin_analysis("https://b.io"),
        Err(FlowError::AnalysisInProgress)
    );
    assert_eq!(flow.url(), "https://a.io");
}

#[tokio::test]
async fn test_analyze_moves_to_edit_with_prefilled_form() {
    let mut flow = AddBookmarkFlow::new();
    let analyzer = FixedAnalyzer(analyzed_form());

    let form = flow.analyze(&analyzer, " https://doc.rust-lang.org/book ").await.unwrap();
    assert_eq!(form.url, "https://doc.rust-lang.org/book");
    assert_eq!(form.title, "Rust Book");

    assert_eq!(flow.step(), FlowStep::Edit);
    assert!(flow.notice().is_none());
}

#[tokio::test]
async fn test_degraded_analysis_sets_notice_but_still_edits() {
    let mut flow = AddBookmarkFlow::new();
    flow.analyze(&FailingAnalyzer, "https://down.example").await.unwrap();

    assert_eq!(flow.step(), FlowStep::Edit);
    assert_eq!(flow.notice(), Some(ANALYSIS_FAILED_NOTICE));
    assert_eq!(flow.form().ai_category, "Unknown");
}

#[test]
fn test_empty_category_becomes_uncategorized() {
    let mut flow = AddBookmarkFlow::new();
    flow.begin_analysis("https://a.io").unwrap();
    flow.complete_analysis(BookmarkFormData {
        ai_category: String::new(),
        ..analyzed_form()
    })
    .unwrap();
    assert_eq!(flow.form().ai_category, "Uncategorized");
}

#[test]
fn test_complete_without_begin_is_invalid() {
    let mut flow = AddBookmarkFlow::new();
    assert_eq!(
        flow.complete_analysis(analyzed_form()),
        Err(FlowError::InvalidStep {
            expected: "Analyzing",
            found: "Input"
        })
    );
}

#[test]
fn test_enter_manually_prefills_url_as_title() {
    let mut flow = AddBookmarkFlow::new();
    flow.enter_manually("https://manual.example").unwrap();

    let form = flow.form();
    assert_eq!(flow.step(), FlowStep::Edit);
    assert_eq!(form.title, "https://manual.example");
    assert_eq!(form.ai_category, "Uncategorized");
    assert!(form.is_public);
}

#[test]
fn test_back_returns_to_input_keeping_url() {
    let mut flow = AddBookmarkFlow::new();
    flow.enter_manually("https://a.io").unwrap();
    flow.back().unwrap();
    assert_eq!(flow.step(), FlowStep::Input);
    assert_eq!(flow.url(), "https://a.io");
    assert!(flow.form_mut().is_err());
}

#[test]
fn test_finish_builds_bookmark_from_edits_and_resets() {
    let mut flow = AddBookmarkFlow::new();
    flow.begin_analysis("https://www.rust-lang.org/learn").unwrap();
    flow.complete_analysis(analyzed_form()).unwrap();
    {
        let form = flow.form_mut().unwrap();
        form.title = "Learn Rust".to_string();
        form.is_public = false;
    }

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let bookmark = flow.finish(now).unwrap();

    assert_eq!(bookmark.url, "https://www.rust-lang.org/learn");
    assert_eq!(bookmark.title, "Learn Rust");
    assert!(!bookmark.is_public);
    assert!(!bookmark.is_archived);
    assert!(!bookmark.is_favorite);
    assert_eq!(bookmark.created_at, now);
    assert_eq!(
        bookmark.favicon.as_deref(),
        Some("https://www.google.com/s2/favicons?domain=www.rust-lang.org&sz=64")
    );
    assert!(uuid::Uuid::parse_str(&bookmark.id).is_ok());

    assert_eq!(flow.step(), FlowStep::Input);
    assert_eq!(flow.url(), "");
}

#[test]
fn test_finish_twice_yields_distinct_ids() {
    let mut flow = AddBookmarkFlow::new();
    flow.enter_manually("https://a.io").unwrap();
    let first = flow.finish(Utc::now()).unwrap();
    flow.enter_manually("https://a.io").unwrap();
    let second = flow.finish(Utc::now()).unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn test_finish_outside_edit_is_invalid() {
    let mut flow = AddBookmarkFlow::new();
    assert!(matches!(
        flow.finish(Utc::now()),
        Err(FlowError::InvalidStep { .. })
    ));
}
