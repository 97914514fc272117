//! Add-bookmark flow.
//!
//! Tracks the three steps of adding a link: entering the URL, waiting for the
//! analysis, and editing the pre-filled form. Only one analysis can be in
//! flight; the caller cannot cancel it once started.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::services::analysis_service::BookmarkAnalyzerTrait;
use crate::types::bookmark::{favicon_for, Bookmark, BookmarkFormData};
use crate::types::errors::FlowError;

/// Shown when the analysis fell back to placeholder data.
pub const ANALYSIS_FAILED_NOTICE: &str =
    "Failed to analyze URL. Please try again or enter manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    Input,
    Analyzing,
    Edit,
}

impl FlowStep {
    fn name(self) -> &'static str {
        match self {
            FlowStep::Input => "Input",
            FlowStep::Analyzing => "Analyzing",
            FlowStep::Edit => "Edit",
        }
    }
}

/// State of one add-bookmark interaction.
#[derive(Debug, Clone)]
pub struct AddBookmarkFlow {
    step: FlowStep,
    url: String,
    form: BookmarkFormData,
    notice: Option<String>,
}

impl Default for AddBookmarkFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AddBookmarkFlow {
    pub fn new() -> Self {
        Self {
            step: FlowStep::Input,
            url: String::new(),
            form: BookmarkFormData::default(),
            notice: None,
        }
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn form(&self) -> &BookmarkFormData {
        &self.form
    }

    /// Inline message for the user, set when the analysis degraded.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn expect_step(&self, expected: FlowStep) -> Result<(), FlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FlowError::InvalidStep {
                expected: expected.name(),
                found: self.step.name(),
            })
        }
    }

    /// Moves to `Analyzing` for `url`.
    pub fn begin_analysis(&mut self, url: &str) -> Result<String, FlowError> {
        if self.step == FlowStep::Analyzing {
            return Err(FlowError::AnalysisInProgress);
        }
        self.expect_step(FlowStep::Input)?;

        let url = url.trim();
        if url.is_empty() {
            return Err(FlowError::EmptyUrl);
        }
        self.url = url.to_string();
        self.notice = None;
        self.step = FlowStep::Analyzing;
        Ok(self.url.clone())
    }

    /// Stores the analysis result and moves to `Edit`.
    pub fn complete_analysis(&mut self, mut form: BookmarkFormData) -> Result<(), FlowError> {
        self.expect_step(FlowStep::Analyzing)?;
        if form.ai_category.trim().is_empty() {
            form.ai_category = "Uncategorized".to_string();
        }
        form.url = self.url.clone();
        self.notice = form
            .is_degraded()
            .then(|| ANALYSIS_FAILED_NOTICE.to_string());
        self.form = form;
        self.step = FlowStep::Edit;
        Ok(())
    }

    /// Runs the whole analysis step against `analyzer`.
    pub async fn analyze(
        &mut self,
        analyzer: &dyn BookmarkAnalyzerTrait,
        url: &str,
    ) -> Result<&BookmarkFormData, FlowError> {
        let url = self.begin_analysis(url)?;
        let form = analyzer.analyze(&url).await;
        self.complete_analysis(form)?;
        Ok(&self.form)
    }

    /// Skips analysis and opens an empty form for manual entry.
    pub fn enter_manually(&mut self, url: &str) -> Result<(), FlowError> {
        let url = self.begin_analysis(url)?;
        self.complete_analysis(BookmarkFormData {
            url: url.clone(),
            title: url,
            ..BookmarkFormData::default()
        })
    }

    /// Edit buffer; only available in `Edit`.
    pub fn form_mut(&mut self) -> Result<&mut BookmarkFormData, FlowError> {
        self.expect_step(FlowStep::Edit)?;
        Ok(&mut self.form)
    }

    /// Returns from `Edit` to `Input`, keeping the URL.
    pub fn back(&mut self) -> Result<(), FlowError> {
        self.expect_step(FlowStep::Edit)?;
        self.step = FlowStep::Input;
        Ok(())
    }

    /// Turns the edited form into a new bookmark and resets the flow.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<Bookmark, FlowError> {
        self.expect_step(FlowStep::Edit)?;
        let form = std::mem::take(&mut self.form);
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            favicon: Some(favicon_for(&form.url)),
            url: form.url,
            title: form.title,
            description: form.description,
            ai_summary: form.ai_summary,
            ai_key_points: form.ai_key_points,
            ai_category: form.ai_category,
            ai_tags: form.ai_tags,
            og_image: None,
            is_public: form.is_public,
            is_archived: false,
            is_favorite: false,
            created_at: now,
        };
        self.reset();
        Ok(bookmark)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
