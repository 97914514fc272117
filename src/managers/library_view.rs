//! Library view for Markwise.
//!
//! Holds the explicit browsing state (collection snapshot, filter, layout,
//! selection), applies client-side filters, aggregates categories and tags,
//! and renders the collection as text or as the read-only embed page.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};

use crate::managers::bookmark_manager::BookmarkRepositoryTrait;
use crate::types::bookmark::{Bookmark, ViewMode};
use crate::types::errors::StoreError;

/// Tags shown on a card before the rest are elided.
pub const CARD_TAG_LIMIT: usize = 3;

/// Creation-time window for the "recent" filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    All,
    LastDays(u32),
}

impl TimeWindow {
    /// A window reaching past the representable date range is unbounded.
    fn contains(self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            TimeWindow::All => true,
            TimeWindow::LastDays(days) => Duration::try_days(i64::from(days))
                .and_then(|span| now.checked_sub_signed(span))
                .map_or(true, |start| created_at >= start),
        }
    }
}

/// Client-side filter. Present criteria combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryFilter {
    /// Case-insensitive substring over title, summary, category and tags.
    pub query: Option<String>,
    /// Exact, case-sensitive category.
    pub category: Option<String>,
    /// Exact, case-sensitive tag.
    pub tag: Option<String>,
    pub window: TimeWindow,
}

impl LibraryFilter {
    pub fn matches(&self, bookmark: &Bookmark, now: DateTime<Utc>) -> bool {
        if let Some(category) = &self.category {
            if &bookmark.ai_category != category {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !bookmark.ai_tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if !self.window.contains(bookmark.created_at, now) {
            return false;
        }
        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let needle = query.to_lowercase();
                let hit = |s: &str| s.to_lowercase().contains(&needle);
                hit(&bookmark.title)
                    || hit(&bookmark.ai_summary)
                    || hit(&bookmark.ai_category)
                    || bookmark.ai_tags.iter().any(|t| hit(t.as_str()))
            }
        }
    }

    /// Matching bookmarks in their original order.
    pub fn apply<'b>(&self, bookmarks: &'b [Bookmark], now: DateTime<Utc>) -> Vec<&'b Bookmark> {
        bookmarks.iter().filter(|b| self.matches(b, now)).collect()
    }
}

fn count_labels<'b>(labels: impl Iterator<Item = &'b str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels.filter(|l| !l.is_empty()) {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Category → bookmark count, most common first.
pub fn category_counts(bookmarks: &[Bookmark]) -> Vec<(String, usize)> {
    count_labels(bookmarks.iter().map(|b| b.ai_category.as_str()))
}

/// Tag → bookmark count, most common first.
pub fn tag_counts(bookmarks: &[Bookmark]) -> Vec<(String, usize)> {
    count_labels(
        bookmarks
            .iter()
            .flat_map(|b| b.ai_tags.iter().map(String::as_str)),
    )
}

/// Browsing state owned by the top-level controller.
#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    bookmarks: Vec<Bookmark>,
    pub filter: LibraryFilter,
    pub view_mode: ViewMode,
    selected: Option<String>,
}

impl LibraryState {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..Self::default()
        }
    }

    /// Re-reads the full collection; drops a selection that no longer exists.
    pub fn refresh(&mut self, repo: &dyn BookmarkRepositoryTrait) -> Result<(), StoreError> {
        self.bookmarks = repo.list()?;
        if let Some(id) = &self.selected {
            if !self.bookmarks.iter().any(|b| &b.id == id) {
                self.selected = None;
            }
        }
        Ok(())
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn visible(&self, now: DateTime<Utc>) -> Vec<&Bookmark> {
        self.filter.apply(&self.bookmarks, now)
    }

    /// Selects `id` if present. Returns whether it was found.
    pub fn select(&mut self, id: &str) -> bool {
        let found = self.bookmarks.iter().any(|b| b.id == id);
        self.selected = found.then(|| id.to_string());
        found
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Bookmark> {
        let id = self.selected.as_ref()?;
        self.bookmarks.iter().find(|b| &b.id == id)
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        render_library(&self.visible(now), self.view_mode)
    }
}

fn display_date(created_at: DateTime<Utc>) -> String {
    created_at.format("%Y-%m-%d").to_string()
}

fn card_tags(bookmark: &Bookmark) -> String {
    bookmark
        .ai_tags
        .iter()
        .take(CARD_TAG_LIMIT)
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders the listing header plus cards (grid) or rows (list).
pub fn render_library(bookmarks: &[&Bookmark], mode: ViewMode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Library: {} bookmarks saved", bookmarks.len());

    if bookmarks.is_empty() {
        out.push_str("\nNo bookmarks found. Start by adding your first URL to summarize.\n");
        return out;
    }

    for bookmark in bookmarks {
        match mode {
            ViewMode::Grid => {
                let _ = writeln!(out);
                let _ = writeln!(out, "┌ [{}] {}", bookmark.ai_category, bookmark.title);
                let _ = writeln!(out, "│ {}", bookmark.ai_summary);
                let _ = writeln!(
                    out,
                    "└ {}  {}  ({})",
                    display_date(bookmark.created_at),
                    card_tags(bookmark),
                    bookmark.id
                );
            }
            ViewMode::List => {
                let _ = writeln!(
                    out,
                    "{}  {:<12} {}  <{}>  {}",
                    display_date(bookmark.created_at),
                    bookmark.ai_category,
                    bookmark.title,
                    bookmark.url,
                    card_tags(bookmark)
                );
            }
        }
    }
    out
}

/// Full detail view of one bookmark.
pub fn render_detail(bookmark: &Bookmark) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", bookmark.ai_category, bookmark.title);
    let _ = writeln!(out, "{}", bookmark.url);
    let _ = writeln!(out, "Icon: {}", bookmark.favicon_url());
    let _ = writeln!(out, "Saved: {}", display_date(bookmark.created_at));
    let _ = writeln!(
        out,
        "Visibility: {}",
        if bookmark.is_public { "public" } else { "private" }
    );
    if !bookmark.description.is_empty() {
        let _ = writeln!(out, "\n{}", bookmark.description);
    }
    let _ = writeln!(out, "\nAI Summary\n{}", bookmark.ai_summary);
    if !bookmark.ai_key_points.is_empty() {
        let _ = writeln!(out, "\nKey Points");
        for point in &bookmark.ai_key_points {
            let _ = writeln!(out, "  • {}", point);
        }
    }
    if !bookmark.ai_tags.is_empty() {
        let tags: Vec<String> = bookmark.ai_tags.iter().map(|t| format!("#{}", t)).collect();
        let _ = writeln!(out, "\nTags: {}", tags.join(" "));
    }
    let _ = writeln!(out, "\nID: {}", bookmark.id);
    out
}

/// True when the query string carries `embed=true`.
///
/// Accepts a bare query (`a=1&embed=true`), one with a leading `?`, or a full URL.
pub fn is_embed_request(query: &str) -> bool {
    let query = match url::Url::parse(query) {
        Ok(parsed) => parsed.query().unwrap_or_default().to_string(),
        Err(_) => query.trim_start_matches('?').to_string(),
    };
    url::form_urlencoded::parse(query.as_bytes()).any(|(k, v)| k == "embed" && v == "true")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Minimal read-only HTML list for iframe embedding.
pub fn render_embed_html(bookmarks: &[Bookmark]) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Markwise Bookmarks</title>\n</head>\n<body>\n<ul class=\"markwise-embed\">\n",
    );
    for bookmark in bookmarks {
        let _ = writeln!(
            out,
            "  <li><img src=\"{icon}\" alt=\"\" width=\"16\" height=\"16\"> <a href=\"{url}\" target=\"_blank\" rel=\"noopener\">{title}</a> <span class=\"category\">{category}</span><p>{summary}</p></li>",
            icon = escape_html(&bookmark.favicon_url()),
            url = escape_html(&bookmark.url),
            title = escape_html(&bookmark.title),
            category = escape_html(&bookmark.ai_category),
            summary = escape_html(&bookmark.ai_summary),
        );
    }
    out.push_str("</ul>\n</body>\n</html>\n");
    out
}

/// Iframe snippet that embeds the library page at `page_url` in embed mode.
pub fn embed_code(page_url: &str) -> String {
    let separator = if page_url.contains('?') { '&' } else { '?' };
    let embed_url = format!("{}{}embed=true", page_url, separator);
    format!(
        "<iframe src=\"{}\" width=\"100%\" height=\"600\" frameborder=\"0\" style=\"border: 1px solid #e5e7eb; border-radius: 12px;\"></iframe>",
        escape_html(&embed_url)
    )
}
