use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base of the external favicon lookup used when a bookmark carries no icon.
pub const FAVICON_LOOKUP_BASE: &str = "https://www.google.com/s2/favicons";

/// A saved URL together with its AI-derived metadata.
///
/// Stored records may predate newer fields, so everything except `id`, `url`
/// and `created_at` falls back to a default when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ai_summary: String,
    #[serde(default)]
    pub ai_key_points: Vec<String>,
    #[serde(default)]
    pub ai_category: String,
    #[serde(default)]
    pub ai_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Icon to display: the stored favicon, or the host-keyed lookup URL.
    pub fn favicon_url(&self) -> String {
        self.favicon
            .clone()
            .unwrap_or_else(|| favicon_for(&self.url))
    }

    /// Host part of the URL, or the raw URL when it does not parse.
    pub fn host(&self) -> String {
        host_of(&self.url)
    }
}

/// Editable analysis output; becomes a [`Bookmark`] once saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BookmarkFormData {
    pub url: String,
    pub title: String,
    pub description: String,
    pub ai_summary: String,
    pub ai_key_points: Vec<String>,
    pub ai_category: String,
    pub ai_tags: Vec<String>,
    pub is_public: bool,
}

impl Default for BookmarkFormData {
    fn default() -> Self {
        Self {
            url: String::new(),
            title: String::new(),
            description: String::new(),
            ai_summary: String::new(),
            ai_key_points: Vec::new(),
            ai_category: String::new(),
            ai_tags: Vec::new(),
            is_public: true,
        }
    }
}

/// Layout of the library listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

/// Returns the host of `url`, falling back to the trimmed input.
pub fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.trim().to_string())
}

/// Deterministic favicon lookup URL keyed by the host of `url`.
pub fn favicon_for(url: &str) -> String {
    format!("{}?domain={}&sz=64", FAVICON_LOOKUP_BASE, host_of(url))
}
