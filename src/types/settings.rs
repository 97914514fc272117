use serde::{Deserialize, Serialize};

use super::bookmark::ViewMode;

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub ai: AISettings,
    #[serde(default)]
    pub library: LibrarySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Analysis model settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AISettings {
    pub model: String,
    pub api_base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub summary_language: String,
    #[serde(default = "default_true")]
    pub enable_search: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            summary_language: "Traditional Chinese (繁體中文)".to_string(),
            enable_search: true,
        }
    }
}

/// Library browsing defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibrarySettings {
    pub default_view: ViewMode,
    /// Window used by the "recent" filter when no explicit day count is given.
    pub recent_days: u32,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            default_view: ViewMode::Grid,
            recent_days: 7,
        }
    }
}

/// Diagnostic output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
