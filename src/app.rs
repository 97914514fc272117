//! App Core for Markwise.
//!
//! Central struct holding the database, settings, and analyzer. Repositories
//! borrow the store, so they are created on demand via [`App::repository`].

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::database::connection::Database;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkRepositoryTrait};
use crate::managers::library_view::LibraryState;
use crate::services::analysis_service::{AnalysisService, BookmarkAnalyzerTrait};
use crate::services::gemini_client::GeminiClient;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::storage_service::BookmarkStore;
use crate::types::errors::StoreError;

/// Central application struct.
pub struct App {
    pub db: Arc<Database>,
    pub store: BookmarkStore,
    pub settings_engine: SettingsEngine,
    pub analyzer: Arc<dyn BookmarkAnalyzerTrait>,
}

impl App {
    /// Opens the database at `db_path`, loads settings, and builds the Gemini-backed analyzer.
    ///
    /// The stored collection is read once so that corruption fails startup
    /// instead of surfacing on the first mutation.
    pub fn new<P: AsRef<Path>>(
        db_path: P,
        settings_engine: SettingsEngine,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);
        let settings = settings_engine.get_settings().ai.clone();
        let generator = Arc::new(GeminiClient::from_env(&settings));
        if !generator.has_api_key() {
            tracing::warn!(env = %settings.api_key_env, "no API key configured; analyses will fall back");
        }
        let analyzer = Arc::new(AnalysisService::new(generator, settings.summary_language));
        Self::with_parts(db, settings_engine, analyzer)
    }

    /// Assembles an app from existing parts and verifies the store decodes.
    pub fn with_parts(
        db: Arc<Database>,
        settings_engine: SettingsEngine,
        analyzer: Arc<dyn BookmarkAnalyzerTrait>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let app = Self {
            store: BookmarkStore::new(db.clone()),
            db,
            settings_engine,
            analyzer,
        };
        app.repository().list()?;
        Ok(app)
    }

    pub fn repository(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(&self.store)
    }

    /// Fresh library state using the configured default layout.
    pub fn library(&self) -> Result<LibraryState, StoreError> {
        let mut state = LibraryState::new(self.settings_engine.get_settings().library.default_view);
        state.refresh(&self.repository())?;
        Ok(state)
    }
}

/// Loads settings from the default (or overridden) path, tolerating a missing file.
pub fn load_settings(path_override: Option<String>) -> Result<SettingsEngine, Box<dyn std::error::Error>> {
    let mut engine = SettingsEngine::new(path_override);
    engine.load()?;
    Ok(engine)
}

/// Installs the `tracing` subscriber on stderr; `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
