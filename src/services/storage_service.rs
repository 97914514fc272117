//! Persistence store for the bookmark collection.
//!
//! The whole collection lives as one JSON array in a single named slot. Every
//! save overwrites the slot; there is no merge and no versioning.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::database::connection::Database;
use crate::types::bookmark::Bookmark;
use crate::types::errors::StoreError;

/// Slot holding the serialized collection.
pub const STORAGE_KEY: &str = "markwise_bookmarks";

/// Trait defining the durable collection store.
pub trait BookmarkStoreTrait {
    /// Returns the stored collection, seeding the demonstration data on first run.
    fn load(&self) -> Result<Vec<Bookmark>, StoreError>;
    /// Replaces the stored collection.
    fn save(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError>;
}

/// Collection store backed by a key-value slot in the SQLite database.
pub struct BookmarkStore {
    db: Arc<Database>,
}

impl BookmarkStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl BookmarkStoreTrait for BookmarkStore {
    fn load(&self) -> Result<Vec<Bookmark>, StoreError> {
        let raw = self.db.read_slot(STORAGE_KEY)?;

        match raw {
            Some(data) if !data.is_empty() => {
                let bookmarks: Vec<Bookmark> = serde_json::from_str(&data).map_err(|e| {
                    tracing::error!(error = %e, key = STORAGE_KEY, "stored collection failed to decode");
                    StoreError::CorruptStore(e.to_string())
                })?;
                tracing::debug!(count = bookmarks.len(), "loaded bookmark collection");
                Ok(bookmarks)
            }
            _ => {
                let seed = seed_bookmarks(Utc::now());
                self.save(&seed)?;
                tracing::info!(count = seed.len(), "seeded empty store with demonstration bookmarks");
                Ok(seed)
            }
        }
    }

    fn save(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError> {
        let json = serde_json::to_string(bookmarks)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.db.write_slot(STORAGE_KEY, &json)?;
        tracing::debug!(count = bookmarks.len(), "saved bookmark collection");
        Ok(())
    }
}

/// Built-in demonstration collection written on first run.
pub fn seed_bookmarks(now: DateTime<Utc>) -> Vec<Bookmark> {
    vec![
        Bookmark {
            id: "1".to_string(),
            url: "https://react.dev".to_string(),
            title: "React - The Library for Web and Native User Interfaces".to_string(),
            description: "The official documentation for React.".to_string(),
            ai_summary: "React 是一個用於構建使用者介面的 JavaScript 庫。它允許開發者透過組件化的方式建立複雜的 UI，並提供了宣告式的語法，讓程式碼更易於理解和除錯。React 還支援跨平台開發，可用於 Web 和原生應用程式。".to_string(),
            ai_key_points: vec![
                "組件化架構".to_string(),
                "宣告式語法".to_string(),
                "跨平台支援".to_string(),
            ],
            ai_category: "Technology".to_string(),
            ai_tags: vec![
                "React".to_string(),
                "JavaScript".to_string(),
                "Frontend".to_string(),
            ],
            og_image: None,
            favicon: Some("https://react.dev/favicon.ico".to_string()),
            is_public: true,
            is_archived: false,
            is_favorite: true,
            created_at: now - Duration::seconds(10_000),
        },
        Bookmark {
            id: "2".to_string(),
            url: "https://tailwindcss.com".to_string(),
            title: "Tailwind CSS - Rapidly build modern websites without ever leaving your HTML."
                .to_string(),
            description: "A utility-first CSS framework packed with classes.".to_string(),
            ai_summary: "Tailwind CSS 是一個功能優先的 CSS 框架，它提供了大量的 utility class，讓開發者可以直接在 HTML 中快速構建現代化的網站設計。它不需要離開 HTML 檔案即可完成樣式設定，極大地提高了開發效率。".to_string(),
            ai_key_points: vec![
                "Utility-first".to_string(),
                "高度可客製化".to_string(),
                "響應式設計".to_string(),
            ],
            ai_category: "Design".to_string(),
            ai_tags: vec![
                "CSS".to_string(),
                "Tailwind".to_string(),
                "Design".to_string(),
            ],
            og_image: None,
            favicon: Some("https://tailwindcss.com/favicons/favicon.ico".to_string()),
            is_public: true,
            is_archived: false,
            is_favorite: false,
            created_at: now - Duration::seconds(5_000),
        },
    ]
}
