//! Bookmark Manager for Markwise.
//!
//! Implements `BookmarkRepositoryTrait`: list, create, update, and remove over
//! the whole collection. Every mutation is a read-modify-write through the
//! persistence store, so the stored collection always equals the last
//! completed mutation.

use crate::services::storage_service::BookmarkStoreTrait;
use crate::types::bookmark::Bookmark;
use crate::types::errors::StoreError;

/// Trait defining bookmark repository operations.
pub trait BookmarkRepositoryTrait {
    fn list(&self) -> Result<Vec<Bookmark>, StoreError>;
    /// Prepends `bookmark`. The caller guarantees a fresh `id`.
    fn create(&self, bookmark: Bookmark) -> Result<(), StoreError>;
    /// Replaces the entry with the same `id`; unknown ids leave the collection unchanged.
    fn update(&self, bookmark: Bookmark) -> Result<(), StoreError>;
    /// Drops the entry with `id`; unknown ids are a no-op.
    fn remove(&self, id: &str) -> Result<(), StoreError>;
    fn get(&self, id: &str) -> Result<Option<Bookmark>, StoreError> {
        Ok(self.list()?.into_iter().find(|b| b.id == id))
    }
}

/// Repository facade over a collection store.
pub struct BookmarkManager<'a> {
    store: &'a dyn BookmarkStoreTrait,
}

impl<'a> BookmarkManager<'a> {
    pub fn new(store: &'a dyn BookmarkStoreTrait) -> Self {
        Self { store }
    }
}

impl<'a> BookmarkRepositoryTrait for BookmarkManager<'a> {
    fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        self.store.load()
    }

    fn create(&self, bookmark: Bookmark) -> Result<(), StoreError> {
        let mut bookmarks = self.list()?;
        tracing::info!(id = %bookmark.id, url = %bookmark.url, "creating bookmark");
        bookmarks.insert(0, bookmark);
        self.store.save(&bookmarks)
    }

    fn update(&self, bookmark: Bookmark) -> Result<(), StoreError> {
        let mut bookmarks = self.list()?;
        match bookmarks.iter_mut().find(|b| b.id == bookmark.id) {
            Some(slot) => {
                tracing::info!(id = %bookmark.id, "updating bookmark");
                *slot = bookmark;
            }
            None => tracing::debug!(id = %bookmark.id, "update for unknown id ignored"),
        }
        self.store.save(&bookmarks)
    }

    fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut bookmarks = self.list()?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != id);
        if bookmarks.len() != before {
            tracing::info!(id, "removed bookmark");
        }
        self.store.save(&bookmarks)
    }
}
