//! # Database State
//!
//! Wraps the `Database` handle and the photo storage for use in actions.
//!
//! ## Thread Safety
//! `Database` holds a `SqlitePool`, which is safe to share. The photo
//! storage is behind an `Arc<dyn PhotoStorage>`, so the whole state can be
//! cloned into spawned tasks.
//!
//! ## Usage in Actions
//! ```rust,ignore
//! async fn fetch_categories(db: &DbState, store: &CatalogStore) -> ApiResult<Vec<Category>> {
//!     let categories = db.inner().categories().list().await?;
//!     ...
//! }
//! ```

use std::sync::Arc;

use hpp_db::{Database, LocalPhotoStorage, PhotoStorage};

/// Database plus photo storage.
#[derive(Clone)]
pub struct DbState {
    db: Database,
    photos: Arc<dyn PhotoStorage>,
}

impl DbState {
    pub fn new(db: Database, photos: Arc<dyn PhotoStorage>) -> Self {
        DbState { db, photos }
    }

    /// Database with photos on the local filesystem.
    pub fn with_local_photos(db: Database, photos: LocalPhotoStorage) -> Self {
        Self::new(db, Arc::new(photos))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub fn photo_storage(&self) -> &dyn PhotoStorage {
        self.photos.as_ref()
    }
}

impl std::fmt::Debug for DbState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbState").field("db", &self.db).finish_non_exhaustive()
    }
}
