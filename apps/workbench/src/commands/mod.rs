//! # Actions
//!
//! Typed actions that change the database and keep the [`CatalogStore`] in
//! step with it.
//!
//! ## Action Categories
//!
//! ### Category Actions
//! - `fetch_categories`, `create_category`, `update_category`, `delete_category`
//!
//! ### Material Actions
//! - `fetch_materials`, `create_material`, `update_material`, `delete_material`
//!
//! ### Product Actions
//! - `fetch_products`, `get_product`, `save_product`, `delete_product`
//! - `edit_product`, `copy_product`, `simulate_product` open a [`ProductEditor`]
//!
//! ### Photo Actions
//! - `upload_photo`, `stage_photo`, `attach_photos`, `delete_photo`,
//!   `reorder_photos`, `move_photo`
//!
//! ### Dashboard
//! - `dashboard_summary`, `search_products`, `search_materials`, `material_picker`
//!
//! ## Store Rules
//! ```text
//! fetch_*    loading = true ──► list() ──► items replaced, loading = false
//!                                     └──► last_error = message, items kept
//! create_*   form checks ──► insert() ──► item upserted
//! update_*   form checks ──► update() ──► item upserted
//! delete_*   delete() ──► item removed
//! ```
//! Create, update and save actions first fetch a collection that was never
//! loaded, so name checks always see the saved rows.
//! Form failures come back as field errors and leave the store untouched;
//! database failures are also recorded as the collection's `last_error`.
//!
//! [`ProductEditor`]: crate::state::ProductEditor

pub mod category;
pub mod dashboard;
pub mod material;
pub mod photo;
pub mod product;

use std::future::Future;

use tokio::sync::RwLock;
use tracing::{info, warn};

use hpp_core::validation::Named;
use hpp_db::DbResult;

use crate::error::{ApiError, ApiResult};
use crate::state::{CatalogStore, Collection, ConnectionStatus, DbState};

/// Runs a list query as a fetch of `collection`.
pub(crate) async fn load<T, F>(collection: &RwLock<Collection<T>>, fetch: F) -> ApiResult<Vec<T>>
where
    T: Named + Clone,
    F: Future<Output = DbResult<Vec<T>>>,
{
    collection.write().await.begin_load();

    match fetch.await {
        Ok(items) => {
            collection.write().await.finish_load(items.clone());
            Ok(items)
        }
        Err(e) => {
            let err = ApiError::from(e);
            collection.write().await.fail(err.message.clone());
            Err(err)
        }
    }
}

/// Fetches `collection` when no fetch has succeeded yet.
///
/// Form checks compare names against the store, so they need the saved
/// items even when an action runs before `refresh_all`.
pub(crate) async fn ensure_loaded<T, F>(collection: &RwLock<Collection<T>>, fetch: F) -> ApiResult<()>
where
    T: Named + Clone,
    F: Future<Output = DbResult<Vec<T>>>,
{
    if collection.read().await.loaded {
        return Ok(());
    }
    load(collection, fetch).await.map(|_| ())
}

/// Converts a database result, recording a failure on `collection`.
pub(crate) async fn record<T, R>(collection: &RwLock<Collection<T>>, result: DbResult<R>) -> ApiResult<R>
where
    T: Named + Clone,
{
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            let err = ApiError::from(e);
            collection.write().await.fail(err.message.clone());
            Err(err)
        }
    }
}

/// Pings the database and records the result as the store's status.
pub async fn check_connection(db: &DbState, store: &CatalogStore) -> ConnectionStatus {
    store.set_status(ConnectionStatus::Checking).await;

    let status = if db.inner().health_check().await {
        ConnectionStatus::Connected
    } else {
        warn!("Database health check failed");
        ConnectionStatus::Error {
            message: "Database is not reachable".to_string(),
        }
    };

    store.set_status(status.clone()).await;
    status
}

/// Reloads every collection.
///
/// All three fetches run even when one fails; the first failure is returned.
pub async fn refresh_all(db: &DbState, store: &CatalogStore) -> ApiResult<()> {
    if !check_connection(db, store).await.is_connected() {
        return Err(ApiError::new(
            crate::error::ErrorCode::DatabaseError,
            "Database is not reachable",
        ));
    }

    let (categories, materials, products) = tokio::join!(
        category::fetch_categories(db, store),
        material::fetch_materials(db, store),
        product::fetch_products(db, store),
    );

    let categories = categories?;
    let materials = materials?;
    let products = products?;

    info!(
        categories = categories.len(),
        materials = materials.len(),
        products = products.len(),
        "Catalog refreshed"
    );
    Ok(())
}

/// Shared fixtures for action tests.
#[cfg(test)]
pub(crate) mod test_support {
    use hpp_core::forms::{CategoryForm, MaterialForm};
    use hpp_core::{Category, Material};
    use hpp_db::{Database, DbConfig, LocalPhotoStorage};

    use crate::state::{CatalogStore, DbState};

    pub struct Fixture {
        pub db: DbState,
        pub store: CatalogStore,
        pub photo_root: std::path::PathBuf,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.photo_root);
        }
    }

    pub async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let photo_root =
            std::env::temp_dir().join(format!("hpp-workbench-{}", uuid::Uuid::new_v4()));
        let storage = LocalPhotoStorage::new(&photo_root, "http://localhost:8080/files");

        Fixture {
            db: DbState::with_local_photos(db, storage),
            store: CatalogStore::new(),
            photo_root,
        }
    }

    pub async fn category(fx: &Fixture, name: &str) -> Category {
        super::category::create_category(
            &fx.db,
            &fx.store,
            &CategoryForm {
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn material(fx: &Fixture, category_id: &str, name: &str, price: &str) -> Material {
        super::material::create_material(
            &fx.db,
            &fx.store,
            &MaterialForm {
                name: name.to_string(),
                category_id: category_id.to_string(),
                standard_price: price.to_string(),
                unit: "Pcs".to_string(),
            },
        )
        .await
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::fixture;
    use super::*;

    #[tokio::test]
    async fn test_refresh_all_marks_connected() {
        let fx = fixture().await;
        fx.db
            .inner()
            .categories()
            .insert("Kain")
            .await
            .unwrap();

        refresh_all(&fx.db, &fx.store).await.unwrap();

        assert_eq!(fx.store.status().await, ConnectionStatus::Connected);
        assert_eq!(fx.store.categories().await.len(), 1);
        assert!(!fx.store.snapshot().await.categories.loading);
    }

    #[tokio::test]
    async fn test_closed_database_reports_error_status() {
        let fx = fixture().await;
        fx.db.inner().close().await;

        let err = refresh_all(&fx.db, &fx.store).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::DatabaseError);
        assert!(matches!(
            fx.store.status().await,
            ConnectionStatus::Error { .. }
        ));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_items_and_records_error() {
        let fx = fixture().await;
        fx.db.inner().categories().insert("Kain").await.unwrap();
        category::fetch_categories(&fx.db, &fx.store).await.unwrap();

        fx.db.inner().close().await;
        assert!(category::fetch_categories(&fx.db, &fx.store).await.is_err());

        let snapshot = fx.store.snapshot().await;
        assert_eq!(snapshot.categories.items.len(), 1);
        assert!(snapshot.categories.last_error.is_some());
        assert!(!snapshot.categories.loading);
    }
}
