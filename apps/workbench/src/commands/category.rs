//! # Category Actions
//!
//! Create, rename and delete material categories.
//!
//! A rename also refreshes `category_name` on the materials already in the
//! store, so material lists show the new name without a refetch.

use tracing::{debug, info};

use hpp_core::forms::{validate_category_form, CategoryForm};
use hpp_core::Category;

use super::{ensure_loaded, load, record};
use crate::error::ApiResult;
use crate::state::{CatalogStore, DbState};

/// Loads all categories into the store.
pub async fn fetch_categories(db: &DbState, store: &CatalogStore) -> ApiResult<Vec<Category>> {
    load(&store.categories, db.inner().categories().list()).await
}

pub async fn create_category(
    db: &DbState,
    store: &CatalogStore,
    form: &CategoryForm,
) -> ApiResult<Category> {
    ensure_loaded(&store.categories, db.inner().categories().list()).await?;
    let existing = store.categories().await;
    let name = validate_category_form(form, &existing, None)?;

    let result = db.inner().categories().insert(&name).await;
    let category = record(&store.categories, result).await?;

    let mut categories = store.categories.write().await;
    categories.upsert(category.clone(), false);
    categories.sort_by_name();

    info!(id = %category.id, name = %category.name, "Category created");
    Ok(category)
}

pub async fn update_category(
    db: &DbState,
    store: &CatalogStore,
    id: &str,
    form: &CategoryForm,
) -> ApiResult<Category> {
    ensure_loaded(&store.categories, db.inner().categories().list()).await?;
    let existing = store.categories().await;
    let name = validate_category_form(form, &existing, Some(id))?;

    let result = db.inner().categories().update(id, &name).await;
    let category = record(&store.categories, result).await?;

    {
        let mut categories = store.categories.write().await;
        categories.upsert(category.clone(), false);
        categories.sort_by_name();
    }

    let mut materials = store.materials.write().await;
    for material in materials.items.iter_mut().filter(|m| m.category_id == id) {
        material.category_name = Some(category.name.clone());
    }

    debug!(id = %id, "Category renamed");
    Ok(category)
}

/// Deletes a category that no material uses.
///
/// The error for a category in use carries the current material count.
pub async fn delete_category(db: &DbState, store: &CatalogStore, id: &str) -> ApiResult<()> {
    let result = db.inner().categories().delete(id).await;
    record(&store.categories, result).await?;

    store.categories.write().await.remove(id);

    info!(id = %id, "Category deleted");
    Ok(())
}
