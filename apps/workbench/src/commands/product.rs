//! # Product Actions
//!
//! Loading, saving and deleting products, and opening product editors.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    save_product(editor)                                 │
//! │                                                                         │
//! │  editor.is_simulation()? ──► refuse, nothing is written                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  editor.validate(store products) ──► FieldErrors? ──► ApiError         │
//! │       │                                                                 │
//! │       ▼  ProductDraft (costing computed once, from the draft)          │
//! │  mode New / Copy ──► products().insert(draft)                          │
//! │  mode Edit { id } ──► products().update(id, draft)                     │
//! │       │              (BoM lines replaced in one transaction)            │
//! │       ▼                                                                 │
//! │  store: upsert, newest first                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use hpp_core::forms::ProductFormMode;
use hpp_core::Product;

use super::{ensure_loaded, load, record};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::{CatalogStore, DbState, ProductEditor};

/// Loads all products, newest first, into the store.
pub async fn fetch_products(db: &DbState, store: &CatalogStore) -> ApiResult<Vec<Product>> {
    load(&store.products, db.inner().products().list()).await
}

/// Reads one product from the database and refreshes it in the store.
pub async fn get_product(db: &DbState, store: &CatalogStore, id: &str) -> ApiResult<Product> {
    let result = db.inner().products().get_by_id(id).await;
    let product = record(&store.products, result)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    store.products.write().await.upsert(product.clone(), true);
    Ok(product)
}

// ===== Editors =====

/// Editor for a new product, using the configured default percentages.
pub fn new_product_editor(config: &AppConfig) -> ProductEditor {
    ProductEditor::new_product(
        config.costing.default_overhead_percentage,
        config.costing.default_target_margin_percentage,
    )
}

pub async fn edit_product(db: &DbState, store: &CatalogStore, id: &str) -> ApiResult<ProductEditor> {
    let product = get_product(db, store, id).await?;
    Ok(ProductEditor::edit(&product))
}

pub async fn copy_product(db: &DbState, store: &CatalogStore, id: &str) -> ApiResult<ProductEditor> {
    let product = get_product(db, store, id).await?;
    Ok(ProductEditor::copy(&product))
}

/// Editor for trying prices on a saved product; it cannot be saved.
pub async fn simulate_product(
    db: &DbState,
    store: &CatalogStore,
    id: &str,
) -> ApiResult<ProductEditor> {
    let product = get_product(db, store, id).await?;
    Ok(ProductEditor::simulate(&product))
}

// ===== Writes =====

/// Validates the editor and inserts or updates the product.
pub async fn save_product(
    db: &DbState,
    store: &CatalogStore,
    editor: &ProductEditor,
) -> ApiResult<Product> {
    if editor.is_simulation() {
        return Err(ApiError::new(
            ErrorCode::BusinessLogic,
            "Price simulations are not saved",
        ));
    }

    ensure_loaded(&store.products, db.inner().products().list()).await?;
    let existing = store.products().await;
    let draft = editor.validate(&existing)?;

    let result = match editor.mode() {
        ProductFormMode::Edit { id } => db.inner().products().update(id, &draft).await,
        ProductFormMode::New | ProductFormMode::Copy { .. } => {
            db.inner().products().insert(&draft).await
        }
    };
    let product = record(&store.products, result).await?;

    store.products.write().await.upsert(product.clone(), true);

    info!(
        id = %product.id,
        name = %product.name,
        production_cost = product.costing.production_cost.rupiah(),
        "Product saved"
    );
    Ok(product)
}

/// Deletes a product, its BoM lines, its photo rows and its photo files.
///
/// Photo files that cannot be removed are logged and do not stop the delete.
pub async fn delete_product(db: &DbState, store: &CatalogStore, id: &str) -> ApiResult<()> {
    let result = db.inner().delete_product(id, db.photo_storage()).await;
    record(&store.products, result).await?;

    store.products.write().await.remove(id);

    debug!(id = %id, "Product deleted");
    Ok(())
}
