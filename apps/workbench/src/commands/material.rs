//! # Material Actions
//!
//! Create, change and delete raw materials.
//!
//! Changing a material's standard price does not touch BoM lines that
//! already use it; those keep the price they were saved with.

use tracing::{debug, info};

use hpp_core::forms::{validate_material_form, MaterialForm};
use hpp_core::Material;

use super::{ensure_loaded, load, record};
use crate::error::ApiResult;
use crate::state::{CatalogStore, DbState};

/// Loads all materials, with category names, into the store.
pub async fn fetch_materials(db: &DbState, store: &CatalogStore) -> ApiResult<Vec<Material>> {
    load(&store.materials, db.inner().materials().list()).await
}

pub async fn create_material(
    db: &DbState,
    store: &CatalogStore,
    form: &MaterialForm,
) -> ApiResult<Material> {
    ensure_loaded(&store.materials, db.inner().materials().list()).await?;
    let existing = store.materials().await;
    let input = validate_material_form(form, &existing, None)?;

    let result = db.inner().materials().insert(&input).await;
    let material = record(&store.materials, result).await?;

    let mut materials = store.materials.write().await;
    materials.upsert(material.clone(), false);
    materials.sort_by_name();

    info!(id = %material.id, name = %material.name, "Material created");
    Ok(material)
}

pub async fn update_material(
    db: &DbState,
    store: &CatalogStore,
    id: &str,
    form: &MaterialForm,
) -> ApiResult<Material> {
    ensure_loaded(&store.materials, db.inner().materials().list()).await?;
    let existing = store.materials().await;
    let input = validate_material_form(form, &existing, Some(id))?;

    let result = db.inner().materials().update(id, &input).await;
    let material = record(&store.materials, result).await?;

    let mut materials = store.materials.write().await;
    materials.upsert(material.clone(), false);
    materials.sort_by_name();

    debug!(id = %id, "Material updated");
    Ok(material)
}

/// Deletes a material that no BoM line uses.
///
/// The error for a material in use carries the current line count.
pub async fn delete_material(db: &DbState, store: &CatalogStore, id: &str) -> ApiResult<()> {
    let result = db.inner().materials().delete(id).await;
    record(&store.materials, result).await?;

    store.materials.write().await.remove(id);

    info!(id = %id, "Material deleted");
    Ok(())
}
