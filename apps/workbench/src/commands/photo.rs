//! # Photo Actions
//!
//! Upload, remove and reorder product photos.
//!
//! ## Upload Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  upload_photo(product_id, file)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_photo_upload (count ≤ 10, image/*, ≤ 5 MiB)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  storage.upload("products/{id}-{ms}-{suffix}.{ext}") ──► public URL    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  photos().add(product_id, url) ──► fails? remove the file again        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store: product's photos replaced with the fresh list                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Photos for a product that is not saved yet are staged under a `temp`
//! path with [`stage_photo`] and attached after the save with
//! [`attach_photos`].

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use hpp_core::photos::{move_photo as move_in_list, photo_storage_path, storage_path_from_url};
use hpp_core::validation::validate_photo_upload;
use hpp_core::{CoreError, NewPhoto, ProductPhoto};

use super::record;
use crate::error::ApiResult;
use crate::state::{CatalogStore, DbState};

/// A file picked for upload.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Checks and stores the file, returning the row to attach.
async fn store_file(
    db: &DbState,
    product_id: Option<&str>,
    upload: &PhotoUpload,
    current_count: usize,
) -> ApiResult<NewPhoto> {
    validate_photo_upload(
        &upload.file_name,
        &upload.mime_type,
        upload.bytes.len() as u64,
        current_count,
    )
    .map_err(CoreError::from)?;

    let path = photo_storage_path(
        product_id,
        &upload.file_name,
        Utc::now().timestamp_millis(),
        &random_suffix(),
    );
    let photo_url = db.photo_storage().upload(&path, &upload.bytes).await?;

    Ok(NewPhoto {
        photo_url,
        file_name: Some(upload.file_name.clone()),
        file_size: Some(upload.bytes.len() as i64),
        mime_type: Some(upload.mime_type.clone()),
    })
}

/// Removes a stored file; failures are only logged.
async fn remove_file(db: &DbState, photo_url: &str) {
    let Some(path) = storage_path_from_url(photo_url) else {
        warn!(url = %photo_url, "Photo URL has no storage path, skipping");
        return;
    };
    if let Err(e) = db.photo_storage().delete(&path).await {
        warn!(path = %path, error = %e, "Failed to remove photo file");
    }
}

/// Replaces a product's photos in the store.
async fn sync_store(store: &CatalogStore, product_id: &str, photos: &[ProductPhoto]) {
    let mut products = store.products.write().await;
    if let Some(product) = products.items.iter_mut().find(|p| p.id == product_id) {
        product.photos = photos.to_vec();
    }
}

/// Uploads a photo and appends it to a saved product's gallery.
pub async fn upload_photo(
    db: &DbState,
    store: &CatalogStore,
    product_id: &str,
    upload: &PhotoUpload,
) -> ApiResult<ProductPhoto> {
    let current = db.inner().photos().list_by_product(product_id).await?;
    let new_photo = store_file(db, Some(product_id), upload, current.len()).await?;

    let added = match db.inner().photos().add(product_id, &new_photo).await {
        Ok(photo) => photo,
        Err(e) => {
            remove_file(db, &new_photo.photo_url).await;
            return record(&store.products, Err(e)).await;
        }
    };

    let photos = db.inner().photos().list_by_product(product_id).await?;
    sync_store(store, product_id, &photos).await;

    info!(product_id = %product_id, photo_id = %added.id, "Photo uploaded");
    Ok(added)
}

/// Uploads a photo for a product that has not been saved yet.
///
/// `staged_count` is how many photos are already staged for the same form.
pub async fn stage_photo(
    db: &DbState,
    upload: &PhotoUpload,
    staged_count: usize,
) -> ApiResult<NewPhoto> {
    store_file(db, None, upload, staged_count).await
}

/// Appends staged photos to a saved product, in the given order.
pub async fn attach_photos(
    db: &DbState,
    store: &CatalogStore,
    product_id: &str,
    staged: &[NewPhoto],
) -> ApiResult<Vec<ProductPhoto>> {
    for photo in staged {
        let result = db.inner().photos().add(product_id, photo).await;
        record(&store.products, result).await?;
    }

    let photos = db.inner().photos().list_by_product(product_id).await?;
    sync_store(store, product_id, &photos).await;
    Ok(photos)
}

/// Deletes one photo row and its file; the remaining photos close the gap.
pub async fn delete_photo(
    db: &DbState,
    store: &CatalogStore,
    photo_id: &str,
) -> ApiResult<Vec<ProductPhoto>> {
    let result = db.inner().photos().delete(photo_id).await;
    let deleted = record(&store.products, result).await?;

    remove_file(db, &deleted.photo_url).await;

    let photos = db
        .inner()
        .photos()
        .list_by_product(&deleted.product_id)
        .await?;
    sync_store(store, &deleted.product_id, &photos).await;
    Ok(photos)
}

/// Puts a product's photos in the given order.
pub async fn reorder_photos(
    db: &DbState,
    store: &CatalogStore,
    product_id: &str,
    ordered_ids: &[String],
) -> ApiResult<Vec<ProductPhoto>> {
    let result = db.inner().photos().reorder(product_id, ordered_ids).await;
    let photos = record(&store.products, result).await?;

    sync_store(store, product_id, &photos).await;
    Ok(photos)
}

/// Moves the photo at position `from` to position `to`.
pub async fn move_photo(
    db: &DbState,
    store: &CatalogStore,
    product_id: &str,
    from: usize,
    to: usize,
) -> ApiResult<Vec<ProductPhoto>> {
    let mut photos = db.inner().photos().list_by_product(product_id).await?;
    if !move_in_list(&mut photos, from, to) {
        return Ok(photos);
    }

    let ordered_ids: Vec<String> = photos.iter().map(|p| p.id.clone()).collect();
    reorder_photos(db, store, product_id, &ordered_ids).await
}

#[cfg(test)]
mod tests {
    use super::super::product::{fetch_products, save_product};
    use super::super::test_support::{category, fixture, material, Fixture};
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::ProductEditor;
    use hpp_core::{MAX_PHOTO_SIZE_BYTES, MAX_PRODUCT_PHOTOS};

    async fn product_id(fx: &Fixture) -> String {
        let kain = category(fx, "Kain").await;
        let katun = material(fx, &kain.id, "Katun", "10000").await;
        let mut editor = ProductEditor::new_product(20.0, 30.0);
        editor.set_name("Tas");
        let line = editor.add_line();
        editor.select_material(line, &katun);
        save_product(&fx.db, &fx.store, &editor).await.unwrap().id
    }

    fn jpeg(name: &str) -> PhotoUpload {
        PhotoUpload {
            file_name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    fn stored_path(fx: &Fixture, photo: &ProductPhoto) -> std::path::PathBuf {
        let path = storage_path_from_url(&photo.photo_url).unwrap();
        fx.photo_root.join(path)
    }

    #[tokio::test]
    async fn test_upload_stores_file_and_row() {
        let fx = fixture().await;
        let pid = product_id(&fx).await;

        let photo = upload_photo(&fx.db, &fx.store, &pid, &jpeg("Depan.JPG"))
            .await
            .unwrap();

        assert_eq!(photo.display_order, 0);
        assert_eq!(photo.file_size, Some(3));
        assert!(photo.photo_url.ends_with(".jpg"));
        assert!(photo.photo_url.contains(&format!("/product-images/products/{}-", pid)));
        assert!(stored_path(&fx, &photo).exists());

        let cached = fx.store.product(&pid).await.unwrap();
        assert_eq!(cached.photos.len(), 1);
        assert_eq!(cached.cover_photo().map(|p| p.id.as_str()), Some(photo.id.as_str()));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_and_large_files() {
        let fx = fixture().await;
        let pid = product_id(&fx).await;

        let mut pdf = jpeg("nota.pdf");
        pdf.mime_type = "application/pdf".to_string();
        let err = upload_photo(&fx.db, &fx.store, &pid, &pdf).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("must be an image"));

        let mut big = jpeg("besar.jpg");
        big.bytes = vec![0; MAX_PHOTO_SIZE_BYTES as usize + 1];
        assert!(upload_photo(&fx.db, &fx.store, &pid, &big).await.is_err());

        assert!(fx.db.inner().photos().list_by_product(&pid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_limit_per_product() {
        let fx = fixture().await;
        let pid = product_id(&fx).await;

        for i in 0..MAX_PRODUCT_PHOTOS {
            upload_photo(&fx.db, &fx.store, &pid, &jpeg(&format!("{}.jpg", i)))
                .await
                .unwrap();
        }

        let err = upload_photo(&fx.db, &fx.store, &pid, &jpeg("extra.jpg"))
            .await
            .unwrap_err();
        assert!(err.message.contains("At most 10 photos"));
    }

    #[tokio::test]
    async fn test_upload_to_missing_product_removes_file() {
        let fx = fixture().await;

        let err = upload_photo(&fx.db, &fx.store, "ghost", &jpeg("a.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let leftovers = std::fs::read_dir(fx.photo_root.join("products"))
            .map(|dir| dir.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_stage_then_attach() {
        let fx = fixture().await;
        let first = stage_photo(&fx.db, &jpeg("a.png"), 0).await.unwrap();
        let second = stage_photo(&fx.db, &jpeg("b.png"), 1).await.unwrap();
        assert!(first.photo_url.contains("/products/temp-"));

        let pid = product_id(&fx).await;
        let photos = attach_photos(&fx.db, &fx.store, &pid, &[first, second])
            .await
            .unwrap();

        let orders: Vec<i64> = photos.iter().map(|p| p.display_order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(photos[0].file_name.as_deref(), Some("a.png"));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_closes_gap() {
        let fx = fixture().await;
        let pid = product_id(&fx).await;
        let a = upload_photo(&fx.db, &fx.store, &pid, &jpeg("a.jpg")).await.unwrap();
        let b = upload_photo(&fx.db, &fx.store, &pid, &jpeg("b.jpg")).await.unwrap();

        let remaining = delete_photo(&fx.db, &fx.store, &a.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
        assert_eq!(remaining[0].display_order, 0);
        assert!(!stored_path(&fx, &a).exists());

        // A file that is already gone does not block the row delete.
        std::fs::remove_file(stored_path(&fx, &b)).unwrap();
        assert!(delete_photo(&fx.db, &fx.store, &b.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_and_reorder() {
        let fx = fixture().await;
        let pid = product_id(&fx).await;
        fetch_products(&fx.db, &fx.store).await.unwrap();

        let mut ids = Vec::new();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            ids.push(upload_photo(&fx.db, &fx.store, &pid, &jpeg(name)).await.unwrap().id);
        }

        let moved = move_photo(&fx.db, &fx.store, &pid, 2, 0).await.unwrap();
        let order: Vec<&str> = moved.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec![ids[2].as_str(), ids[0].as_str(), ids[1].as_str()]);
        assert_eq!(
            moved.iter().map(|p| p.display_order).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let unchanged = move_photo(&fx.db, &fx.store, &pid, 7, 0).await.unwrap();
        assert_eq!(unchanged.len(), 3);

        let reordered = reorder_photos(&fx.db, &fx.store, &pid, &[ids[1].clone()])
            .await
            .unwrap();
        assert_eq!(reordered[0].id, ids[1]);

        let cached = fx.store.product(&pid).await.unwrap();
        assert_eq!(cached.photos[0].id, ids[1]);
    }

    #[tokio::test]
    async fn test_delete_product_removes_photo_files() {
        let fx = fixture().await;
        let pid = product_id(&fx).await;
        let photo = upload_photo(&fx.db, &fx.store, &pid, &jpeg("a.jpg")).await.unwrap();

        super::super::product::delete_product(&fx.db, &fx.store, &pid)
            .await
            .unwrap();

        assert!(!stored_path(&fx, &photo).exists());
        assert!(fx.db.inner().photos().list_by_product(&pid).await.unwrap().is_empty());
    }
}
