//! # Photo Repository
//!
//! Database rows for product photo galleries.
//!
//! Every write leaves a product's `display_order` values contiguous from 0.
//! Writes that touch more than one row run in a transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use hpp_core::photos::{renumber, sort_by_display_order};
use hpp_core::{CoreError, NewPhoto, ProductPhoto};

use super::generate_id;
use crate::error::{DbError, DbResult};

const SELECT_PHOTO: &str = r#"
    SELECT
        id, product_id, photo_url, display_order,
        file_name, file_size, mime_type, created_at
    FROM product_photos
"#;

/// Repository for product photo rows.
#[derive(Debug, Clone)]
pub struct PhotoRepository {
    pool: SqlitePool,
}

impl PhotoRepository {
    /// Creates a new PhotoRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PhotoRepository { pool }
    }

    /// Photos of a product in display order.
    pub async fn list_by_product(&self, product_id: &str) -> DbResult<Vec<ProductPhoto>> {
        let mut conn = self.pool.acquire().await?;
        list_in(&mut conn, product_id).await
    }

    /// Appends a photo after the product's current last photo.
    pub async fn add(&self, product_id: &str, photo: &NewPhoto) -> DbResult<ProductPhoto> {
        let mut tx = self.pool.begin().await?;

        let next_order: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM product_photos WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        let added = insert_in(&mut tx, product_id, photo, next_order).await?;
        tx.commit().await?;

        debug!(product_id = %product_id, order = next_order, "Added photo");
        Ok(added)
    }

    /// Deletes one photo row, closes the gap in the order and returns the
    /// deleted row so its file can be removed.
    pub async fn delete(&self, photo_id: &str) -> DbResult<ProductPhoto> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{} WHERE id = ?1", SELECT_PHOTO);
        let photo = sqlx::query_as::<_, ProductPhoto>(&sql)
            .bind(photo_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Photo", photo_id))?;

        sqlx::query("DELETE FROM product_photos WHERE id = ?1")
            .bind(photo_id)
            .execute(&mut *tx)
            .await?;

        let mut remaining = list_in(&mut tx, &photo.product_id).await?;
        write_order(&mut tx, &mut remaining).await?;

        tx.commit().await?;

        debug!(id = %photo_id, product_id = %photo.product_id, "Deleted photo");
        Ok(photo)
    }

    /// Puts photos in the order of `ordered_ids`, renumbering from 0.
    ///
    /// Photos of the product missing from `ordered_ids` keep their relative
    /// order after the listed ones; ids of other products are ignored.
    pub async fn reorder(
        &self,
        product_id: &str,
        ordered_ids: &[String],
    ) -> DbResult<Vec<ProductPhoto>> {
        let mut tx = self.pool.begin().await?;

        let current = list_in(&mut tx, product_id).await?;

        let mut ordered: Vec<ProductPhoto> = ordered_ids
            .iter()
            .filter_map(|id| current.iter().find(|p| &p.id == id).cloned())
            .collect();
        for photo in &current {
            if !ordered.iter().any(|p| p.id == photo.id) {
                ordered.push(photo.clone());
            }
        }

        write_order(&mut tx, &mut ordered).await?;
        tx.commit().await?;

        debug!(product_id = %product_id, count = ordered.len(), "Reordered photos");
        Ok(ordered)
    }

    /// Replaces the whole gallery with `photos`, in the given order.
    pub async fn replace_all(
        &self,
        product_id: &str,
        photos: &[NewPhoto],
    ) -> DbResult<Vec<ProductPhoto>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_photos WHERE product_id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            saved.push(insert_in(&mut tx, product_id, photo, index as i64).await?);
        }

        tx.commit().await?;

        debug!(product_id = %product_id, count = saved.len(), "Replaced photos");
        Ok(saved)
    }
}

async fn list_in(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Vec<ProductPhoto>> {
    let sql = format!(
        "{} WHERE product_id = ?1 ORDER BY display_order, created_at",
        SELECT_PHOTO
    );
    let mut photos = sqlx::query_as::<_, ProductPhoto>(&sql)
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

    sort_by_display_order(&mut photos);
    Ok(photos)
}

async fn insert_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    photo: &NewPhoto,
    display_order: i64,
) -> DbResult<ProductPhoto> {
    let saved = ProductPhoto {
        id: generate_id(),
        product_id: product_id.to_string(),
        photo_url: photo.photo_url.clone(),
        display_order,
        file_name: photo.file_name.clone(),
        file_size: photo.file_size,
        mime_type: photo.mime_type.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO product_photos (
            id, product_id, photo_url, display_order,
            file_name, file_size, mime_type, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&saved.id)
    .bind(&saved.product_id)
    .bind(&saved.photo_url)
    .bind(saved.display_order)
    .bind(&saved.file_name)
    .bind(saved.file_size)
    .bind(&saved.mime_type)
    .bind(saved.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        let err = DbError::from(e);
        if err.is_foreign_key_violation() {
            DbError::from(CoreError::ProductNotFound(product_id.to_string()))
        } else {
            err
        }
    })?;

    Ok(saved)
}

/// Renumbers `photos` by position and writes every order back.
async fn write_order(conn: &mut SqliteConnection, photos: &mut [ProductPhoto]) -> DbResult<()> {
    renumber(photos);
    for photo in photos.iter() {
        sqlx::query("UPDATE product_photos SET display_order = ?2 WHERE id = ?1")
            .bind(&photo.id)
            .bind(photo.display_order)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{category, material, memory_db};
    use super::*;
    use crate::storage::{LocalPhotoStorage, PhotoStorage};
    use crate::Database;
    use hpp_core::photos::photo_storage_path;
    use hpp_core::{BomLine, ProductDraft};

    async fn product_id(db: &Database) -> String {
        let kain = category(db, "Kain").await;
        let katun = material(db, &kain.id, "Katun", 10_000.0).await;
        db.products()
            .insert(&ProductDraft {
                name: "Tas".to_string(),
                description: None,
                overhead_percentage: 20.0,
                target_margin_percentage: 30.0,
                bom: vec![BomLine::from_material(&katun, 1.0)],
            })
            .await
            .unwrap()
            .id
    }

    fn new_photo(name: &str) -> NewPhoto {
        NewPhoto {
            photo_url: format!("http://localhost/product-images/products/{}", name),
            file_name: Some(name.to_string()),
            file_size: Some(1024),
            mime_type: Some("image/jpeg".to_string()),
        }
    }

    fn orders(photos: &[ProductPhoto]) -> Vec<i64> {
        photos.iter().map(|p| p.display_order).collect()
    }

    #[tokio::test]
    async fn test_add_appends_in_order() {
        let db = memory_db().await;
        let pid = product_id(&db).await;

        let a = db.photos().add(&pid, &new_photo("a.jpg")).await.unwrap();
        let b = db.photos().add(&pid, &new_photo("b.jpg")).await.unwrap();
        assert_eq!(a.display_order, 0);
        assert_eq!(b.display_order, 1);

        let listed = db.photos().list_by_product(&pid).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a.id);
    }

    #[tokio::test]
    async fn test_add_to_missing_product() {
        let db = memory_db().await;
        let err = db.photos().add("ghost", &new_photo("a.jpg")).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_closes_gap() {
        let db = memory_db().await;
        let pid = product_id(&db).await;
        let _a = db.photos().add(&pid, &new_photo("a.jpg")).await.unwrap();
        let b = db.photos().add(&pid, &new_photo("b.jpg")).await.unwrap();
        let c = db.photos().add(&pid, &new_photo("c.jpg")).await.unwrap();

        let deleted = db.photos().delete(&b.id).await.unwrap();
        assert_eq!(deleted.id, b.id);

        let listed = db.photos().list_by_product(&pid).await.unwrap();
        assert_eq!(orders(&listed), vec![0, 1]);
        assert_eq!(listed[1].id, c.id);

        assert!(db.photos().delete(&b.id).await.is_err());
    }

    #[tokio::test]
    async fn test_reorder_renumbers_contiguously() {
        let db = memory_db().await;
        let pid = product_id(&db).await;
        let a = db.photos().add(&pid, &new_photo("a.jpg")).await.unwrap();
        let b = db.photos().add(&pid, &new_photo("b.jpg")).await.unwrap();
        let c = db.photos().add(&pid, &new_photo("c.jpg")).await.unwrap();

        let reordered = db
            .photos()
            .reorder(&pid, &[c.id.clone(), a.id.clone(), "stranger".to_string()])
            .await
            .unwrap();

        let ids: Vec<&str> = reordered.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![c.id.as_str(), a.id.as_str(), b.id.as_str()]);

        let listed = db.photos().list_by_product(&pid).await.unwrap();
        assert_eq!(orders(&listed), vec![0, 1, 2]);
        assert_eq!(listed[0].id, c.id);
    }

    #[tokio::test]
    async fn test_replace_all() {
        let db = memory_db().await;
        let pid = product_id(&db).await;
        db.photos().add(&pid, &new_photo("old.jpg")).await.unwrap();

        let saved = db
            .photos()
            .replace_all(&pid, &[new_photo("x.jpg"), new_photo("y.jpg")])
            .await
            .unwrap();
        assert_eq!(orders(&saved), vec![0, 1]);

        let listed = db.photos().list_by_product(&pid).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].file_name.as_deref(), Some("x.jpg"));
    }

    #[tokio::test]
    async fn test_delete_product_removes_files_then_rows() {
        let db = memory_db().await;
        let pid = product_id(&db).await;
        let root = std::env::temp_dir().join(format!("hpp-photos-{}", uuid::Uuid::new_v4()));
        let storage = LocalPhotoStorage::new(&root, "http://localhost/files");

        let path = photo_storage_path(Some(&pid), "tas.jpg", 1, "abc");
        let url = storage.upload(&path, b"bytes").await.unwrap();
        db.photos()
            .add(
                &pid,
                &NewPhoto {
                    photo_url: url,
                    file_name: Some("tas.jpg".to_string()),
                    file_size: Some(5),
                    mime_type: Some("image/jpeg".to_string()),
                },
            )
            .await
            .unwrap();
        // A row whose file is already gone must not block the delete.
        db.photos().add(&pid, &new_photo("missing.jpg")).await.unwrap();

        db.delete_product(&pid, &storage).await.unwrap();

        assert!(!root.join(&path).exists());
        assert!(db.products().get_by_id(&pid).await.unwrap().is_none());
        assert!(db.photos().list_by_product(&pid).await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&root);
    }
}
