//! # Category Repository
//!
//! Database operations for material categories.
//!
//! ## Guarded Delete
//! ```text
//! BEGIN
//!   SELECT name FROM categories WHERE id = ?      → CategoryNotFound if none
//!   SELECT COUNT(*) FROM materials WHERE category_id = ?
//!   count > 0 ?  → ROLLBACK, CategoryInUse { count }
//!   DELETE FROM categories WHERE id = ?
//! COMMIT
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use hpp_core::validation::ensure_category_deletable;
use hpp_core::{Category, CoreError};

use super::generate_id;
use crate::error::{DbError, DbResult};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            ORDER BY name COLLATE NOCASE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = categories.len(), "Listed categories");
        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category. `name` is stored trimmed.
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: generate_id(),
            name: name.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).name_taken(name))?;

        Ok(category)
    }

    /// Renames a category.
    pub async fn update(&self, id: &str, name: &str) -> DbResult<Category> {
        debug!(id = %id, "Updating category");

        let result = sqlx::query("UPDATE categories SET name = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name.trim())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).name_taken(name))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CategoryNotFound(id.to_string()).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(id.to_string()).into())
    }

    /// Number of materials in the category.
    pub async fn count_materials(&self, id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE category_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Deletes a category that no material references.
    ///
    /// ## Returns
    /// * `Err(CoreError::CategoryInUse)` - materials still reference it; the
    ///   error carries the current count
    /// * `Err(CoreError::CategoryNotFound)` - no such category
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let mut tx = self.pool.begin().await?;

        let name: Option<String> = sqlx::query_scalar("SELECT name FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let name = name.ok_or_else(|| CoreError::CategoryNotFound(id.to_string()))?;

        let material_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE category_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        ensure_category_deletable(&name, material_count)?;

        sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
