//! # Material Repository
//!
//! Database operations for raw materials.
//!
//! Every read joins the category so `Material::category_name` is filled in.
//! A material referenced by any BoM line cannot be deleted; the check and
//! the delete share one transaction (see [`MaterialRepository::delete`]).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use hpp_core::validation::ensure_material_deletable;
use hpp_core::{CoreError, Material, MaterialInput};

use super::generate_id;
use crate::error::{DbError, DbResult};

const SELECT_MATERIAL: &str = r#"
    SELECT
        m.id,
        m.name,
        m.category_id,
        c.name AS category_name,
        m.standard_price,
        m.unit,
        m.created_at,
        m.updated_at
    FROM materials m
    LEFT JOIN categories c ON c.id = m.category_id
"#;

/// Repository for material database operations.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: SqlitePool,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MaterialRepository { pool }
    }

    /// Lists all materials by name, with their category names.
    pub async fn list(&self) -> DbResult<Vec<Material>> {
        let sql = format!("{} ORDER BY m.name COLLATE NOCASE", SELECT_MATERIAL);
        let materials = sqlx::query_as::<_, Material>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = materials.len(), "Listed materials");
        Ok(materials)
    }

    /// Lists the materials of one category.
    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<Material>> {
        let sql = format!(
            "{} WHERE m.category_id = ?1 ORDER BY m.name COLLATE NOCASE",
            SELECT_MATERIAL
        );
        let materials = sqlx::query_as::<_, Material>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(materials)
    }

    /// Gets a material by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Material>> {
        let sql = format!("{} WHERE m.id = ?1", SELECT_MATERIAL);
        let material = sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(material)
    }

    /// Inserts a new material.
    ///
    /// ## Returns
    /// * `Err(CoreError::CategoryNotFound)` - `category_id` does not exist
    /// * `Err(ValidationError::Duplicate)` - name already used
    pub async fn insert(&self, input: &MaterialInput) -> DbResult<Material> {
        let id = generate_id();
        let now = Utc::now();

        debug!(id = %id, name = %input.name, "Inserting material");

        sqlx::query(
            r#"
            INSERT INTO materials (
                id, name, category_id, standard_price, unit, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(&input.category_id)
        .bind(input.standard_price)
        .bind(input.unit)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, input))?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Material", id))
    }

    /// Updates a material. Existing BoM lines keep their price snapshots.
    pub async fn update(&self, id: &str, input: &MaterialInput) -> DbResult<Material> {
        debug!(id = %id, "Updating material");

        let result = sqlx::query(
            r#"
            UPDATE materials SET
                name = ?2,
                category_id = ?3,
                standard_price = ?4,
                unit = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.category_id)
        .bind(input.standard_price)
        .bind(input.unit)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, input))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::MaterialNotFound(id.to_string()).into());
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::MaterialNotFound(id.to_string()).into())
    }

    /// Number of BoM lines using the material.
    pub async fn count_bom_lines(&self, id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bill_of_materials WHERE material_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes a material that no BoM line references.
    ///
    /// ## Returns
    /// * `Err(CoreError::MaterialInUse)` - carries the current line count
    /// * `Err(CoreError::MaterialNotFound)` - no such material
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting material");

        let mut tx = self.pool.begin().await?;

        let name: Option<String> = sqlx::query_scalar("SELECT name FROM materials WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let name = name.ok_or_else(|| CoreError::MaterialNotFound(id.to_string()))?;

        let bom_line_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bill_of_materials WHERE material_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        ensure_material_deletable(&name, bom_line_count)?;

        sqlx::query("DELETE FROM materials WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    fn write_error(err: sqlx::Error, input: &MaterialInput) -> DbError {
        let err = DbError::from(err).name_taken(&input.name);
        if err.is_foreign_key_violation() {
            return CoreError::CategoryNotFound(input.category_id.clone()).into();
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{category, material, memory_db};
    use super::*;
    use hpp_core::{BomLine, ProductDraft, Unit};

    fn input(name: &str, category_id: &str) -> MaterialInput {
        MaterialInput {
            name: name.to_string(),
            category_id: category_id.to_string(),
            standard_price: 12_500.0,
            unit: Unit::Cm,
        }
    }

    #[tokio::test]
    async fn test_insert_joins_category_name() {
        let db = memory_db().await;
        let kain = category(&db, "Kain").await;

        let katun = db.materials().insert(&input(" Katun ", &kain.id)).await.unwrap();
        assert_eq!(katun.name, "Katun");
        assert_eq!(katun.category_name.as_deref(), Some("Kain"));
        assert_eq!(katun.unit, Unit::Cm);
        assert_eq!(katun.standard_price, 12_500.0);
    }

    #[tokio::test]
    async fn test_insert_with_unknown_category() {
        let db = memory_db().await;
        let err = db.materials().insert(&input("Katun", "missing")).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CategoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_and_list_by_category() {
        let db = memory_db().await;
        let kain = category(&db, "Kain").await;
        let aks = category(&db, "Aksesoris").await;
        material(&db, &kain.id, "Linen", 1.0).await;
        material(&db, &aks.id, "Kancing", 1.0).await;
        material(&db, &kain.id, "Katun", 1.0).await;

        let names: Vec<String> = db
            .materials()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Kancing", "Katun", "Linen"]);

        let kain_only = db.materials().list_by_category(&kain.id).await.unwrap();
        assert_eq!(kain_only.len(), 2);
        assert!(kain_only.iter().all(|m| m.category_id == kain.id));
    }

    #[tokio::test]
    async fn test_update_moves_category() {
        let db = memory_db().await;
        let kain = category(&db, "Kain").await;
        let aks = category(&db, "Aksesoris").await;
        let m = material(&db, &kain.id, "Resleting", 2_000.0).await;

        let mut changed = input("Resleting YKK", &aks.id);
        changed.standard_price = 3_000.0;
        let updated = db.materials().update(&m.id, &changed).await.unwrap();

        assert_eq!(updated.name, "Resleting YKK");
        assert_eq!(updated.category_name.as_deref(), Some("Aksesoris"));
        assert_eq!(updated.standard_price, 3_000.0);
    }

    #[tokio::test]
    async fn test_delete_guarded_by_bom_lines() {
        let db = memory_db().await;
        let kain = category(&db, "Kain").await;
        let katun = material(&db, &kain.id, "Kain Katun", 10_000.0).await;

        for name in ["Tas", "Dompet"] {
            db.products()
                .insert(&ProductDraft {
                    name: name.to_string(),
                    description: None,
                    overhead_percentage: 20.0,
                    target_margin_percentage: 30.0,
                    bom: vec![BomLine::from_material(&katun, 1.0)],
                })
                .await
                .unwrap();
        }

        assert_eq!(db.materials().count_bom_lines(&katun.id).await.unwrap(), 2);

        let err = db.materials().delete(&katun.id).await.unwrap_err();
        assert!(err.to_string().contains('2'));
        assert!(db.materials().get_by_id(&katun.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unused() {
        let db = memory_db().await;
        let kain = category(&db, "Kain").await;
        let katun = material(&db, &kain.id, "Katun", 1.0).await;

        db.materials().delete(&katun.id).await.unwrap();
        assert!(db.materials().list().await.unwrap().is_empty());

        let err = db.materials().delete(&katun.id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::MaterialNotFound(_))));
    }
}
