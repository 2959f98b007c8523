//! # Product Repository
//!
//! Database operations for products and their bills of materials.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Saving a product                                     │
//! │                                                                         │
//! │  ProductDraft (validated)                                              │
//! │       │                                                                 │
//! │       ▼  draft.costing()   ← the same call the editor displays         │
//! │  BEGIN                                                                 │
//! │    INSERT / UPDATE products   (percentages + four derived figures)     │
//! │    DELETE FROM bill_of_materials WHERE product_id = ?   (update only)  │
//! │    INSERT bill_of_materials × n   (price snapshot, subtotal, order)    │
//! │  COMMIT                                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Product re-read with BoM + material + category + photos               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Replacing the lines inside the product's transaction means no reader ever
//! sees derived figures that disagree with the stored BoM.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use hpp_core::{
    costing, BomLine, BomLineDetail, CoreError, CostBreakdown, Material, Money, Product,
    ProductDraft, ProductPhoto, Unit,
};

use super::generate_id;
use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: Option<String>,
    overhead_percentage: f64,
    target_margin_percentage: f64,
    total_material_cost: i64,
    production_cost: i64,
    estimated_selling_price: i64,
    gross_profit_per_unit: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, bom: Vec<BomLineDetail>, photos: Vec<ProductPhoto>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            overhead_percentage: self.overhead_percentage,
            target_margin_percentage: self.target_margin_percentage,
            costing: CostBreakdown {
                total_material_cost: Money::from_rupiah(self.total_material_cost),
                production_cost: Money::from_rupiah(self.production_cost),
                estimated_selling_price: Money::from_rupiah(self.estimated_selling_price),
                gross_profit_per_unit: Money::from_rupiah(self.gross_profit_per_unit),
            },
            bom,
            photos,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A BoM line joined with its material and the material's category.
#[derive(Debug, sqlx::FromRow)]
struct BomLineRow {
    id: String,
    product_id: String,
    material_id: String,
    price: f64,
    quantity: f64,
    subtotal: f64,
    material_name: String,
    category_id: String,
    category_name: Option<String>,
    standard_price: f64,
    unit: Unit,
    material_created_at: DateTime<Utc>,
    material_updated_at: DateTime<Utc>,
}

impl From<BomLineRow> for BomLineDetail {
    fn from(row: BomLineRow) -> Self {
        let material = Material {
            id: row.material_id.clone(),
            name: row.material_name,
            category_id: row.category_id,
            category_name: row.category_name,
            standard_price: row.standard_price,
            unit: row.unit,
            created_at: row.material_created_at,
            updated_at: row.material_updated_at,
        };

        BomLineDetail {
            id: row.id,
            product_id: row.product_id,
            material_id: row.material_id,
            price: row.price,
            quantity: row.quantity,
            subtotal: row.subtotal,
            material: Some(material),
        }
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT
        id, name, description,
        overhead_percentage, target_margin_percentage,
        total_material_cost, production_cost,
        estimated_selling_price, gross_profit_per_unit,
        created_at, updated_at
    FROM products
"#;

const SELECT_BOM_LINE: &str = r#"
    SELECT
        b.id,
        b.product_id,
        b.material_id,
        b.price,
        b.quantity,
        b.subtotal,
        m.name AS material_name,
        m.category_id,
        c.name AS category_name,
        m.standard_price,
        m.unit,
        m.created_at AS material_created_at,
        m.updated_at AS material_updated_at
    FROM bill_of_materials b
    INNER JOIN materials m ON m.id = b.material_id
    LEFT JOIN categories c ON c.id = m.category_id
"#;

const SELECT_PHOTO: &str = r#"
    SELECT
        id, product_id, photo_url, display_order,
        file_name, file_size, mime_type, created_at
    FROM product_photos
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let product = db.products().insert(&draft).await?;
/// let all = db.products().list().await?;   // newest first
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products, newest first, each with its BoM lines (material
    /// and category joined) and photos in display order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{} ORDER BY created_at DESC, rowid DESC", SELECT_PRODUCT);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("{} ORDER BY b.product_id, b.line_order", SELECT_BOM_LINE);
        let lines = sqlx::query_as::<_, BomLineRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("{} ORDER BY product_id, display_order, created_at", SELECT_PHOTO);
        let photos = sqlx::query_as::<_, ProductPhoto>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let mut lines_by_product: HashMap<String, Vec<BomLineDetail>> = HashMap::new();
        for line in lines {
            lines_by_product
                .entry(line.product_id.clone())
                .or_default()
                .push(line.into());
        }

        let mut photos_by_product: HashMap<String, Vec<ProductPhoto>> = HashMap::new();
        for photo in photos {
            photos_by_product
                .entry(photo.product_id.clone())
                .or_default()
                .push(photo);
        }

        let products: Vec<Product> = rows
            .into_iter()
            .map(|row| {
                let bom = lines_by_product.remove(&row.id).unwrap_or_default();
                let photos = photos_by_product.remove(&row.id).unwrap_or_default();
                row.into_product(bom, photos)
            })
            .collect();

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product with its BoM lines and photos.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{} WHERE id = ?1", SELECT_PRODUCT);
        let Some(row) = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let sql = format!("{} WHERE b.product_id = ?1 ORDER BY b.line_order", SELECT_BOM_LINE);
        let bom = sqlx::query_as::<_, BomLineRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(BomLineDetail::from)
            .collect();

        let sql = format!(
            "{} WHERE product_id = ?1 ORDER BY display_order, created_at",
            SELECT_PHOTO
        );
        let photos = sqlx::query_as::<_, ProductPhoto>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(row.into_product(bom, photos)))
    }

    /// Inserts a product and its BoM lines, storing `draft.costing()` as the
    /// derived figures.
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        let id = generate_id();
        let now = Utc::now();
        let costing = draft.costing();

        debug!(
            id = %id,
            name = %draft.name,
            lines = draft.bom.len(),
            selling_price = costing.estimated_selling_price.rupiah(),
            "Inserting product"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description,
                overhead_percentage, target_margin_percentage,
                total_material_cost, production_cost,
                estimated_selling_price, gross_profit_per_unit,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&id)
        .bind(draft.name.trim())
        .bind(&draft.description)
        .bind(draft.overhead_percentage)
        .bind(draft.target_margin_percentage)
        .bind(costing.total_material_cost.rupiah())
        .bind(costing.production_cost.rupiah())
        .bind(costing.estimated_selling_price.rupiah())
        .bind(costing.gross_profit_per_unit.rupiah())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).name_taken(&draft.name))?;

        insert_lines(&mut tx, &id, &draft.bom, now).await?;

        tx.commit().await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Updates a product and fully replaces its BoM lines.
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<Product> {
        let now = Utc::now();
        let costing = draft.costing();

        debug!(id = %id, lines = draft.bom.len(), "Updating product");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                overhead_percentage = ?4,
                target_margin_percentage = ?5,
                total_material_cost = ?6,
                production_cost = ?7,
                estimated_selling_price = ?8,
                gross_profit_per_unit = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(draft.name.trim())
        .bind(&draft.description)
        .bind(draft.overhead_percentage)
        .bind(draft.target_margin_percentage)
        .bind(costing.total_material_cost.rupiah())
        .bind(costing.production_cost.rupiah())
        .bind(costing.estimated_selling_price.rupiah())
        .bind(costing.gross_profit_per_unit.rupiah())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).name_taken(&draft.name))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        sqlx::query("DELETE FROM bill_of_materials WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_lines(&mut tx, id, &draft.bom, now).await?;

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Deletes a product row. BoM lines and photo rows cascade.
    ///
    /// Stored photo files are not touched here; see
    /// [`Database::delete_product`](crate::Database::delete_product).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        Ok(())
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Writes BoM lines in their given order.
async fn insert_lines(
    conn: &mut SqliteConnection,
    product_id: &str,
    lines: &[BomLine],
    now: DateTime<Utc>,
) -> DbResult<()> {
    for (index, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO bill_of_materials (
                id, product_id, material_id, price, quantity, subtotal, line_order, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(generate_id())
        .bind(product_id)
        .bind(&line.material_id)
        .bind(line.price)
        .bind(line.quantity)
        .bind(costing::subtotal(line.price, line.quantity))
        .bind(index as i64)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_foreign_key_violation() {
                DbError::from(CoreError::MaterialNotFound(line.material_id.clone()))
            } else {
                err
            }
        })?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
