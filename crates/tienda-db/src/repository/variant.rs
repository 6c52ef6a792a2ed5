//! # Variant Repository
//!
//! Catalog reads and stock management for product variants.
//!
//! ## Role in Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lookup_variants() feeds the pricing step: one batch query joining     │
//! │  variants with their product's price columns. The checkout             │
//! │  transaction then decrements stock through OrderRepository - this      │
//! │  repository never writes stock downward.                                │
//! │                                                                         │
//! │  restock() / list_low_stock() are catalog management, outside the      │
//! │  checkout path entirely.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tienda_core::validation::{validate_price_cents, validate_sku};
use tienda_core::{Product, ProductVariant, ResolvedVariant};

/// Repository for catalog variant operations.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    /// Creates a new VariantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    /// Resolves a batch of variant IDs against the live catalog.
    ///
    /// ## What This Returns
    /// One `ResolvedVariant` per id that exists AND belongs to an active
    /// product - the variant joined with its product's title, category and
    /// price columns, read in a single query.
    ///
    /// ## Missing IDs
    /// IDs that don't resolve are simply absent from the result. The caller
    /// compares counts to decide which id to report as not found.
    pub async fn lookup_variants(&self, ids: &[String]) -> DbResult<Vec<ResolvedVariant>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = ids.len(), "Resolving variants");

        // Dynamic IN clause: one placeholder per id
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT
                v.id,
                v.product_id,
                v.sku,
                p.title,
                p.category,
                p.image_url,
                p.price_cents,
                p.sale_price_cents,
                v.stock
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            WHERE v.id IN ({placeholders})
              AND p.is_active = 1
            "#
        );

        let mut query = sqlx::query_as::<_, ResolvedVariant>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let resolved = query.fetch_all(&self.pool).await?;
        Ok(resolved)
    }

    /// Gets a single variant by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductVariant>> {
        let variant = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, sku, size, color, stock, stock_alert,
                   created_at, updated_at
            FROM product_variants
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Inserts a catalog product.
    ///
    /// ## Validation
    /// Prices are checked before the row is written; the schema's CHECK
    /// constraints are the backstop, this is the readable error.
    pub async fn insert_product(&self, product: &Product) -> DbResult<()> {
        validate_price_cents(product.price_cents)
            .map_err(|e| DbError::InvalidInput(e.to_string()))?;
        if let Some(sale_price) = product.sale_price_cents {
            validate_price_cents(sale_price).map_err(|e| DbError::InvalidInput(e.to_string()))?;
        }

        debug!(id = %product.id, title = %product.title, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, category, image_url,
                price_cents, sale_price_cents, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.price_cents)
        .bind(product.sale_price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a product variant.
    ///
    /// ## Validation
    /// The SKU is format-checked before the row is written (UNIQUE only
    /// guards duplicates, not garbage).
    pub async fn insert_variant(&self, variant: &ProductVariant) -> DbResult<()> {
        validate_sku(&variant.sku).map_err(|e| DbError::InvalidInput(e.to_string()))?;

        debug!(id = %variant.id, sku = %variant.sku, "Inserting variant");

        sqlx::query(
            r#"
            INSERT INTO product_variants (
                id, product_id, sku, size, color,
                stock, stock_alert, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.sku)
        .bind(&variant.size)
        .bind(&variant.color)
        .bind(variant.stock)
        .bind(variant.stock_alert)
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds stock to a variant (receiving inventory).
    ///
    /// ## Returns
    /// The new stock level.
    pub async fn restock(&self, variant_id: &str, quantity: i64) -> DbResult<i64> {
        debug!(variant_id = %variant_id, quantity, "Restocking variant");

        let now = chrono::Utc::now();
        let stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE product_variants
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING stock
            "#,
        )
        .bind(variant_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        stock.ok_or_else(|| DbError::not_found("ProductVariant", variant_id))
    }

    /// Lists variants at or below their low-stock alert threshold.
    ///
    /// ## Usage
    /// Feeds replenishment dashboards; variants with no threshold are
    /// never reported.
    pub async fn list_low_stock(&self) -> DbResult<Vec<ProductVariant>> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, sku, size, color, stock, stock_alert,
                   created_at, updated_at
            FROM product_variants
            WHERE stock_alert IS NOT NULL
              AND stock <= stock_alert
            ORDER BY stock ASC, sku ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
