//! # Order Repository
//!
//! The order write transaction and order read paths.
//!
//! ## The Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_order() - ONE transaction                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── For each line:                                                   │
//! │    │     UPDATE product_variants                                        │
//! │    │     SET stock = stock - qty                                        │
//! │    │     WHERE id = ? AND stock >= qty   ← condition IS the check      │
//! │    │         │                                                          │
//! │    │         └── 0 rows? → InsufficientStock → ROLLBACK (whole order)  │
//! │    │                                                                    │
//! │    ├── INSERT order                                                     │
//! │    ├── INSERT order_items (one per aggregated line)                    │
//! │    ├── INSERT order_address (snapshot)                                 │
//! │    ├── UPDATE invoice_sequence SET seq = seq + 1 RETURNING seq         │
//! │    └── INSERT order_invoice (FAC-NNNNNN)                               │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  There is NO separate "check stock" read. The conditional UPDATE is    │
//! │  the only gate, so two concurrent checkouts can never both pass on     │
//! │  the same last unit.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbResult, OrderError, OrderResult};
use tienda_core::{
    format_invoice_number, DocumentType, Order, OrderAddress, OrderInvoice, OrderLineItem,
};

// =============================================================================
// Write-Side Inputs / Outputs
// =============================================================================

/// Invoice fields known before the transaction assigns a sequence value.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub id: String,
    pub order_id: String,
    pub document_type: DocumentType,
    pub tax_id: String,
    pub legal_name: String,
    pub invoice_url: String,
}

/// Everything a committed order consists of, as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    pub address: OrderAddress,
    pub invoice: OrderInvoice,
}

/// A line item enriched with its product's display fields, as the invoice
/// renderer consumes it.
///
/// `sku_snapshot` and `unit_price_cents` are the frozen order-time values;
/// title/category/image come from the current catalog row at read time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemDetail {
    pub id: String,
    pub order_id: String,
    pub product_variant_id: String,
    pub sku_snapshot: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub title: String,
    pub category: String,
    pub image_url: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Commits a complete order atomically: stock reservation, order rows,
    /// address snapshot, and invoice sequencing all happen in one
    /// transaction.
    ///
    /// ## Arguments
    /// * `order` - The priced order header (totals already computed)
    /// * `items` - Aggregated line items; `quantity` drives the decrement
    /// * `address` - Shipping snapshot for this order
    /// * `invoice` - Invoice fields minus seq/number, assigned in here
    ///
    /// ## Errors
    /// * `InsufficientStock` - some line couldn't be covered; NOTHING was
    ///   written, stock on earlier lines is restored by the rollback
    /// * `VariantNotFound` - a line references a vanished variant
    /// * `Sequencing` / `Persistence` - infrastructure failures, retryable
    pub async fn create_order(
        &self,
        order: &Order,
        items: &[OrderLineItem],
        address: &OrderAddress,
        invoice: &NewInvoice,
    ) -> OrderResult<OrderInvoice> {
        debug!(order_id = %order.id, lines = items.len(), "Opening checkout transaction");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| OrderError::Persistence(e.into()))?;

        // 1. Reserve stock. The WHERE clause is the stock check.
        for item in items {
            reserve_stock(&mut tx, item).await?;
        }

        // 2. Order header
        insert_order(&mut tx, order).await?;

        // 3. Line items
        for item in items {
            insert_item(&mut tx, item).await?;
        }

        // 4. Address snapshot
        insert_address(&mut tx, address).await?;

        // 5. Sequence + invoice. Assigned last so an aborted attempt never
        //    consumed a number.
        let seq = next_invoice_seq(&mut tx).await?;
        let committed_invoice = insert_invoice(&mut tx, invoice, seq).await?;

        tx.commit()
            .await
            .map_err(|e| OrderError::Persistence(e.into()))?;

        info!(
            order_id = %order.id,
            invoice = %committed_invoice.invoice_number,
            total = order.total_amount_cents,
            "Order committed"
        );

        Ok(committed_invoice)
    }

    /// Gets an order header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, payment_method,
                   sub_total_cents, total_tax_cents, total_amount_cents,
                   total_items, is_online_sale, coupon_id, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets the full order payload: header, items, address and invoice.
    ///
    /// ## Usage
    /// This is the invoice-renderer payload: everything a document
    /// generator needs in one call.
    pub async fn get_details(&self, order_id: &str) -> OrderResult<OrderDetails> {
        let order = self
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT i.id, i.order_id, i.product_variant_id, i.sku_snapshot,
                   i.unit_price_cents, i.quantity,
                   p.title, p.category, p.image_url
            FROM order_items i
            JOIN product_variants v ON v.id = i.product_variant_id
            JOIN products p ON p.id = v.product_id
            WHERE i.order_id = ?1
            ORDER BY i.rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| OrderError::Persistence(e.into()))?;

        let address = sqlx::query_as::<_, OrderAddress>(
            r#"
            SELECT id, order_id, first_name, last_name, email, national_id,
                   phone, address_line, reference, city_id, created_at
            FROM order_addresses
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| OrderError::Persistence(e.into()))?;

        let invoice = sqlx::query_as::<_, OrderInvoice>(
            r#"
            SELECT id, order_id, document_type, tax_id, legal_name,
                   seq, invoice_number, invoice_url, created_at
            FROM order_invoices
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| OrderError::Persistence(e.into()))?;

        Ok(OrderDetails {
            order,
            items,
            address,
            invoice,
        })
    }

    /// Gets all line items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        let items = sqlx::query_as::<_, OrderLineItem>(
            r#"
            SELECT id, order_id, product_variant_id, sku_snapshot,
                   unit_price_cents, quantity, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists the most recent orders, newest first.
    ///
    /// ## Arguments
    /// * `limit` - Page size
    /// * `offset` - Rows to skip (page number × page size)
    pub async fn list_recent(&self, limit: i64, offset: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, payment_method,
                   sub_total_cents, total_tax_cents, total_amount_cents,
                   total_items, is_online_sale, coupon_id, created_at
            FROM orders
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists all orders placed by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, payment_method,
                   sub_total_cents, total_tax_cents, total_amount_cents,
                   total_items, is_online_sale, coupon_id, created_at
            FROM orders
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Atomically decrements a variant's stock, failing if it can't cover the
/// line.
///
/// ## Why a Conditional UPDATE
/// A read-then-write ("is there enough? then subtract") has a window where
/// two checkouts both read the same stock and both pass. Folding the check
/// into the UPDATE's WHERE clause closes that window: SQLite serializes
/// write transactions, so exactly one of two competing decrements on the
/// last unit affects a row.
async fn reserve_stock(tx: &mut Transaction<'_, Sqlite>, item: &OrderLineItem) -> OrderResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE product_variants
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(&item.product_variant_id)
    .bind(item.quantity)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(|e| OrderError::Persistence(e.into()))?;

    if result.rows_affected() == 0 {
        // Distinguish "not enough" from "gone" for the error report.
        // Read inside the same transaction; purely informational.
        let available: Option<(String, i64)> =
            sqlx::query_as("SELECT sku, stock FROM product_variants WHERE id = ?1")
                .bind(&item.product_variant_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| OrderError::Persistence(e.into()))?;

        return match available {
            Some((sku, stock)) => {
                warn!(
                    sku = %sku,
                    available = stock,
                    requested = item.quantity,
                    "Stock reservation failed"
                );
                Err(OrderError::InsufficientStock {
                    sku,
                    available: stock,
                    requested: item.quantity,
                })
            }
            None => Err(OrderError::VariantNotFound(
                item.product_variant_id.clone(),
            )),
        };
    }

    Ok(())
}

async fn insert_order(tx: &mut Transaction<'_, Sqlite>, order: &Order) -> OrderResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, user_id, payment_method,
            sub_total_cents, total_tax_cents, total_amount_cents,
            total_items, is_online_sale, coupon_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(order.payment_method)
    .bind(order.sub_total_cents)
    .bind(order.total_tax_cents)
    .bind(order.total_amount_cents)
    .bind(order.total_items)
    .bind(order.is_online_sale)
    .bind(&order.coupon_id)
    .bind(order.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| OrderError::Persistence(e.into()))?;

    Ok(())
}

async fn insert_item(tx: &mut Transaction<'_, Sqlite>, item: &OrderLineItem) -> OrderResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_variant_id,
            sku_snapshot, unit_price_cents, quantity, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.product_variant_id)
    .bind(&item.sku_snapshot)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| OrderError::Persistence(e.into()))?;

    Ok(())
}

async fn insert_address(
    tx: &mut Transaction<'_, Sqlite>,
    address: &OrderAddress,
) -> OrderResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_addresses (
            id, order_id, first_name, last_name, email, national_id,
            phone, address_line, reference, city_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&address.id)
    .bind(&address.order_id)
    .bind(&address.first_name)
    .bind(&address.last_name)
    .bind(&address.email)
    .bind(&address.national_id)
    .bind(&address.phone)
    .bind(&address.address_line)
    .bind(&address.reference)
    .bind(&address.city_id)
    .bind(address.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| OrderError::Persistence(e.into()))?;

    Ok(())
}

/// Advances the system-wide invoice counter and returns the new value.
///
/// ## Atomicity
/// UPDATE-with-RETURNING inside the order transaction: writers are
/// serialized by SQLite, so concurrent checkouts get distinct values.
///
/// ## Numbering Policy
/// A rollback undoes the increment, so the value an aborted attempt
/// touched is handed to the next successful checkout - numbering is
/// gap-free, and no value is ever visible outside a committed invoice.
/// Some fiscal regimes instead require aborted attempts to burn their
/// number (gaps, never re-issued); under that regime, allocate the value
/// in its own committed transaction before the order transaction opens.
async fn next_invoice_seq(tx: &mut Transaction<'_, Sqlite>) -> OrderResult<i64> {
    let seq: Option<i64> =
        sqlx::query_scalar("UPDATE invoice_sequence SET seq = seq + 1 WHERE id = 1 RETURNING seq")
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| OrderError::Persistence(e.into()))?;

    seq.ok_or_else(|| OrderError::Sequencing("invoice_sequence row missing".to_string()))
}

async fn insert_invoice(
    tx: &mut Transaction<'_, Sqlite>,
    invoice: &NewInvoice,
    seq: i64,
) -> OrderResult<OrderInvoice> {
    let committed = OrderInvoice {
        id: invoice.id.clone(),
        order_id: invoice.order_id.clone(),
        document_type: invoice.document_type,
        tax_id: invoice.tax_id.clone(),
        legal_name: invoice.legal_name.clone(),
        seq,
        invoice_number: format_invoice_number(seq),
        invoice_url: invoice.invoice_url.clone(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO order_invoices (
            id, order_id, document_type, tax_id, legal_name,
            seq, invoice_number, invoice_url, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&committed.id)
    .bind(&committed.order_id)
    .bind(committed.document_type)
    .bind(&committed.tax_id)
    .bind(&committed.legal_name)
    .bind(committed.seq)
    .bind(&committed.invoice_number)
    .bind(&committed.invoice_url)
    .bind(committed.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| OrderError::Persistence(e.into()))?;

    Ok(committed)
}

/// Generates a new order-scoped row ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tienda_core::{PaymentMethod, Product, ProductVariant};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Seeds one product with one variant, returning the variant id.
    async fn seed_variant(db: &Database, sku: &str, price_cents: i64, stock: i64) -> String {
        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            title: format!("Product {sku}"),
            category: "shirts".to_string(),
            image_url: None,
            price_cents,
            sale_price_cents: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.variants().insert_product(&product).await.unwrap();

        let variant = ProductVariant {
            id: generate_id(),
            product_id: product.id.clone(),
            sku: sku.to_string(),
            size: "M".to_string(),
            color: None,
            stock,
            stock_alert: None,
            created_at: now,
            updated_at: now,
        };
        db.variants().insert_variant(&variant).await.unwrap();
        variant.id
    }

    fn build_order(lines: &[(String, String, i64, i64)]) -> (Order, Vec<OrderLineItem>) {
        // lines: (variant_id, sku, unit_price_cents, quantity)
        let now = Utc::now();
        let order_id = generate_id();
        let sub_total: i64 = lines.iter().map(|(_, _, p, q)| p * q).sum();
        let tax = (sub_total * 1500 + 5000) / 10000;
        let total_items: i64 = lines.iter().map(|(_, _, _, q)| q).sum();

        let order = Order {
            id: order_id.clone(),
            user_id: None,
            payment_method: PaymentMethod::OnlineGateway,
            sub_total_cents: sub_total,
            total_tax_cents: tax,
            total_amount_cents: sub_total + tax,
            total_items,
            is_online_sale: true,
            coupon_id: None,
            created_at: now,
        };

        let items = lines
            .iter()
            .map(|(variant_id, sku, price, qty)| OrderLineItem {
                id: generate_id(),
                order_id: order_id.clone(),
                product_variant_id: variant_id.clone(),
                sku_snapshot: sku.clone(),
                unit_price_cents: *price,
                quantity: *qty,
                created_at: now,
            })
            .collect();

        (order, items)
    }

    fn build_address(order_id: &str) -> OrderAddress {
        OrderAddress {
            id: generate_id(),
            order_id: order_id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Quispe".to_string(),
            email: "ana@example.com".to_string(),
            national_id: "1234567".to_string(),
            phone: "+59171234567".to_string(),
            address_line: "Av. Ballivian 123".to_string(),
            reference: None,
            city_id: generate_id(),
            created_at: Utc::now(),
        }
    }

    fn build_invoice(order_id: &str) -> NewInvoice {
        NewInvoice {
            id: generate_id(),
            order_id: order_id.to_string(),
            document_type: DocumentType::Ci,
            tax_id: "1234567".to_string(),
            legal_name: "Ana Quispe".to_string(),
            invoice_url: format!("http://localhost:3000/orders/invoice/{order_id}"),
        }
    }

    #[tokio::test]
    async fn test_create_order_commits_everything() {
        let db = test_db().await;
        let variant_id = seed_variant(&db, "SHIRT-M", 10000, 10).await;

        let (order, items) = build_order(&[(variant_id.clone(), "SHIRT-M".to_string(), 10000, 2)]);
        let address = build_address(&order.id);
        let invoice = build_invoice(&order.id);

        let committed = db
            .orders()
            .create_order(&order, &items, &address, &invoice)
            .await
            .unwrap();

        assert_eq!(committed.seq, 1);
        assert_eq!(committed.invoice_number, "FAC-000001");

        // Stock decremented
        let variant = db.variants().get_by_id(&variant_id).await.unwrap().unwrap();
        assert_eq!(variant.stock, 8);

        // Full payload readable
        let details = db.orders().get_details(&order.id).await.unwrap();
        assert_eq!(details.order.sub_total_cents, 20000);
        assert_eq!(details.order.total_tax_cents, 3000);
        assert_eq!(details.order.total_amount_cents, 23000);
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].title, "Product SHIRT-M");
        assert_eq!(details.address.first_name, "Ana");
        assert_eq!(details.invoice.invoice_number, "FAC-000001");

        // Raw line items too
        let items = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total().cents(), 20000);
    }

    #[tokio::test]
    async fn test_details_payload_serializes_for_renderer() {
        let db = test_db().await;
        let variant_id = seed_variant(&db, "SHIRT-M", 10000, 10).await;

        let (order, items) = build_order(&[(variant_id, "SHIRT-M".to_string(), 10000, 1)]);
        db.orders()
            .create_order(&order, &items, &build_address(&order.id), &build_invoice(&order.id))
            .await
            .unwrap();

        let details = db.orders().get_details(&order.id).await.unwrap();
        let json = serde_json::to_value(&details).unwrap();

        assert_eq!(json["order"]["total_amount_cents"], 11500);
        assert_eq!(json["invoice"]["invoice_number"], "FAC-000001");
        assert_eq!(json["address"]["first_name"], "Ana");
        assert_eq!(json["items"][0]["sku_snapshot"], "SHIRT-M");
        assert_eq!(json["items"][0]["title"], "Product SHIRT-M");
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_whole_order() {
        let db = test_db().await;
        let plenty = seed_variant(&db, "SHIRT-M", 10000, 10).await;
        let scarce = seed_variant(&db, "PANTS-L", 25000, 1).await;

        let (order, items) = build_order(&[
            (plenty.clone(), "SHIRT-M".to_string(), 10000, 2),
            (scarce.clone(), "PANTS-L".to_string(), 25000, 3),
        ]);
        let address = build_address(&order.id);
        let invoice = build_invoice(&order.id);

        let result = db
            .orders()
            .create_order(&order, &items, &address, &invoice)
            .await;

        match result {
            Err(OrderError::InsufficientStock {
                sku,
                available,
                requested,
            }) => {
                assert_eq!(sku, "PANTS-L");
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // First line's decrement was rolled back too
        let v = db.variants().get_by_id(&plenty).await.unwrap().unwrap();
        assert_eq!(v.stock, 10);
        let v = db.variants().get_by_id(&scarce).await.unwrap().unwrap();
        assert_eq!(v.stock, 1);

        // No order rows escaped
        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert!(db.orders().list_recent(10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vanished_variant_reported_as_not_found() {
        let db = test_db().await;
        let ghost = generate_id();

        let (order, items) = build_order(&[(ghost.clone(), "GHOST-1".to_string(), 1000, 1)]);
        let address = build_address(&order.id);
        let invoice = build_invoice(&order.id);

        let result = db
            .orders()
            .create_order(&order, &items, &address, &invoice)
            .await;

        assert!(matches!(result, Err(OrderError::VariantNotFound(id)) if id == ghost));
    }

    #[tokio::test]
    async fn test_invoice_sequence_survives_failed_attempts() {
        let db = test_db().await;
        let variant_id = seed_variant(&db, "SHIRT-M", 10000, 3).await;

        // First order: seq 1
        let (order, items) = build_order(&[(variant_id.clone(), "SHIRT-M".to_string(), 10000, 1)]);
        let inv = db
            .orders()
            .create_order(&order, &items, &build_address(&order.id), &build_invoice(&order.id))
            .await
            .unwrap();
        assert_eq!(inv.seq, 1);

        // Failed attempt: requests more than remains, consumes no number
        let (order, items) = build_order(&[(variant_id.clone(), "SHIRT-M".to_string(), 10000, 99)]);
        let result = db
            .orders()
            .create_order(&order, &items, &build_address(&order.id), &build_invoice(&order.id))
            .await;
        assert!(matches!(result, Err(OrderError::InsufficientStock { .. })));

        // Next success continues the sequence without a gap
        let (order, items) = build_order(&[(variant_id.clone(), "SHIRT-M".to_string(), 10000, 1)]);
        let inv = db
            .orders()
            .create_order(&order, &items, &build_address(&order.id), &build_invoice(&order.id))
            .await
            .unwrap();
        assert_eq!(inv.seq, 2);
        assert_eq!(inv.invoice_number, "FAC-000002");
    }

    #[tokio::test]
    async fn test_find_by_user_and_list_recent() {
        let db = test_db().await;
        let variant_id = seed_variant(&db, "SHIRT-M", 10000, 10).await;
        let user_id = generate_id();

        let (mut order, items) =
            build_order(&[(variant_id.clone(), "SHIRT-M".to_string(), 10000, 1)]);
        order.user_id = Some(user_id.clone());
        db.orders()
            .create_order(&order, &items, &build_address(&order.id), &build_invoice(&order.id))
            .await
            .unwrap();

        let (anon_order, items) =
            build_order(&[(variant_id.clone(), "SHIRT-M".to_string(), 10000, 1)]);
        db.orders()
            .create_order(
                &anon_order,
                &items,
                &build_address(&anon_order.id),
                &build_invoice(&anon_order.id),
            )
            .await
            .unwrap();

        let mine = db.orders().find_by_user(&user_id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, order.id);

        let recent = db.orders().list_recent(10, 0).await.unwrap();
        assert_eq!(recent.len(), 2);
        // Newest first
        assert_eq!(recent[0].id, anon_order.id);

        // Pagination: second page of size one holds the older order
        let page = db.orders().list_recent(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, order.id);
    }
}
