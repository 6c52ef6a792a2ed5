//! # Checkout Service
//!
//! The order-placement flow end to end: validate, resolve, price, commit.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CheckoutService::place_order                         │
//! │                                                                         │
//! │  OrderRequest (untrusted)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. normalize()        ← tienda-core: validate + aggregate lines       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. lookup_variants()  ← one batch read; missing id → VariantNotFound  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. price_order()      ← tienda-core: server prices, one tax rounding  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. assemble rows      ← order header, items, address, invoice draft   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  5. create_order()     ← ONE transaction: reserve stock + persist +    │
//! │       │                   assign invoice number                        │
//! │       ▼                                                                 │
//! │  PlacedOrder { order, items, address, invoice }                        │
//! │                                                                         │
//! │  Steps 1-4 touch nothing. Step 5 is all-or-nothing.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::env;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{OrderError, OrderResult};
use crate::pool::Database;
use crate::repository::order::{generate_id, NewInvoice};
use tienda_core::{
    intake, pricing, DocumentType, Order, OrderAddress, OrderInvoice, OrderLineItem, OrderRequest,
    ResolvedVariant, TaxRate, DEFAULT_TAX_RATE_BPS,
};

// =============================================================================
// Configuration
// =============================================================================

/// Checkout configuration.
///
/// ## Environment Variables
/// | Variable       | Default                 | Purpose                    |
/// |----------------|-------------------------|----------------------------|
/// | `HOST_API`     | `http://localhost:3000` | Base URL for invoice links |
/// | `TAX_RATE_BPS` | `1500` (15%)            | Order tax rate             |
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Base URL the invoice document link is built from.
    pub host_api: String,

    /// Tax rate applied to every order.
    pub tax_rate: TaxRate,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn load() -> Self {
        let host_api =
            env::var("HOST_API").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let tax_rate_bps = env::var("TAX_RATE_BPS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_TAX_RATE_BPS);

        CheckoutConfig {
            host_api,
            tax_rate: TaxRate::from_bps(tax_rate_bps),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            host_api: "http://localhost:3000".to_string(),
            tax_rate: TaxRate::default(),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Everything a successful checkout committed, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
    pub address: OrderAddress,
    pub invoice: OrderInvoice,
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates order placement over the repositories.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    config: CheckoutConfig,
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(db: Database, config: CheckoutConfig) -> Self {
        CheckoutService { db, config }
    }

    /// Places an order.
    ///
    /// ## Guarantees
    /// - Nothing is written until every line is validated, resolved and
    ///   priced from the live catalog.
    /// - The commit is atomic: stock reservation, order rows and the
    ///   invoice number appear together or not at all.
    /// - Prices come from the catalog only; nothing in the request can
    ///   influence an amount.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn place_order(&self, request: &OrderRequest) -> OrderResult<PlacedOrder> {
        // 1. Validate + aggregate (pure, no I/O)
        let cart = intake::normalize(request)?;

        // 2. Resolve against the catalog in one batch
        let ids: Vec<String> = cart.iter().map(|l| l.product_variant_id.clone()).collect();
        let resolved = self.db.variants().lookup_variants(&ids).await?;

        let by_id: HashMap<&str, &ResolvedVariant> =
            resolved.iter().map(|v| (v.id.as_str(), v)).collect();

        // Cart order drives line order, so pricing stays deterministic
        let mut lines: Vec<(ResolvedVariant, i64)> = Vec::with_capacity(cart.len());
        for line in &cart {
            match by_id.get(line.product_variant_id.as_str()) {
                Some(variant) => lines.push(((*variant).clone(), line.quantity)),
                None => {
                    return Err(OrderError::VariantNotFound(line.product_variant_id.clone()))
                }
            }
        }

        // 3. Price from catalog data only
        let priced = pricing::price_order(&lines, self.config.tax_rate);

        debug!(
            sub_total = priced.sub_total_cents,
            total = priced.total_amount_cents,
            "Order priced"
        );

        // 4. Assemble the rows to commit
        let now = Utc::now();
        let order_id = generate_id();

        let order = Order {
            id: order_id.clone(),
            user_id: request.user_id.clone(),
            payment_method: request.payment_method.unwrap_or_default(),
            sub_total_cents: priced.sub_total_cents,
            total_tax_cents: priced.total_tax_cents,
            total_amount_cents: priced.total_amount_cents,
            total_items: priced.total_items,
            is_online_sale: request.is_online_sale.unwrap_or(true),
            coupon_id: request.coupon_id.clone(),
            created_at: now,
        };

        let items: Vec<OrderLineItem> = priced
            .lines
            .iter()
            .map(|line| OrderLineItem {
                id: generate_id(),
                order_id: order_id.clone(),
                product_variant_id: line.product_variant_id.clone(),
                sku_snapshot: line.sku.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                created_at: now,
            })
            .collect();

        let address = OrderAddress {
            id: generate_id(),
            order_id: order_id.clone(),
            first_name: request.address.first_name.trim().to_string(),
            last_name: request.address.last_name.trim().to_string(),
            email: request.address.email.trim().to_string(),
            national_id: request.address.national_id.trim().to_string(),
            phone: request.address.phone.trim().to_string(),
            address_line: request.address.address_line.trim().to_string(),
            reference: request.address.reference.clone(),
            city_id: request.address.city_id.clone(),
            created_at: now,
        };

        let invoice = self.build_invoice_draft(request, &address);

        // 5. Commit atomically
        let committed_invoice = self
            .db
            .orders()
            .create_order(&order, &items, &address, &invoice)
            .await?;

        Ok(PlacedOrder {
            order,
            items,
            address,
            invoice: committed_invoice,
        })
    }

    /// Builds the invoice draft, defaulting fiscal fields to the address
    /// holder's identity when the request carries no overrides.
    fn build_invoice_draft(&self, request: &OrderRequest, address: &OrderAddress) -> NewInvoice {
        let overrides = request.invoice.clone().unwrap_or_default();

        let tax_id = overrides
            .tax_id
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| address.national_id.clone());

        let legal_name = overrides
            .legal_name
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{} {}", address.first_name, address.last_name));

        NewInvoice {
            id: generate_id(),
            order_id: address.order_id.clone(),
            document_type: overrides.document_type.unwrap_or(DocumentType::Ci),
            tax_id,
            legal_name,
            invoice_url: format!("{}/orders/invoice/{}", self.config.host_api, address.order_id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use tienda_core::{
        AddressRequest, InvoiceRequest, OrderItemRequest, PaymentMethod, Product, ProductVariant,
        ValidationError,
    };

    async fn test_service() -> CheckoutService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CheckoutService::new(db, CheckoutConfig::default())
    }

    async fn seed_variant(
        service: &CheckoutService,
        sku: &str,
        price_cents: i64,
        sale_price_cents: Option<i64>,
        stock: i64,
    ) -> String {
        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            title: format!("Product {sku}"),
            category: "shirts".to_string(),
            image_url: None,
            price_cents,
            sale_price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        service.db.variants().insert_product(&product).await.unwrap();

        let variant = ProductVariant {
            id: generate_id(),
            product_id: product.id,
            sku: sku.to_string(),
            size: "M".to_string(),
            color: None,
            stock,
            stock_alert: None,
            created_at: now,
            updated_at: now,
        };
        service.db.variants().insert_variant(&variant).await.unwrap();
        variant.id
    }

    fn request(items: Vec<OrderItemRequest>) -> OrderRequest {
        OrderRequest {
            payment_method: None,
            is_online_sale: None,
            items,
            address: AddressRequest {
                first_name: "Ana".to_string(),
                last_name: "Quispe".to_string(),
                email: "ana@example.com".to_string(),
                national_id: "1234567".to_string(),
                phone: "+59171234567".to_string(),
                address_line: "Av. Ballivian 123".to_string(),
                reference: None,
                city_id: generate_id(),
            },
            invoice: None,
            user_id: None,
            coupon_id: None,
        }
    }

    fn item(variant_id: &str, quantity: i64) -> OrderItemRequest {
        OrderItemRequest {
            product_variant_id: variant_id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_place_order_happy_path() {
        let service = test_service().await;
        let variant_id = seed_variant(&service, "SHIRT-M", 10000, None, 10).await;

        let placed = service
            .place_order(&request(vec![item(&variant_id, 2)]))
            .await
            .unwrap();

        // Bs 200.00 subtotal, 15% tax, exact total
        assert_eq!(placed.order.sub_total_cents, 20000);
        assert_eq!(placed.order.total_tax_cents, 3000);
        assert_eq!(placed.order.total_amount_cents, 23000);
        assert_eq!(placed.order.total_items, 2);
        assert_eq!(placed.order.payment_method, PaymentMethod::OnlineGateway);

        assert_eq!(placed.items.len(), 1);
        assert_eq!(placed.items[0].sku_snapshot, "SHIRT-M");

        // Invoice defaults to the address holder's identity
        assert_eq!(placed.invoice.document_type, DocumentType::Ci);
        assert_eq!(placed.invoice.tax_id, "1234567");
        assert_eq!(placed.invoice.legal_name, "Ana Quispe");
        assert_eq!(placed.invoice.invoice_number, "FAC-000001");
        assert_eq!(
            placed.invoice.invoice_url,
            format!("http://localhost:3000/orders/invoice/{}", placed.order.id)
        );
    }

    #[tokio::test]
    async fn test_duplicate_lines_aggregate_before_reservation() {
        let service = test_service().await;
        let variant_id = seed_variant(&service, "SHIRT-M", 10000, None, 5).await;

        // 2 + 3 of the same variant: one line of 5, exactly the stock
        let placed = service
            .place_order(&request(vec![item(&variant_id, 2), item(&variant_id, 3)]))
            .await
            .unwrap();

        assert_eq!(placed.items.len(), 1);
        assert_eq!(placed.items[0].quantity, 5);

        let variant = service
            .db
            .variants()
            .get_by_id(&variant_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(variant.stock, 0);
    }

    #[tokio::test]
    async fn test_sale_price_used_for_line_pricing() {
        let service = test_service().await;
        let variant_id = seed_variant(&service, "PROMO-1", 10000, Some(7500), 10).await;

        let placed = service
            .place_order(&request(vec![item(&variant_id, 1)]))
            .await
            .unwrap();

        assert_eq!(placed.items[0].unit_price_cents, 7500);
        assert_eq!(placed.order.sub_total_cents, 7500);
    }

    #[tokio::test]
    async fn test_invoice_overrides_win() {
        let service = test_service().await;
        let variant_id = seed_variant(&service, "SHIRT-M", 10000, None, 10).await;

        let mut req = request(vec![item(&variant_id, 1)]);
        req.invoice = Some(InvoiceRequest {
            document_type: Some(DocumentType::Nit),
            tax_id: Some("1023456022".to_string()),
            legal_name: Some("Importadora Quispe SRL".to_string()),
        });

        let placed = service.place_order(&req).await.unwrap();
        assert_eq!(placed.invoice.document_type, DocumentType::Nit);
        assert_eq!(placed.invoice.tax_id, "1023456022");
        assert_eq!(placed.invoice.legal_name, "Importadora Quispe SRL");
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_io() {
        let service = test_service().await;
        let result = service.place_order(&request(vec![])).await;
        assert!(matches!(
            result,
            Err(OrderError::Validation(ValidationError::EmptyCart))
        ));
    }

    #[tokio::test]
    async fn test_unknown_variant_rejected() {
        let service = test_service().await;
        let ghost = generate_id();
        let result = service.place_order(&request(vec![item(&ghost, 1)])).await;
        assert!(matches!(result, Err(OrderError::VariantNotFound(id)) if id == ghost));
    }

    #[tokio::test]
    async fn test_insufficient_stock_surfaces_counts() {
        let service = test_service().await;
        let variant_id = seed_variant(&service, "SHIRT-M", 10000, None, 3).await;

        let result = service
            .place_order(&request(vec![item(&variant_id, 5)]))
            .await;

        match result {
            Err(OrderError::InsufficientStock {
                sku,
                available,
                requested,
            }) => {
                assert_eq!(sku, "SHIRT-M");
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    /// Builds a file-backed service with a multi-connection pool.
    ///
    /// The in-memory config pins the pool to one connection, which
    /// serializes checkouts at the pool level before they ever reach
    /// SQLite. Contention tests need separate connections so write
    /// transactions actually overlap and the busy handler does the
    /// serializing.
    async fn contended_service() -> (CheckoutService, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("tienda-race-{}.db", generate_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(5))
            .await
            .unwrap();
        (CheckoutService::new(db, CheckoutConfig::default()), path)
    }

    fn remove_db_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            let _ = std::fs::remove_file(std::path::PathBuf::from(file));
        }
    }

    /// Ten concurrent single-unit orders against a stock of five: exactly
    /// five succeed and stock lands on zero. No oversell, no double-sold
    /// unit, and the five committed invoices carry distinct sequence
    /// values 1..=5.
    ///
    /// Runs on a file-backed database with five pool connections, so the
    /// competing write transactions really overlap at the SQLite level
    /// and the conditional decrement is the only thing keeping them
    /// honest.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_checkouts_never_oversell() {
        let (service, db_path) = contended_service().await;
        let variant_id = seed_variant(&service, "LAST-UNITS", 10000, None, 5).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = service.clone();
            let variant_id = variant_id.clone();
            handles.push(tokio::spawn(async move {
                service.place_order(&request(vec![item(&variant_id, 1)])).await
            }));
        }

        let mut ok = 0;
        let mut out_of_stock = 0;
        let mut seqs = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(placed) => {
                    ok += 1;
                    seqs.push(placed.invoice.seq);
                }
                Err(OrderError::InsufficientStock { .. }) => out_of_stock += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(ok, 5);
        assert_eq!(out_of_stock, 5);

        seqs.sort_unstable();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

        let variant = service
            .db
            .variants()
            .get_by_id(&variant_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(variant.stock, 0);

        service.db.close().await;
        remove_db_files(&db_path);
    }

    #[tokio::test]
    async fn test_catalog_price_change_never_touches_committed_order() {
        let service = test_service().await;
        let variant_id = seed_variant(&service, "SHIRT-M", 10000, None, 10).await;

        let placed = service
            .place_order(&request(vec![item(&variant_id, 1)]))
            .await
            .unwrap();
        assert_eq!(placed.items[0].unit_price_cents, 10000);

        // Reprice the catalog after the fact
        sqlx::query("UPDATE products SET price_cents = 99999")
            .execute(service.db.pool())
            .await
            .unwrap();

        let details = service
            .db
            .orders()
            .get_details(&placed.order.id)
            .await
            .unwrap();
        assert_eq!(details.items[0].unit_price_cents, 10000);
    }
}
