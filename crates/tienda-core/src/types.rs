//! # Domain Types
//!
//! Core domain types for the Tienda order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌──────────────────┐     │
//! │  │    Product      │   │  ProductVariant  │   │      Order       │     │
//! │  │  ─────────────  │   │  ──────────────  │   │  ──────────────  │     │
//! │  │  id (UUID)      │◄──│  product_id (FK) │   │  id (UUID)       │     │
//! │  │  title          │   │  sku (business)  │   │  payment_method  │     │
//! │  │  price_cents    │   │  stock (>= 0)    │   │  sub_total_cents │     │
//! │  │  sale_price?    │   │  stock_alert     │   │  total_items     │     │
//! │  └─────────────────┘   └──────────────────┘   └────────┬─────────┘     │
//! │                                                        │ owns          │
//! │              ┌───────────────────┬─────────────────────┤               │
//! │              ▼                   ▼                     ▼               │
//! │   ┌──────────────────┐  ┌────────────────┐  ┌──────────────────┐      │
//! │   │  OrderLineItem   │  │  OrderAddress  │  │   OrderInvoice   │      │
//! │   │  frozen price    │  │  shipping      │  │  seq (monotonic) │      │
//! │   │  quantity        │  │  snapshot      │  │  FAC-NNNNNN      │      │
//! │   └──────────────────┘  └────────────────┘  └──────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! An `Order` exclusively owns its line items, address, and invoice: none of
//! them exist without a committed order. `ProductVariant` is shared -
//! referenced by line items but owned by the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::{INVOICE_NUMBER_WIDTH, INVOICE_PREFIX};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15% (the order tax rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How an order is to be paid.
///
/// ## Note
/// The payment method is RECORDED, not executed - payment processing lives
/// outside this engine entirely.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash on delivery/pickup.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Online payment gateway.
    OnlineGateway,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::OnlineGateway
    }
}

// =============================================================================
// Document Type
// =============================================================================

/// Fiscal document type recorded on an invoice.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Personal identity card.
    Ci,
    /// Tax identification number (businesses).
    Nit,
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Ci
    }
}

// =============================================================================
// Product & Variant
// =============================================================================

/// A catalog product. Carries the price; its variants carry the stock.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display title shown to customers and on the invoice.
    pub title: String,

    /// Category name (denormalized snapshot for the invoice payload).
    pub category: String,

    /// Primary image URL, if any.
    pub image_url: Option<String>,

    /// List price in centavos.
    pub price_cents: i64,

    /// Sale price in centavos; when present it wins over the list price.
    pub sale_price_cents: Option<i64>,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the effective unit price: sale price if present, else list price.
    #[inline]
    pub fn effective_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents.unwrap_or(self.price_cents))
    }
}

/// A purchasable SKU-level unit of a product (specific size/color).
///
/// ## Stock Invariant
/// `stock >= 0` at every commit point. The only code allowed to decrement
/// it is the reservation step of the checkout transaction; restocking is
/// catalog management.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Size designation (e.g. "M", "42").
    pub size: String,

    /// Optional color designation.
    pub color: Option<String>,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Low-stock alert threshold (informational only).
    pub stock_alert: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductVariant {
    /// Whether stock has fallen to or below the alert threshold.
    pub fn is_low_stock(&self) -> bool {
        match self.stock_alert {
            Some(threshold) => self.stock <= threshold,
            None => false,
        }
    }
}

/// A variant joined with its product's price snapshot, as returned by the
/// catalog reader in one batch lookup.
///
/// ## Snapshot Semantics
/// The prices here are read once at intake time and frozen onto the order's
/// line items. Later catalog price changes never touch a committed order.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedVariant {
    pub id: String,
    pub product_id: String,
    pub sku: String,
    pub title: String,
    pub category: String,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub sale_price_cents: Option<i64>,
    pub stock: i64,
}

impl ResolvedVariant {
    /// The effective unit price: sale price if present, else list price.
    #[inline]
    pub fn effective_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents.unwrap_or(self.price_cents))
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed customer order.
///
/// ## Invariants
/// - `total_amount_cents == sub_total_cents + total_tax_cents` exactly
/// - `total_items == Σ line_item.quantity`
/// - Immutable once committed; update/cancel do not exist in this engine.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,

    /// Owning user, when the order was placed by an authenticated customer.
    pub user_id: Option<String>,

    pub payment_method: PaymentMethod,

    pub sub_total_cents: i64,
    pub total_tax_cents: i64,
    pub total_amount_cents: i64,

    /// Total units across all line items.
    pub total_items: i64,

    /// Whether the sale happened through the online storefront.
    pub is_online_sale: bool,

    /// Optional discount reference. Recorded only - no coupon math here.
    pub coupon_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn sub_total(&self) -> Money {
        Money::from_cents(self.sub_total_cents)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Order Line Item
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze the unit price at order time.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: String,
    pub order_id: String,
    pub product_variant_id: String,

    /// SKU at order time (frozen).
    pub sku_snapshot: String,

    /// Unit price in centavos at order time (frozen).
    /// This must not change if the catalog price later changes.
    pub unit_price_cents: i64,

    /// Aggregated quantity. Always > 0.
    pub quantity: i64,

    pub created_at: DateTime<Utc>,
}

impl OrderLineItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents * self.quantity)
    }
}

// =============================================================================
// Order Address
// =============================================================================

/// Shipping address snapshot, one-to-one with an order.
///
/// Independent of any saved address-book entry: editing a saved address
/// later must not rewrite history.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAddress {
    pub id: String,
    pub order_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// National identity document number.
    pub national_id: String,

    pub phone: String,
    pub address_line: String,

    /// Free-form delivery reference ("blue door, next to the bakery").
    pub reference: Option<String>,

    /// Opaque city reference; validity is the geography service's concern.
    pub city_id: String,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Invoice
// =============================================================================

/// Invoice record, one-to-one with an order.
///
/// ## Sequence Invariant
/// `seq` values are unique and strictly increasing across all committed
/// invoices. The value is assigned inside the order transaction, so an
/// aborted attempt never exposes a number.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInvoice {
    pub id: String,
    pub order_id: String,
    pub document_type: DocumentType,

    /// Fiscal tax id (NIT) or identity document number.
    pub tax_id: String,

    /// Legal name the invoice is issued to.
    pub legal_name: String,

    /// Monotonic sequence number, system-wide.
    pub seq: i64,

    /// Human-readable number derived from `seq`, e.g. `FAC-000042`.
    pub invoice_number: String,

    /// URL where the rendered invoice document can be fetched.
    pub invoice_url: String,

    pub created_at: DateTime<Utc>,
}

/// Formats a sequence value as a human-readable invoice number.
///
/// ## Example
/// ```rust
/// use tienda_core::types::format_invoice_number;
///
/// assert_eq!(format_invoice_number(42), "FAC-000042");
/// assert_eq!(format_invoice_number(1234567), "FAC-1234567");
/// ```
pub fn format_invoice_number(seq: i64) -> String {
    format!("{}{:0width$}", INVOICE_PREFIX, seq, width = INVOICE_NUMBER_WIDTH)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_fifteen_percent() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::OnlineGateway);
    }

    #[test]
    fn test_document_type_default() {
        assert_eq!(DocumentType::default(), DocumentType::Ci);
    }

    #[test]
    fn test_effective_price_prefers_sale_price() {
        let resolved = ResolvedVariant {
            id: "v1".to_string(),
            product_id: "p1".to_string(),
            sku: "SHIRT-M".to_string(),
            title: "Shirt".to_string(),
            category: "Shirts".to_string(),
            image_url: None,
            price_cents: 10000,
            sale_price_cents: Some(8000),
            stock: 5,
        };
        assert_eq!(resolved.effective_price().cents(), 8000);

        let no_sale = ResolvedVariant {
            sale_price_cents: None,
            ..resolved
        };
        assert_eq!(no_sale.effective_price().cents(), 10000);
    }

    #[test]
    fn test_low_stock() {
        let now = Utc::now();
        let variant = ProductVariant {
            id: "v1".to_string(),
            product_id: "p1".to_string(),
            sku: "SHIRT-M".to_string(),
            size: "M".to_string(),
            color: None,
            stock: 3,
            stock_alert: Some(5),
            created_at: now,
            updated_at: now,
        };
        assert!(variant.is_low_stock());

        let no_alert = ProductVariant {
            stock_alert: None,
            ..variant
        };
        assert!(!no_alert.is_low_stock());
    }

    #[test]
    fn test_format_invoice_number() {
        assert_eq!(format_invoice_number(1), "FAC-000001");
        assert_eq!(format_invoice_number(999999), "FAC-999999");
        // Width is a minimum, not a truncation
        assert_eq!(format_invoice_number(1000000), "FAC-1000000");
    }

    #[test]
    fn test_line_total() {
        let item = OrderLineItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_variant_id: "v1".to_string(),
            sku_snapshot: "SHIRT-M".to_string(),
            unit_price_cents: 10000,
            quantity: 2,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().cents(), 20000);
    }
}
