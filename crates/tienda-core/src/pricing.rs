//! # Pricing Module
//!
//! Deterministic order pricing: server-side prices only, one rounding step.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Pricing                                    │
//! │                                                                         │
//! │  [(ResolvedVariant, qty), ...]   ← catalog rows joined by the caller   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each line:                                                         │
//! │    unit price = sale price if set, else list price                     │
//! │    line total = unit price × qty        (exact integer math)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal = Σ line totals                                               │
//! │  tax      = round(subtotal × rate)      ← THE ONLY ROUNDING STEP       │
//! │  total    = subtotal + tax              (exact, no drift possible)     │
//! │                                                                         │
//! │  Client-submitted prices are NEVER trusted. Pricing reads only what    │
//! │  the catalog says right now.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{ResolvedVariant, TaxRate};

// =============================================================================
// Priced Output
// =============================================================================

/// One priced order line, ready to be persisted as an order item.
///
/// `unit_price_cents` is the effective price snapshotted at pricing time;
/// later catalog edits never touch historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_variant_id: String,
    pub sku: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// A fully priced order: lines plus the three order-level amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub sub_total_cents: i64,
    pub total_tax_cents: i64,
    pub total_amount_cents: i64,
    /// Sum of quantities across all lines.
    pub total_items: i64,
}

impl PricedOrder {
    pub fn sub_total(&self) -> Money {
        Money::from_cents(self.sub_total_cents)
    }

    pub fn total_tax(&self) -> Money {
        Money::from_cents(self.total_tax_cents)
    }

    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices an order from resolved catalog variants and aggregated quantities.
///
/// ## Determinism
/// Output depends only on the input slice and the tax rate. Line order is
/// preserved from the input, so the same cart always prices identically.
///
/// ## Rounding
/// Line totals are exact integer products. Tax is computed once on the
/// order subtotal with half-up rounding, and the grand total is
/// `subtotal + tax` - an exact sum, never an independently rounded figure.
pub fn price_order(lines: &[(ResolvedVariant, i64)], tax_rate: TaxRate) -> PricedOrder {
    let mut priced = Vec::with_capacity(lines.len());
    let mut sub_total = Money::zero();
    let mut total_items: i64 = 0;

    for (variant, quantity) in lines {
        let unit_price = variant.effective_price();
        let line_total = unit_price.multiply_quantity(*quantity);

        sub_total += line_total;
        total_items += quantity;

        priced.push(PricedLine {
            product_variant_id: variant.id.clone(),
            sku: variant.sku.clone(),
            unit_price_cents: unit_price.cents(),
            quantity: *quantity,
            line_total_cents: line_total.cents(),
        });
    }

    let tax = sub_total.calculate_tax(tax_rate);
    let total = sub_total + tax;

    PricedOrder {
        lines: priced,
        sub_total_cents: sub_total.cents(),
        total_tax_cents: tax.cents(),
        total_amount_cents: total.cents(),
        total_items,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
