//! # Order Intake
//!
//! Normalizes a raw order request into validated, aggregated cart lines.
//!
//! ## Intake Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Intake Normalization                              │
//! │                                                                         │
//! │  OrderRequest                                                           │
//! │  ├── items: [ {variant A, qty 2}, {variant B, qty 1},                  │
//! │  │            {variant A, qty 3} ]   ← same variant twice              │
//! │  └── address: { firstName, lastName, email, ... }                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize() ← THIS MODULE                                             │
//! │       │                                                                 │
//! │       ├── empty cart?           → ValidationError::EmptyCart           │
//! │       ├── qty <= 0?             → ValidationError::MustBePositive      │
//! │       ├── malformed variant id? → ValidationError::InvalidFormat       │
//! │       ├── bad address field?    → ValidationError::{Required,TooShort} │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [ CartLine { variant A, qty 5 }, CartLine { variant B, qty 1 } ]      │
//! │    (deduplicated, quantities summed, first-seen order preserved)        │
//! │                                                                         │
//! │  Pure read + reshape: NO side effects, NO I/O                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{DocumentType, PaymentMethod};
use crate::validation::{
    validate_address_line, validate_email, validate_name, validate_national_id, validate_phone,
    validate_quantity, validate_uuid,
};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Request DTOs
// =============================================================================

/// A single requested item: which variant, how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_variant_id: String,
    pub quantity: i64,
}

/// Shipping address fields as submitted by the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub national_id: String,
    pub phone: String,
    pub address_line: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub city_id: String,
}

/// Optional invoice overrides. When absent, invoice fields default to the
/// address holder's identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    #[serde(default)]
    pub document_type: Option<DocumentType>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub legal_name: Option<String>,
}

/// The full order-placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub is_online_sale: Option<bool>,
    pub items: Vec<OrderItemRequest>,
    pub address: AddressRequest,
    #[serde(default)]
    pub invoice: Option<InvoiceRequest>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub coupon_id: Option<String>,
}

// =============================================================================
// Normalized Output
// =============================================================================

/// A validated, aggregated cart line: one distinct variant with the summed
/// quantity across every request entry that referenced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_variant_id: String,
    pub quantity: i64,
}

// =============================================================================
// Normalization
// =============================================================================

/// Validates an order request and collapses its items into unique
/// (variant, aggregated quantity) lines.
///
/// ## Behavior
/// - Rejects empty carts, non-positive quantities, malformed variant ids,
///   and invalid address fields - all before any I/O happens.
/// - Entries referencing the same variant are merged by summing quantities;
///   first-seen order is preserved so pricing output is deterministic.
///
/// ## Returns
/// The aggregated cart lines. Address/invoice fields stay on the request;
/// they are snapshotted by the persister after the transaction succeeds.
pub fn normalize(request: &OrderRequest) -> Result<Vec<CartLine>, ValidationError> {
    if request.items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    validate_address(&request.address)?;

    if let Some(user_id) = &request.user_id {
        validate_uuid("userId", user_id)?;
    }

    let mut lines: Vec<CartLine> = Vec::new();

    for item in &request.items {
        validate_uuid("productVariantId", &item.product_variant_id)?;
        validate_quantity(item.quantity)?;

        match lines
            .iter_mut()
            .find(|line| line.product_variant_id == item.product_variant_id)
        {
            Some(line) => line.quantity += item.quantity,
            None => lines.push(CartLine {
                product_variant_id: item.product_variant_id.clone(),
                quantity: item.quantity,
            }),
        }
    }

    if lines.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    // Per-entry quantities are positive, but the aggregate still has to
    // respect the per-line cap.
    for line in &lines {
        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_LINE_QUANTITY,
            });
        }
    }

    Ok(lines)
}

/// Validates every shipping-address field.
pub fn validate_address(address: &AddressRequest) -> Result<(), ValidationError> {
    validate_name("firstName", &address.first_name)?;
    validate_name("lastName", &address.last_name)?;
    validate_email(&address.email)?;
    validate_national_id(&address.national_id)?;
    validate_phone(&address.phone)?;
    validate_address_line(&address.address_line)?;
    validate_uuid("cityId", &address.city_id)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
