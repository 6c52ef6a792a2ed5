//! # tienda-core: Pure Business Logic for the Tienda Order Engine
//!
//! This crate is the **heart** of the order-placement engine. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Placement Data Flow                          │
//! │                                                                         │
//! │  Caller (API handler, CLI, test)                                       │
//! │       │                                                                 │
//! │       │  OrderRequest { items, address, invoice? }                      │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ tienda-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  intake   │  │  pricing  │  │   │
//! │  │   │   Order   │  │   Money   │  │ aggregate │  │  totals   │  │   │
//! │  │   │  Invoice  │  │  TaxRate  │  │ validate  │  │ line math │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tienda-db (checkout transaction: reserve stock, persist, sequence)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderLineItem, OrderInvoice, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`intake`] - Cart normalization: dedupe, aggregate, validate
//! - [`pricing`] - The pure pricing calculator
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod intake;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tienda_core::Money` instead of
// `use tienda_core::money::Money`

pub use error::ValidationError;
pub use intake::{AddressRequest, CartLine, InvoiceRequest, OrderItemRequest, OrderRequest};
pub use money::Money;
pub use pricing::{PricedLine, PricedOrder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax rate applied to every order, in basis points (1500 = 15%).
///
/// ## Why a constant?
/// The rate is a business configuration, never user input. Callers can
/// override it through `CheckoutConfig`, but the default lives here so
/// pricing stays consistent across the codebase.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1500;

/// Prefix for human-readable invoice numbers (e.g. `FAC-000042`).
pub const INVOICE_PREFIX: &str = "FAC-";

/// Zero-padding width of the numeric part of an invoice number.
pub const INVOICE_NUMBER_WIDTH: usize = 6;

/// Maximum distinct variants allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum aggregated quantity of a single variant in an order.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
