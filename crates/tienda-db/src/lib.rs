//! # tienda-db: Database Layer for the Tienda Order Engine
//!
//! This crate provides database access and the checkout transaction for the
//! order engine. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Order Placement Data Flow                           │
//! │                                                                         │
//! │  Caller (API handler, CLI, test)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tienda-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │   Checkout   │  │   │
//! │  │   │   (pool.rs)   │    │ (variant.rs,  │    │ (checkout.rs)│  │   │
//! │  │   │               │    │  order.rs)    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ VariantRepo   │◄───│ place_order  │  │   │
//! │  │   │ WAL + FK      │    │ OrderRepo     │    │ (atomic)     │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   Embedded migrations: migrations/sqlite/NNN_*.sql             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and order error types
//! - [`repository`] - Repository implementations (variant, order)
//! - [`checkout`] - The order-placement service
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tienda_db::{CheckoutConfig, CheckoutService, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tienda.db")).await?;
//! let checkout = CheckoutService::new(db, CheckoutConfig::load());
//!
//! let placed = checkout.place_order(&request).await?;
//! println!("invoice {}", placed.invoice.invoice_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutConfig, CheckoutService, PlacedOrder};
pub use error::{DbError, OrderError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::{OrderDetails, OrderRepository};
pub use repository::variant::VariantRepository;
