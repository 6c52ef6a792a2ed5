//! # Repository Module
//!
//! Repository implementations for database access.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern                                  │
//! │                                                                         │
//! │  Caller (checkout service, API handler)                                │
//! │       │                                                                 │
//! │       │  "Resolve these variants" (domain language)                     │
//! │       ▼                                                                 │
//! │  VariantRepository / OrderRepository                                   │
//! │       │                                                                 │
//! │       │  SELECT ... JOIN ... (SQL language)                             │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL contained in one place per aggregate                            │
//! │  • Callers speak in domain types, not rows                             │
//! │  • Repositories are cheap clones over the shared pool                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod order;
pub mod variant;
