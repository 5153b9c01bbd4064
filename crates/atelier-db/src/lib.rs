//! # atelier-db: Storage for Atelier POS
//!
//! The catalog store and the sale ledger, both on one SQLite file through
//! sqlx. Business rules live in `atelier-core`; this crate persists them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atelier POS Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    atelier-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Ledger    │  │   │
//! │  │   │   (pool.rs)   │    │               │    │ (ledger.rs)  │  │   │
//! │  │   │               │    │ Product       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Supplier      │◄───│ one tx per   │  │   │
//! │  │   │ commit lock   │    │ Discount      │    │ checkout     │  │   │
//! │  │   │ migrations    │    │ Sale (read)   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   <data dir>/atelier.db                                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - connection pool and repository handles
//! - [`migrations`] - embedded schema migrations
//! - [`error`] - storage errors and the combined `StoreError`
//! - [`repository`] - product, supplier, discount and sale tables
//! - [`ledger`] - atomic sale commit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atelier_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("data/atelier.db")).await?;
//!
//! let scarf = db.products().find_by_barcode("8901234567890").await?;
//! let sale = db.ledger().commit(&request, "ATL").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use ledger::Ledger;
pub use pool::{Database, DbConfig};

pub use repository::discount::DiscountRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;
