//! # Repository Module
//!
//! One repository per table group, each a thin handle over the shared pool.
//!
//! ```text
//! db.products()   ProductRepository   barcode lookup, CRUD, stock decrement
//! db.suppliers()  SupplierRepository  CRUD
//! db.discounts()  DiscountRepository  active list, CRUD
//! db.sales()      SaleRepository      history, lookup by receipt number
//! ```
//!
//! Functions that must also run inside the ledger's transaction take a
//! `&mut SqliteConnection` and are `pub(crate)`.

pub mod discount;
pub mod product;
pub mod sale;
pub mod supplier;
