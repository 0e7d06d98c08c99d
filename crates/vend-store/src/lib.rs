//! Document-shaped persistence for Vend commerce records.
//!
//! Defines repository traits for products, orders, and coupons, plus an
//! in-memory implementation. The traits carry the two places genuine
//! concurrency discipline matters as single conditional operations:
//! coupon redemption (compare-and-increment against the usage limit)
//! and order transitions (write only while still pending).

mod error;
mod memory;
mod repo;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use repo::{CouponRepository, OrderRepository, ProductRepository};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CouponRepository, MemoryStore, OrderRepository, ProductRepository, StoreError};
}
