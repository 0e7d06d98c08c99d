//! Product catalog: products with plan pricing and price resolution.

mod pricing;
mod product;

pub use pricing::{resolve_price, PlanKey, ResolvedPrice};
pub use product::{AccountAccess, PlanConfig, Product};
