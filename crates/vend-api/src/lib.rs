//! Service layer for the Vend storefront.
//!
//! Transport-free handlers over the domain, store, and auth crates:
//!
//! - [`CouponService`]: read-only coupon preview for the checkout form
//! - [`OrderService`]: order placement and buyer-facing order views
//! - [`FulfillmentService`]: admin-only complete/decline transitions
//!
//! Every error is folded into the [`ApiError`] taxonomy, which carries
//! the HTTP status a transport adapter should answer with.

mod coupon;
mod error;
mod fulfillment;
mod orders;

pub use coupon::{CouponCheck, CouponService};
pub use error::ApiError;
pub use fulfillment::FulfillmentService;
pub use orders::{OrderService, OrderView, PlaceOrderReceipt, PlaceOrderRequest};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiError, CouponCheck, CouponService, FulfillmentService, OrderService, OrderView,
        PlaceOrderReceipt, PlaceOrderRequest,
    };
}
