//! Checkout: order placement and the fulfillment lifecycle.

mod order;
mod place;

pub use order::{
    DeliveredContent, Order, OrderLine, OrderStatus, PaymentStatus, FREE_PAYMENT_METHOD,
    FREE_TRANSACTION_ID, NOT_APPLICABLE,
};
pub use place::{build_order, AppliedCoupon, BuyerInfo, PaymentProof};
