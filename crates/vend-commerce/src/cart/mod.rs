//! Cart ledger, line identity, coupons, and cart persistence.

mod cart;
mod coupon;
mod session;

pub use cart::{Cart, LineItem, LineKey, MAX_QUANTITY_PER_ITEM};
pub use coupon::{normalize_code, Coupon, CouponDiscount, CouponRejection};
pub use session::{CartSession, CartStorage, MemoryCartStorage};
