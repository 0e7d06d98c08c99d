//! Commerce error types.

use crate::cart::CouponRejection;
use thiserror::Error;

/// Errors that can occur in commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Coupon code not found.
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Coupon found but not redeemable.
    #[error("Coupon {code} rejected: {reason}")]
    CouponRejected {
        code: String,
        reason: CouponRejection,
    },

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Cart is empty at checkout.
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    /// Required buyer contact field is missing.
    #[error("Missing required field: {0}")]
    MissingBuyerField(&'static str),

    /// Payable order submitted without a transaction reference.
    #[error("A transaction ID is required for paid orders")]
    MissingTransactionId,

    /// Completion attempted without any delivery content.
    #[error("Completing an order requires delivery content")]
    MissingDeliveredContent,

    /// Transition attempted on an order that is no longer pending.
    #[error("Order already processed: status is {status}")]
    OrderNotPending { status: &'static str },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
