//! Plan-aware commerce domain types and logic for Vend.
//!
//! This crate is the core of a digital-goods storefront where one
//! product can be sold under several concurrent pricing plans:
//!
//! - **Catalog**: products with per-plan pricing and price resolution
//! - **Cart**: a ledger of line items keyed by (product, plan), with
//!   coupons and injected persistence
//! - **Checkout**: order placement and the admin-driven fulfillment
//!   lifecycle that attaches delivery secrets
//!
//! # Example
//!
//! ```rust,ignore
//! use vend_commerce::prelude::*;
//!
//! let resolved = resolve_price(&product, PlanKey::Monthly);
//! let line = LineItem::snapshot(&product, &resolved, 1)?;
//!
//! let mut cart = Cart::new(Currency::BDT);
//! cart.add(line)?;
//! println!("Subtotal: {}", cart.subtotal()?.display());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        resolve_price, AccountAccess, PlanConfig, PlanKey, Product, ResolvedPrice,
    };

    // Cart
    pub use crate::cart::{
        Cart, CartSession, CartStorage, Coupon, CouponDiscount, CouponRejection, LineItem, LineKey,
    };

    // Checkout
    pub use crate::checkout::{
        build_order, AppliedCoupon, BuyerInfo, DeliveredContent, Order, OrderLine, OrderStatus,
        PaymentProof, PaymentStatus,
    };
}
