//! Repository traits for the document-shaped commerce records.
//!
//! The shared mutable counters (`used_count`, `sales_count`) and the
//! order status guard are expressed as single conditional operations so
//! an implementation can make them race-safe; callers never get a
//! separate read-check-write sequence.

use crate::StoreError;
use std::sync::Arc;
use vend_commerce::cart::Coupon;
use vend_commerce::catalog::Product;
use vend_commerce::checkout::Order;
use vend_commerce::ids::{OrderId, ProductId, UserId};

/// Catalog record access.
pub trait ProductRepository {
    /// Insert or replace a product.
    fn upsert_product(&self, product: Product) -> Result<(), StoreError>;

    /// Fetch a product by id.
    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Atomically add sold units to a product's sales counter.
    fn record_product_sales(&self, id: &ProductId, quantity: i64) -> Result<(), StoreError>;
}

/// Coupon record access.
pub trait CouponRepository {
    /// Insert a coupon; duplicate codes are rejected.
    fn insert_coupon(&self, coupon: Coupon) -> Result<(), StoreError>;

    /// Fetch a coupon by (case-insensitive) code.
    fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError>;

    /// Consume one redemption: increment `used_count` only if the
    /// usage limit still admits it.
    ///
    /// The check and the increment are a single atomic operation.
    /// Returns false when the limit is already consumed.
    fn redeem_coupon(&self, code: &str) -> Result<bool, StoreError>;

    /// Give back one redemption, e.g. when the order transition that
    /// consumed it lost its optimistic write. Never goes below zero.
    fn release_coupon(&self, code: &str) -> Result<(), StoreError>;
}

/// Order record access.
pub trait OrderRepository {
    /// Insert a newly placed order. All-or-nothing: on error, no
    /// partial order exists.
    fn insert_order(&self, order: Order) -> Result<(), StoreError>;

    /// Fetch an order by id.
    fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// All orders placed by a user, newest first.
    fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError>;

    /// Replace a stored order with its transitioned form, but only if
    /// the stored copy is still pending.
    ///
    /// This is the optimistic guard that makes a concurrently retried
    /// admin action a conflict instead of a duplicate side effect.
    fn store_transition(&self, order: &Order) -> Result<(), StoreError>;
}

impl<T: ProductRepository + ?Sized> ProductRepository for &T {
    fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).upsert_product(product)
    }

    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        (**self).product(id)
    }

    fn record_product_sales(&self, id: &ProductId, quantity: i64) -> Result<(), StoreError> {
        (**self).record_product_sales(id, quantity)
    }
}

impl<T: CouponRepository + ?Sized> CouponRepository for &T {
    fn insert_coupon(&self, coupon: Coupon) -> Result<(), StoreError> {
        (**self).insert_coupon(coupon)
    }

    fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        (**self).coupon_by_code(code)
    }

    fn redeem_coupon(&self, code: &str) -> Result<bool, StoreError> {
        (**self).redeem_coupon(code)
    }

    fn release_coupon(&self, code: &str) -> Result<(), StoreError> {
        (**self).release_coupon(code)
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for &T {
    fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        (**self).insert_order(order)
    }

    fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        (**self).order(id)
    }

    fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        (**self).orders_for_user(user)
    }

    fn store_transition(&self, order: &Order) -> Result<(), StoreError> {
        (**self).store_transition(order)
    }
}

impl<T: ProductRepository + ?Sized> ProductRepository for Arc<T> {
    fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).upsert_product(product)
    }

    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        (**self).product(id)
    }

    fn record_product_sales(&self, id: &ProductId, quantity: i64) -> Result<(), StoreError> {
        (**self).record_product_sales(id, quantity)
    }
}

impl<T: CouponRepository + ?Sized> CouponRepository for Arc<T> {
    fn insert_coupon(&self, coupon: Coupon) -> Result<(), StoreError> {
        (**self).insert_coupon(coupon)
    }

    fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        (**self).coupon_by_code(code)
    }

    fn redeem_coupon(&self, code: &str) -> Result<bool, StoreError> {
        (**self).redeem_coupon(code)
    }

    fn release_coupon(&self, code: &str) -> Result<(), StoreError> {
        (**self).release_coupon(code)
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        (**self).insert_order(order)
    }

    fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        (**self).order(id)
    }

    fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        (**self).orders_for_user(user)
    }

    fn store_transition(&self, order: &Order) -> Result<(), StoreError> {
        (**self).store_transition(order)
    }
}
