//! In-memory store implementation.
//!
//! Each collection sits behind its own mutex; the conditional
//! operations (coupon redemption, sales counters, order transition
//! guard) run entirely under one lock acquisition, which makes them
//! atomic with respect to concurrent callers.

use crate::repo::{CouponRepository, OrderRepository, ProductRepository};
use crate::StoreError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use vend_commerce::cart::{normalize_code, Coupon};
use vend_commerce::catalog::Product;
use vend_commerce::checkout::{Order, OrderStatus};
use vend_commerce::ids::{OrderId, ProductId, UserId};

/// In-memory document store for products, orders, and coupons.
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: Mutex<HashMap<String, Product>>,
    orders: Mutex<HashMap<String, Order>>,
    // Keyed by normalized coupon code.
    coupons: Mutex<HashMap<String, Coupon>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend(format!("{} lock poisoned", name)))
}

impl ProductRepository for MemoryStore {
    fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut products = lock(&self.products, "products")?;
        products.insert(product.id.as_str().to_string(), product);
        Ok(())
    }

    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let products = lock(&self.products, "products")?;
        Ok(products.get(id.as_str()).cloned())
    }

    fn record_product_sales(&self, id: &ProductId, quantity: i64) -> Result<(), StoreError> {
        let mut products = lock(&self.products, "products")?;
        let product = products
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        product.record_sales(quantity);
        Ok(())
    }
}

impl CouponRepository for MemoryStore {
    fn insert_coupon(&self, coupon: Coupon) -> Result<(), StoreError> {
        let mut coupons = lock(&self.coupons, "coupons")?;
        let key = coupon.code.clone();
        if coupons.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("coupon {}", key)));
        }
        coupons.insert(key, coupon);
        Ok(())
    }

    fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let coupons = lock(&self.coupons, "coupons")?;
        Ok(coupons.get(&normalize_code(code)).cloned())
    }

    fn redeem_coupon(&self, code: &str) -> Result<bool, StoreError> {
        let mut coupons = lock(&self.coupons, "coupons")?;
        let coupon = coupons
            .get_mut(&normalize_code(code))
            .ok_or_else(|| StoreError::NotFound(format!("coupon {}", code)))?;
        if coupon.is_exhausted() {
            return Ok(false);
        }
        coupon.used_count += 1;
        Ok(true)
    }

    fn release_coupon(&self, code: &str) -> Result<(), StoreError> {
        let mut coupons = lock(&self.coupons, "coupons")?;
        let coupon = coupons
            .get_mut(&normalize_code(code))
            .ok_or_else(|| StoreError::NotFound(format!("coupon {}", code)))?;
        coupon.used_count = (coupon.used_count - 1).max(0);
        Ok(())
    }
}

impl OrderRepository for MemoryStore {
    fn insert_order(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = lock(&self.orders, "orders")?;
        let key = order.id.as_str().to_string();
        if orders.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("order {}", key)));
        }
        orders.insert(key, order);
        Ok(())
    }

    fn order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let orders = lock(&self.orders, "orders")?;
        Ok(orders.get(id.as_str()).cloned())
    }

    fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        let orders = lock(&self.orders, "orders")?;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| &o.user == user)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    fn store_transition(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = lock(&self.orders, "orders")?;
        let stored = orders
            .get_mut(order.id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("order {}", order.id)))?;
        if stored.status != OrderStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "order {} is {}",
                order.id,
                stored.status.as_str()
            )));
        }
        *stored = order.clone();
        Ok(())
    }
}
