//! Cart ledger and line item types.
//!
//! Line identity is the (product, plan) pair: the same product added
//! under two different plans occupies two distinct lines, and the same
//! product+plan added twice merges quantities instead of duplicating.

use crate::catalog::{PlanKey, Product, ResolvedPrice};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Identity of a cart line: an explicit (product, plan) tuple.
///
/// The legacy `"{product}-{plan}"` string form survives only as the
/// `Display` rendering for the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    /// The product being purchased.
    pub product: ProductId,
    /// The pricing plan it was selected under.
    pub plan: PlanKey,
}

impl LineKey {
    /// Create a line key.
    pub fn new(product: ProductId, plan: PlanKey) -> Self {
        Self { product, plan }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.product, self.plan)
    }
}

/// A line item in the cart.
///
/// Display fields and prices are snapshots copied at add time, never
/// live-joined back to the catalog. A catalog edit after the item was
/// added does not touch the line; changing plan means remove + re-add,
/// which yields a new key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Line identity.
    pub key: LineKey,
    /// Product title at add time.
    pub title: String,
    /// Product image at add time.
    pub image: String,
    /// Product category at add time.
    pub category: String,
    /// Resolved unit price at add time.
    pub unit_price: Money,
    /// Resolved reference price at add time.
    pub reference_price: Money,
    /// Human validity label for the tier.
    pub validity: String,
    /// Quantity, always >= 1.
    pub quantity: i64,
}

impl LineItem {
    /// Snapshot a resolved (product, plan) selection into a line item.
    ///
    /// Uses the plan the resolver actually priced, so a fallback to the
    /// standard tier is reflected in the line identity.
    pub fn snapshot(
        product: &Product,
        resolved: &ResolvedPrice,
        quantity: i64,
    ) -> Result<Self, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        Ok(Self {
            key: LineKey::new(product.id.clone(), resolved.plan),
            title: product.title.clone(),
            image: product.image.clone(),
            category: product.category.clone(),
            unit_price: resolved.unit_price,
            reference_price: resolved.reference_price,
            validity: resolved.validity_label.clone(),
            quantity,
        })
    }

    /// Line total (unit price times quantity).
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// An ordered collection of line items keyed by (product, plan).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Items in the cart, in insertion order.
    pub lines: Vec<LineItem>,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of last mutation.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
            updated_at: current_timestamp(),
        }
    }

    /// Add a line item.
    ///
    /// If a line with the same (product, plan) key exists, quantities
    /// merge; otherwise the item is appended as a new line.
    pub fn add(&mut self, item: LineItem) -> Result<(), CommerceError> {
        if item.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(item.quantity));
        }

        if let Some(existing) = self.lines.iter_mut().find(|l| l.key == item.key) {
            let merged = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or(CommerceError::Overflow)?;
            if merged > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    merged,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            existing.quantity = merged;
            self.updated_at = current_timestamp();
            return Ok(());
        }

        if item.quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                item.quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        self.lines.push(item);
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Set a line's quantity, clamping to a minimum of 1.
    ///
    /// Zero or negative quantities are not representable; removing a
    /// line is an explicit `remove`. Returns false if the key is not in
    /// the cart.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> Result<bool, CommerceError> {
        let quantity = quantity.max(1);
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| &l.key == key) {
            line.quantity = quantity;
            self.updated_at = current_timestamp();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove a line from the cart.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.key != key);
        let removed = self.lines.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Clear all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.updated_at = current_timestamp();
    }

    /// Get a line by key.
    pub fn get(&self, key: &LineKey) -> Option<&LineItem> {
        self.lines.iter().find(|l| &l.key == key)
    }

    /// Sum of unit price times quantity over all lines.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        let mut total = Money::zero(self.currency);
        for line in &self.lines {
            let line_total = line.total()?;
            total = total
                .try_add(&line_total)
                .ok_or_else(|| CommerceError::CurrencyMismatch {
                    expected: self.currency.code().to_string(),
                    got: line_total.currency.code().to_string(),
                })?;
        }
        Ok(total)
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn unique_line_count(&self) -> usize {
        self.lines.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
