//! Cart persistence across page loads.
//!
//! The cart is single-writer, client-local state. A `CartSession` owns
//! the cart value plus an injected storage backend and writes the full
//! line list back after every mutation. Persistence failures are logged
//! and swallowed: the worst case on a crash is losing the most recent
//! mutation, never corrupting the store.

use crate::cart::{Cart, LineItem, LineKey};
use crate::error::CommerceError;
use crate::money::Currency;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Durable client-side storage for serialized cart blobs.
pub trait CartStorage {
    /// Load a value stored under `key`, if present.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CommerceError>;

    /// Store a value under `key`, replacing any previous value.
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CommerceError>;

    /// Remove the value stored under `key`.
    fn remove(&self, key: &str) -> Result<(), CommerceError>;
}

impl<S: CartStorage> CartStorage for &S {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CommerceError> {
        (**self).load(key)
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CommerceError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CommerceError> {
        (**self).remove(key)
    }
}

/// In-memory cart storage, used in tests and as a reference backend.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCartStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CommerceError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CommerceError::SerializationError("storage lock poisoned".into()))?;
        match entries.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CommerceError> {
        let raw = serde_json::to_string(value)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CommerceError::SerializationError("storage lock poisoned".into()))?;
        entries.insert(key.to_string(), raw);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CommerceError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CommerceError::SerializationError("storage lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// A cart bound to a storage backend.
///
/// All ledger operations go through here so every mutation is followed
/// by a persist. The mutation itself is never failed by storage: the
/// in-memory cart is the source of truth for the session.
pub struct CartSession<S: CartStorage> {
    cart: Cart,
    storage: S,
    storage_key: String,
}

impl<S: CartStorage> CartSession<S> {
    /// Open a session, restoring any previously persisted cart.
    ///
    /// An unreadable blob is treated as an empty cart rather than an
    /// error; the stale blob is overwritten on the next mutation.
    pub fn open(storage: S, storage_key: impl Into<String>, currency: Currency) -> Self {
        let storage_key = storage_key.into();
        let cart = match storage.load::<Cart>(&storage_key) {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(currency),
            Err(err) => {
                tracing::warn!(key = %storage_key, error = %err, "failed to restore cart, starting empty");
                Cart::new(currency)
            }
        };
        Self {
            cart,
            storage,
            storage_key,
        }
    }

    /// Read access to the cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add a line item and persist.
    pub fn add(&mut self, item: LineItem) -> Result<(), CommerceError> {
        self.cart.add(item)?;
        self.persist();
        Ok(())
    }

    /// Update a line quantity and persist.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i64) -> Result<bool, CommerceError> {
        let updated = self.cart.set_quantity(key, quantity)?;
        if updated {
            self.persist();
        }
        Ok(updated)
    }

    /// Remove a line and persist.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let removed = self.cart.remove(key);
        if removed {
            self.persist();
        }
        removed
    }

    /// Clear the cart and persist.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    /// Snapshot the line items for checkout, leaving the cart intact.
    ///
    /// Placement runs against the returned lines; callers `clear` only
    /// once the order is accepted, so a rejected submission keeps the
    /// cart to retry from.
    pub fn checkout_lines(&self) -> Vec<LineItem> {
        self.cart.lines.clone()
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.storage_key, &self.cart) {
            // Non-fatal: the session keeps its in-memory state.
            tracing::warn!(key = %self.storage_key, error = %err, "cart persistence failed");
        }
    }
}
