//! Durable round-trip of the cart across sessions.
//!
//! The cart is written as a whole to a single storage key after every
//! mutation. The stored value is a versioned envelope:
//!
//! ```json
//! { "version": 1, "savedAt": "2026-10-18T12:00:00Z", "items": [ { "id": "soup1", ... } ] }
//! ```
//!
//! A bare JSON array of entries (the unversioned legacy format) is still
//! accepted on load. Anything unreadable degrades to an empty cart and is
//! logged; `load` never fails.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::catalog::deserialize_unit_price;
use crate::types::{Cart, CartEntry, ItemId, Price};

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Current version of the stored envelope.
pub const STORAGE_VERSION: u32 = 1;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be reached or is in a broken state.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A durable key-value slot for serialized carts.
///
/// Implementations always replace the whole value; there are no partial writes.
pub trait CartStorage {
    /// Read the value stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage.
///
/// Clones share the same slots, so a second adapter built from a clone sees
/// what the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with a pre-populated slot.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut slots) = storage.slots.write() {
            slots.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".into()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a Cart,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCart {
    Versioned {
        version: u32,
        items: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    id: ItemId,
    name: String,
    #[serde(deserialize_with = "deserialize_unit_price")]
    price: Price,
    #[serde(default)]
    image: String,
    quantity: i64,
    #[serde(default)]
    total_price: Option<serde_json::Value>,
}

/// Serializes the cart to, and rehydrates it from, a [`CartStorage`] slot.
#[derive(Debug, Clone)]
pub struct PersistenceAdapter<S> {
    storage: S,
    key: String,
}

impl<S: CartStorage> PersistenceAdapter<S> {
    /// Create an adapter writing to the default [`CART_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, CART_KEY)
    }

    /// Create an adapter writing to a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Write the whole cart to storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let envelope = Envelope {
            version: STORAGE_VERSION,
            saved_at: Utc::now(),
            items: cart,
        };
        let value = serde_json::to_string(&envelope)?;
        self.storage.write(&self.key, &value)?;
        debug!(key = %self.key, entries = cart.len(), "Cart saved");
        Ok(())
    }

    /// Read the cart back from storage.
    ///
    /// Returns an empty cart when nothing is stored, when storage cannot be
    /// read, or when the stored value is unreadable.
    pub fn load(&self) -> Cart {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Cart storage unavailable, starting empty");
                return Cart::new();
            }
        };

        let items = match serde_json::from_str::<StoredCart>(&raw) {
            Ok(StoredCart::Versioned { version, items }) if version == STORAGE_VERSION => items,
            Ok(StoredCart::Versioned { version, .. }) => {
                warn!(key = %self.key, version, "Unsupported cart format version, starting empty");
                return Cart::new();
            }
            Ok(StoredCart::Legacy(items)) => {
                debug!(key = %self.key, "Loading legacy unversioned cart");
                items
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored cart is corrupted, starting empty");
                return Cart::new();
            }
        };

        let cart = Cart::from_entries(sanitize(items));
        debug!(key = %self.key, entries = cart.len(), "Cart loaded");
        cart
    }
}

/// Turn stored values into valid entries, dropping anything that cannot
/// satisfy the cart invariants.
fn sanitize(items: Vec<serde_json::Value>) -> Vec<CartEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());

    for (index, value) in items.into_iter().enumerate() {
        let stored = match serde_json::from_value::<StoredEntry>(value) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(index, error = %e, "Dropping unreadable cart entry");
                continue;
            }
        };

        let Some(quantity) = u32::try_from(stored.quantity).ok().filter(|q| *q >= 1) else {
            warn!(id = %stored.id, quantity = stored.quantity, "Dropping cart entry with invalid quantity");
            continue;
        };

        if !seen.insert(stored.id.clone()) {
            warn!(id = %stored.id, "Dropping duplicate cart entry");
            continue;
        }

        let Some(entry) =
            CartEntry::restore(stored.id, stored.name, stored.price, stored.image, quantity)
        else {
            continue;
        };

        if entry.quantity() < quantity {
            warn!(
                id = %entry.id(),
                stored = quantity,
                restored = entry.quantity(),
                "Stored quantity lowered so the total fits"
            );
        }

        // The total is always derived; the stored one is only checked.
        match stored.total_price.map(serde_json::from_value::<Price>) {
            Some(Ok(total)) if total != entry.total_price() => warn!(
                id = %entry.id(),
                stored = %total,
                recomputed = %entry.total_price(),
                "Stored total disagrees with price * quantity, recomputed"
            ),
            Some(Err(e)) => warn!(
                id = %entry.id(),
                error = %e,
                "Stored total is unreadable, recomputed"
            ),
            _ => {}
        }

        entries.push(entry);
    }

    entries
}
