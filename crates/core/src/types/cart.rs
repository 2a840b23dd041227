//! Cart entries and the cart collection.
//!
//! Entries keep their fields private so that only the store can mutate them.
//! Every mutation recomputes `total_price` from `price * quantity`, which is
//! what keeps the invariant intact even when a rehydrated entry and a freshly
//! fetched catalog entry disagree on price.

use serde::Serialize;

use super::catalog::CatalogEntry;
use super::id::ItemId;
use super::price::Price;

/// A selected item in the cart.
///
/// Serialized as `{ "id", "name", "price", "image", "quantity", "totalPrice" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    id: ItemId,
    name: String,
    price: Price,
    image: String,
    quantity: u32,
    total_price: Price,
}

impl CartEntry {
    /// Start a cart line for a catalog item with a quantity of one.
    #[must_use]
    pub fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            price: entry.price,
            image: entry.image.clone(),
            quantity: 1,
            total_price: entry.price,
        }
    }

    /// Rebuild an entry from stored fields, deriving the total.
    ///
    /// Returns `None` for a zero quantity. A quantity whose total would not
    /// fit is lowered the same way [`Price::times_capped`] does.
    #[must_use]
    pub fn restore(
        id: ItemId,
        name: String,
        price: Price,
        image: String,
        quantity: u32,
    ) -> Option<Self> {
        (quantity >= 1).then(|| {
            let (quantity, total_price) = price.times_capped(quantity);
            Self {
                id,
                name,
                price,
                image,
                quantity,
                total_price,
            }
        })
    }

    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Always at least one.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Always `price * quantity`.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.total_price
    }

    /// Add one unit. Returns the quantity applied.
    pub(crate) fn increment(&mut self) -> u32 {
        self.set_quantity(self.quantity.saturating_add(1))
    }

    /// Set an absolute quantity of at least one and recompute the total.
    ///
    /// The quantity is lowered if its total would overflow. Returns the
    /// quantity applied.
    pub(crate) fn set_quantity(&mut self, quantity: u32) -> u32 {
        debug_assert!(quantity >= 1);
        let (quantity, total_price) = self.price.times_capped(quantity.max(1));
        self.quantity = quantity;
        self.total_price = total_price;
        quantity
    }
}

/// The ordered, unique-by-id collection of cart entries.
///
/// Order is the order in which items were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from entries, keeping the first entry for each id.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = CartEntry>) -> Self {
        let mut cart = Self::new();
        for entry in entries {
            if cart.get(entry.id()).is_none() {
                cart.entries.push(entry);
            }
        }
        cart
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by item id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id == *id)
    }

    /// Sum of every entry's total price.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.iter().map(CartEntry::total_price).sum()
    }

    /// Sum of quantities across entries.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity))
            .sum()
    }

    pub(crate) fn get_mut(&mut self, id: &ItemId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|entry| entry.id == *id)
    }

    pub(crate) fn push(&mut self, entry: CartEntry) {
        debug_assert!(self.get(entry.id()).is_none());
        self.entries.push(entry);
    }

    pub(crate) fn remove(&mut self, id: &ItemId) -> Option<CartEntry> {
        let index = self.entries.iter().position(|entry| entry.id == *id)?;
        Some(self.entries.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
