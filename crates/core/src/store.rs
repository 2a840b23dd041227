//! The cart store.
//!
//! [`CartStore`] is the single owner of the cart. Every effective mutation is
//! committed the same way: write the whole cart through the
//! [`PersistenceAdapter`], then notify every attached [`CartListener`].
//! Operations referencing an id that is not in the cart change nothing and
//! commit nothing.
//!
//! # Example
//!
//! ```rust
//! use menu_cart_core::{CartStore, CatalogEntry, ItemId, MemoryStorage, PersistenceAdapter, Price};
//!
//! let mut store = CartStore::open(PersistenceAdapter::new(MemoryStorage::new()));
//! let soup = CatalogEntry::new("soup1", "Borscht", Price::from(150), "borscht.jpg");
//!
//! store.add(&soup);
//! store.add(&soup);
//! assert_eq!(store.total(), Price::from(300));
//!
//! store.set_quantity(&ItemId::new("soup1"), 0);
//! assert!(store.cart().is_empty());
//! ```

use tracing::{debug, error, info, warn};

use crate::persistence::{CartStorage, PersistenceAdapter};
use crate::types::{Cart, CartEntry, CatalogEntry, ItemId, Price};

/// One-off messages for the user, emitted alongside a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartNotice {
    /// An item was added (or its quantity bumped) from the menu.
    Added { id: ItemId, name: String },
    /// The cart was checked out and cleared.
    OrderPlaced { total: Price, item_count: u64 },
}

/// Subscriber to cart mutations.
pub trait CartListener {
    /// Called after every committed mutation, and once when attached.
    fn cart_changed(&mut self, cart: &Cart);

    /// Called before `cart_changed` for mutations that carry a notice.
    fn notice(&mut self, _notice: &CartNotice) {}
}

/// Session lifecycle of the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    Empty,
    Populated,
}

/// Owner of the cart and its invariants.
pub struct CartStore<S> {
    cart: Cart,
    persistence: PersistenceAdapter<S>,
    listeners: Vec<Box<dyn CartListener>>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store with an empty cart, without reading storage.
    pub fn new(persistence: PersistenceAdapter<S>) -> Self {
        Self {
            cart: Cart::new(),
            persistence,
            listeners: Vec::new(),
        }
    }

    /// Create a store rehydrated from storage.
    pub fn open(persistence: PersistenceAdapter<S>) -> Self {
        let cart = persistence.load();
        info!(entries = cart.len(), "Cart restored");
        Self {
            cart,
            persistence,
            listeners: Vec::new(),
        }
    }

    /// Subscribe a listener and bring it up to date with the current cart.
    pub fn attach(&mut self, mut listener: Box<dyn CartListener>) {
        listener.cart_changed(&self.cart);
        self.listeners.push(listener);
    }

    /// Add one unit of a catalog item.
    ///
    /// An item already in the cart gets its quantity bumped by one; a new item
    /// is appended with a quantity of one regardless of the catalog's
    /// informational quantity.
    pub fn add(&mut self, entry: &CatalogEntry) {
        if let Some(existing) = self.cart.get_mut(&entry.id) {
            let before = existing.quantity();
            let quantity = existing.increment();
            if quantity == before {
                warn!(id = %entry.id, quantity, "Cart entry total is at its limit, quantity unchanged");
            }
            debug!(id = %entry.id, quantity, "Incremented cart entry");
        } else {
            self.cart.push(CartEntry::from_catalog(entry));
            debug!(id = %entry.id, "Added cart entry");
        }

        self.commit(Some(&CartNotice::Added {
            id: entry.id.clone(),
            name: entry.name.clone(),
        }));
    }

    /// Set the quantity of an entry.
    ///
    /// A quantity below one removes the entry. Quantities beyond `u32::MAX`
    /// saturate, and a quantity whose total would overflow is lowered to the
    /// largest one that fits. Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) {
        if quantity < 1 {
            self.remove(id);
            return;
        }

        let Some(entry) = self.cart.get_mut(id) else {
            debug!(%id, "Ignoring quantity change for item not in cart");
            return;
        };

        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        let quantity = entry.set_quantity(requested);
        if quantity < requested {
            warn!(%id, requested, quantity, "Quantity lowered so the total fits");
        }
        debug!(%id, quantity, "Updated cart entry quantity");

        self.commit(None);
    }

    /// Remove an entry. Returns whether anything was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        match self.cart.remove(id) {
            Some(removed) => {
                debug!(%id, name = removed.name(), "Removed cart entry");
                self.commit(None);
                true
            }
            None => {
                debug!(%id, "Ignoring removal of item not in cart");
                false
            }
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.cart.clear();
        debug!("Cleared cart");
        self.commit(None);
    }

    /// Place the order: snapshot the cart, then clear it.
    ///
    /// Returns `None` and changes nothing when the cart is empty.
    pub fn checkout(&mut self) -> Option<Cart> {
        if self.cart.is_empty() {
            return None;
        }

        let order = std::mem::take(&mut self.cart);
        info!(
            entries = order.len(),
            total = %order.total(),
            "Order placed"
        );

        self.commit(Some(&CartNotice::OrderPlaced {
            total: order.total(),
            item_count: order.item_count(),
        }));
        Some(order)
    }

    /// Sum of every entry's total price.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CartEntry> {
        self.cart.get(id)
    }

    /// Sum of quantities across entries.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub const fn state(&self) -> CartState {
        if self.cart.is_empty() {
            CartState::Empty
        } else {
            CartState::Populated
        }
    }

    /// Save, then notify listeners.
    fn commit(&mut self, notice: Option<&CartNotice>) {
        if let Err(e) = self.persistence.save(&self.cart) {
            error!(error = %e, "Failed to persist cart, keeping in-memory state");
        }

        for listener in &mut self.listeners {
            if let Some(notice) = notice {
                listener.notice(notice);
            }
            listener.cart_changed(&self.cart);
        }
    }
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::persistence::{MemoryStorage, StorageError};

    fn catalog(id: &str, price: i64) -> CatalogEntry {
        CatalogEntry::new(id, format!("Item {id}"), Price::from(price), "")
    }

    fn store() -> CartStore<MemoryStorage> {
        CartStore::new(PersistenceAdapter::new(MemoryStorage::new()))
    }

    fn assert_invariants(cart: &Cart) {
        let mut ids = std::collections::HashSet::new();
        for entry in cart {
            assert!(entry.quantity() >= 1);
            assert_eq!(
                Some(entry.total_price()),
                entry.price().checked_times(entry.quantity())
            );
            assert!(ids.insert(entry.id().clone()), "duplicate id {}", entry.id());
        }
    }

    #[derive(Default)]
    struct Recorded {
        renders: Vec<Cart>,
        notices: Vec<CartNotice>,
    }

    struct Recorder(Rc<RefCell<Recorded>>);

    impl CartListener for Recorder {
        fn cart_changed(&mut self, cart: &Cart) {
            self.0.borrow_mut().renders.push(cart.clone());
        }

        fn notice(&mut self, notice: &CartNotice) {
            self.0.borrow_mut().notices.push(notice.clone());
        }
    }

    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_add_accumulates() {
        let mut store = store();
        let soup = catalog("soup1", 150);

        store.add(&soup);
        store.add(&soup);

        assert_eq!(store.cart().len(), 1);
        let entry = store.get(&ItemId::new("soup1")).unwrap();
        assert_eq!(entry.quantity(), 2);
        assert_eq!(entry.total_price(), Price::from(300));
        assert_invariants(store.cart());
    }

    #[test]
    fn test_add_ignores_catalog_quantity() {
        let mut store = store();
        let mut soup = catalog("soup1", 150);
        soup.quantity = 7;

        store.add(&soup);
        assert_eq!(store.get(&ItemId::new("soup1")).unwrap().quantity(), 1);
    }

    #[test]
    fn test_add_keeps_invariant_when_catalog_price_changes() {
        let mut store = store();
        store.add(&catalog("soup1", 150));
        store.add(&catalog("soup1", 170));

        let entry = store.get(&ItemId::new("soup1")).unwrap();
        assert_eq!(entry.quantity(), 2);
        assert_invariants(store.cart());
    }

    #[test]
    fn test_set_quantity_recomputes_total() {
        let mut store = store();
        store.add(&catalog("d1", 80));

        store.set_quantity(&ItemId::new("d1"), 3);

        let entry = store.get(&ItemId::new("d1")).unwrap();
        assert_eq!(entry.quantity(), 3);
        assert_eq!(entry.total_price(), Price::from(240));
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let mut store = store();
        store.add(&catalog("d1", 80));
        store.add(&catalog("d2", 60));

        store.set_quantity(&ItemId::new("d1"), 0);
        store.set_quantity(&ItemId::new("d2"), -4);

        assert!(store.get(&ItemId::new("d1")).is_none());
        assert!(store.get(&ItemId::new("d2")).is_none());
        assert_eq!(store.state(), CartState::Empty);
    }

    #[test]
    fn test_set_quantity_saturates() {
        let mut store = store();
        store.add(&catalog("d1", 1));

        store.set_quantity(&ItemId::new("d1"), i64::MAX);
        assert_eq!(store.get(&ItemId::new("d1")).unwrap().quantity(), u32::MAX);
        assert_invariants(store.cart());
    }

    #[test]
    fn test_large_total_stays_exact_and_round_trips() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::new(PersistenceAdapter::new(storage.clone()));
        let price: Price = "100000000000000000000".parse().unwrap();
        let caviar = CatalogEntry::new("c1", "Caviar", price, "");
        let id = ItemId::new("c1");

        store.add(&caviar);
        store.set_quantity(&id, i64::from(u32::MAX));

        let entry = store.get(&id).unwrap();
        assert_eq!(entry.quantity(), 792_281_625);
        assert_eq!(
            entry.total_price(),
            "79228162500000000000000000000".parse().unwrap()
        );
        assert_invariants(store.cart());

        // Already at the limit: adding again keeps the exact total.
        store.add(&caviar);
        assert_eq!(store.get(&id).unwrap().quantity(), 792_281_625);

        let reopened = CartStore::open(PersistenceAdapter::new(storage));
        assert_eq!(reopened.cart(), store.cart());
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let mut store = store();
        store.add(&catalog("d1", 80));
        let before = store.cart().clone();

        store.set_quantity(&ItemId::new("missing"), 5);
        assert_eq!(store.cart(), &before);
    }

    #[test]
    fn test_total_aggregation() {
        let mut store = store();
        let soup = catalog("soup1", 150);
        store.add(&soup);
        store.add(&soup);
        store.add(&catalog("d1", 80));
        store.set_quantity(&ItemId::new("d1"), 3);

        assert_eq!(store.total(), Price::from(540));
        assert_eq!(store.item_count(), 5);
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut store = store();
        store.add(&catalog("soup1", 150));
        let before = store.cart().clone();

        assert!(!store.remove(&ItemId::new("missing")));
        assert_eq!(store.cart(), &before);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut store = store();
        store.add(&catalog("a", 10));
        store.add(&catalog("b", 20));
        store.add(&catalog("c", 30));

        assert!(store.remove(&ItemId::new("b")));

        let ids: Vec<_> = store.cart().iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut store = store();
        store.add(&catalog("soup1", 150));

        store.clear();
        let once = store.cart().clone();
        store.clear();

        assert_eq!(store.cart(), &once);
        assert!(store.cart().is_empty());
        assert_eq!(store.total(), Price::ZERO);
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::new(PersistenceAdapter::new(storage.clone()));
        let reload = || PersistenceAdapter::new(storage.clone()).load();

        store.add(&catalog("soup1", 150));
        assert_eq!(&reload(), store.cart());

        store.set_quantity(&ItemId::new("soup1"), 4);
        assert_eq!(&reload(), store.cart());

        store.add(&catalog("d1", 80));
        store.remove(&ItemId::new("soup1"));
        assert_eq!(&reload(), store.cart());

        store.clear();
        assert!(reload().is_empty());
    }

    #[test]
    fn test_open_rehydrates() {
        let storage = MemoryStorage::new();
        let mut first = CartStore::new(PersistenceAdapter::new(storage.clone()));
        first.add(&catalog("soup1", 150));
        first.add(&catalog("soup1", 150));

        let second = CartStore::open(PersistenceAdapter::new(storage));
        assert_eq!(second.cart(), first.cart());
        assert_eq!(second.state(), CartState::Populated);
    }

    #[test]
    fn test_listeners_are_notified() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut store = store();
        store.attach(Box::new(Recorder(Rc::clone(&recorded))));

        store.add(&catalog("soup1", 150));
        store.set_quantity(&ItemId::new("soup1"), 2);
        store.remove(&ItemId::new("missing"));
        store.clear();

        let recorded = recorded.borrow();
        // attach + add + set_quantity + clear; the no-op removal renders nothing
        assert_eq!(recorded.renders.len(), 4);
        assert!(recorded.renders.first().unwrap().is_empty());
        assert_eq!(recorded.renders.get(2).unwrap().total(), Price::from(300));
        assert_eq!(
            recorded.notices,
            [CartNotice::Added {
                id: ItemId::new("soup1"),
                name: "Item soup1".to_string(),
            }]
        );
    }

    #[test]
    fn test_checkout_clears_and_returns_order() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut store = store();
        store.add(&catalog("soup1", 150));
        store.attach(Box::new(Recorder(Rc::clone(&recorded))));

        let order = store.checkout().unwrap();
        assert_eq!(order.total(), Price::from(150));
        assert!(store.cart().is_empty());
        assert_eq!(
            recorded.borrow().notices.last(),
            Some(&CartNotice::OrderPlaced {
                total: Price::from(150),
                item_count: 1,
            })
        );
    }

    #[test]
    fn test_checkout_empty_cart_is_noop() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut store = store();
        store.attach(Box::new(Recorder(Rc::clone(&recorded))));

        assert!(store.checkout().is_none());
        assert_eq!(recorded.borrow().renders.len(), 1);
    }

    #[test]
    fn test_storage_failure_keeps_session_working() {
        let mut store = CartStore::open(PersistenceAdapter::new(BrokenStorage));
        assert!(store.cart().is_empty());

        store.add(&catalog("soup1", 150));
        store.set_quantity(&ItemId::new("soup1"), 2);

        assert_eq!(store.total(), Price::from(300));
        assert_invariants(store.cart());
    }

    #[test]
    fn test_invariants_hold_across_mixed_operations() {
        let mut store = store();
        let items = [catalog("a", 15), catalog("b", 99), catalog("c", 1)];

        for round in 0_i64..20 {
            let index = usize::try_from(round).unwrap() % items.len();
            let item = items.get(index).unwrap();
            store.add(item);
            if round % 3 == 0 {
                store.set_quantity(&item.id, round % 5 - 1);
            }
            if round % 7 == 0 {
                store.remove(&ItemId::new("b"));
            }
            assert_invariants(store.cart());
        }
    }
}
