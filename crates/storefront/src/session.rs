//! Composition root of a storefront session.
//!
//! A [`Session`] owns the cart store (rehydrated from storage on open), the
//! catalog client and the terminal renderer, and tracks which section is on
//! screen. One session lives for one process: a single command, or a whole
//! interactive shell.

use std::io::Write;

use tracing::{debug, info};

use menu_cart_core::{
    Cart, CartPresenter, CartStorage, CartStore, Category, ItemId, PersistenceAdapter,
    RenderModel, Section,
};

use crate::catalog::CatalogClient;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::render::{TerminalRenderer, ViewHandle};

/// A running storefront session.
pub struct Session<S, W> {
    store: CartStore<S>,
    catalog: CatalogClient,
    renderer: TerminalRenderer<W>,
    view: ViewHandle,
}

impl<S, W> Session<S, W>
where
    S: CartStorage,
    W: Write + Clone + 'static,
{
    /// Rehydrate the cart from `storage` and wire the presenter to `out`.
    pub fn open(storage: S, catalog: CatalogClient, out: W, currency: &str) -> Self {
        let view = ViewHandle::default();
        let renderer = TerminalRenderer::new(out, currency, view.clone());

        let mut store = CartStore::open(PersistenceAdapter::new(storage));
        store.attach(Box::new(CartPresenter::new(renderer.clone())));
        info!(
            entries = store.cart().len(),
            total = %store.total(),
            "Session opened"
        );

        Self {
            store,
            catalog,
            renderer,
            view,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    #[must_use]
    pub fn current_section(&self) -> Option<Section> {
        self.view.current()
    }

    /// Switch sections. Entering the cart view draws the cart.
    pub fn navigate(&mut self, section: Section) {
        let previous = self.view.show(section);
        if section.is_cart() && previous != Some(Section::Cart) {
            self.draw_cart();
        }
    }

    /// Follow a navigation anchor. Menu sections are fetched and drawn.
    pub async fn go_to(&mut self, section: Section) {
        debug!(section = section.id(), "Navigating");
        match section {
            Section::Cart => self.navigate(section),
            Section::Menu(category) => self.show_menu(Some(category)).await,
        }
    }

    /// Show the cart view, redrawing it even if it is already on screen.
    pub fn show_cart(&mut self) {
        self.view.show(Section::Cart);
        self.draw_cart();
    }

    /// Fetch and draw one category, or every category when `None`.
    pub async fn show_menu(&mut self, category: Option<Category>) {
        if let Some(category) = category {
            self.view.show(Section::Menu(category));
            let entries = self.catalog.fetch(category).await;
            self.renderer.draw_menu(category, &entries);
            return;
        }

        let [soups, drinks, desserts, main_courses] = Category::ALL;
        let (a, b, c, d) = tokio::join!(
            self.catalog.fetch(soups),
            self.catalog.fetch(drinks),
            self.catalog.fetch(desserts),
            self.catalog.fetch(main_courses),
        );

        self.view.show(Section::Menu(soups));
        for (category, entries) in Category::ALL.into_iter().zip([a, b, c, d]) {
            self.renderer.draw_menu(category, &entries);
        }
    }

    /// Add one unit of a menu item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category has no item with this id,
    /// including when the catalog could not be fetched.
    pub async fn add(&mut self, category: Category, id: &ItemId) -> Result<()> {
        self.view.show(Section::Menu(category));

        let entry = self
            .catalog
            .find(category, id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("item {id} in {category}")))?;

        add_breadcrumb("cart", "Added item", Some(&[("id", id.as_str())]));
        self.store.add(&entry);
        Ok(())
    }

    /// Change the quantity of a cart item; below one removes it.
    ///
    /// Returns `false` and leaves the cart alone if the item is not in it.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) -> bool {
        if !self.enter_cart_for_edit(id) {
            return false;
        }
        self.store.set_quantity(id, quantity);
        true
    }

    /// Remove an item from the cart.
    ///
    /// Returns `false` and leaves the cart alone if the item is not in it.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        self.enter_cart_for_edit(id) && self.store.remove(id)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.view.show(Section::Cart);
        self.store.clear();
    }

    /// Show the cart and return what would be ordered, or `None` if empty.
    pub fn preview_checkout(&mut self) -> Option<RenderModel> {
        self.show_cart();
        let cart = self.store.cart();
        (!cart.is_empty()).then(|| CartPresenter::present(cart))
    }

    /// Place the order and empty the cart.
    pub fn place_order(&mut self) -> Option<Cart> {
        self.view.show(Section::Cart);
        add_breadcrumb("cart", "Checked out", None);
        self.store.checkout()
    }

    /// Write a message to the terminal.
    pub fn say(&mut self, text: &str) {
        self.renderer.write_text(text);
    }

    fn draw_cart(&mut self) {
        let model = CartPresenter::present(self.store.cart());
        self.renderer.draw_cart(&model);
    }

    /// Cart edits happen from the cart view. If the id is unknown, say so and
    /// show the cart so the user can see what is in it.
    fn enter_cart_for_edit(&mut self, id: &ItemId) -> bool {
        if self.store.get(id).is_some() {
            self.view.show(Section::Cart);
            return true;
        }

        debug!(%id, "Edit of item not in cart ignored");
        self.say(&format!("Item {id} is not in the cart.\n"));
        self.navigate(Section::Cart);
        false
    }
}

impl<S, W> std::fmt::Debug for Session<S, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("catalog", &self.catalog)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}
