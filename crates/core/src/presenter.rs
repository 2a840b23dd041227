//! Projection of cart state for the view layer.
//!
//! [`CartPresenter`] listens to the store and, after every mutation, builds a
//! fresh [`RenderModel`] and hands it to the attached [`Renderer`]. The whole
//! cart is re-projected each time; there is no diffing.

use serde::Serialize;
use tracing::debug;

use crate::store::{CartListener, CartNotice};
use crate::types::{Cart, CartEntry, ItemId, Price};

/// Display fields of one cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderLine {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub total_price: Price,
    pub image: String,
}

impl From<&CartEntry> for RenderLine {
    fn from(entry: &CartEntry) -> Self {
        Self {
            id: entry.id().clone(),
            name: entry.name().to_string(),
            price: entry.price(),
            quantity: entry.quantity(),
            total_price: entry.total_price(),
            image: entry.image().to_string(),
        }
    }
}

/// Everything the view layer needs to draw the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    /// Entries in cart order.
    pub lines: Vec<RenderLine>,
    pub grand_total: Price,
    /// Sum of quantities, for a cart badge.
    pub item_count: u64,
}

impl RenderModel {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// External view layer that draws render models.
pub trait Renderer {
    /// Redraw the cart from scratch.
    fn render(&mut self, model: &RenderModel);

    /// Show a transient message such as "added to cart".
    fn notify(&mut self, _notice: &CartNotice) {}
}

/// Bridges store mutations to an optional renderer.
#[derive(Default)]
pub struct CartPresenter {
    renderer: Option<Box<dyn Renderer>>,
}

impl CartPresenter {
    /// Create a presenter drawing to `renderer`.
    pub fn new(renderer: impl Renderer + 'static) -> Self {
        Self {
            renderer: Some(Box::new(renderer)),
        }
    }

    /// Create a presenter with no render target; hand-offs are skipped.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Project a cart into a render model.
    #[must_use]
    pub fn present(cart: &Cart) -> RenderModel {
        RenderModel {
            lines: cart.iter().map(RenderLine::from).collect(),
            grand_total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

impl CartListener for CartPresenter {
    fn cart_changed(&mut self, cart: &Cart) {
        let Some(renderer) = self.renderer.as_mut() else {
            debug!("No renderer attached, skipping cart render");
            return;
        };
        renderer.render(&Self::present(cart));
    }

    fn notice(&mut self, notice: &CartNotice) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.notify(notice);
        }
    }
}

impl std::fmt::Debug for CartPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPresenter")
            .field("has_renderer", &self.has_renderer())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::persistence::{MemoryStorage, PersistenceAdapter};
    use crate::store::CartStore;
    use crate::types::CatalogEntry;

    #[derive(Clone, Default)]
    struct SharedRenderer {
        models: Rc<RefCell<Vec<RenderModel>>>,
        notices: Rc<RefCell<Vec<CartNotice>>>,
    }

    impl Renderer for SharedRenderer {
        fn render(&mut self, model: &RenderModel) {
            self.models.borrow_mut().push(model.clone());
        }

        fn notify(&mut self, notice: &CartNotice) {
            self.notices.borrow_mut().push(notice.clone());
        }
    }

    fn store() -> CartStore<MemoryStorage> {
        CartStore::new(PersistenceAdapter::new(MemoryStorage::new()))
    }

    #[test]
    fn test_present_projects_lines_and_total() {
        let mut store = store();
        let soup = CatalogEntry::new("soup1", "Borscht", Price::from(150), "borscht.jpg");
        store.add(&soup);
        store.add(&soup);
        store.add(&CatalogEntry::new("d1", "Lemonade", Price::from(80), "lemonade.jpg"));
        store.set_quantity(&ItemId::new("d1"), 3);

        let model = CartPresenter::present(store.cart());

        assert_eq!(model.grand_total, Price::from(540));
        assert_eq!(model.item_count, 5);
        assert_eq!(model.lines.len(), 2);
        let first = model.lines.first().unwrap();
        assert_eq!(first.name, "Borscht");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.total_price, Price::from(300));
        assert_eq!(first.image, "borscht.jpg");
    }

    #[test]
    fn test_present_empty_cart() {
        let model = CartPresenter::present(&Cart::new());
        assert!(model.is_empty());
        assert_eq!(model.grand_total, Price::ZERO);
    }

    #[test]
    fn test_renders_after_every_mutation() {
        let renderer = SharedRenderer::default();
        let mut store = store();
        store.attach(Box::new(CartPresenter::new(renderer.clone())));

        let soup = CatalogEntry::new("soup1", "Borscht", Price::from(150), "");
        store.add(&soup);
        store.clear();

        let models = renderer.models.borrow();
        assert_eq!(models.len(), 3);
        assert_eq!(models.get(1).unwrap().grand_total, Price::from(150));
        assert!(models.last().unwrap().is_empty());
        assert_eq!(renderer.notices.borrow().len(), 1);
    }

    #[test]
    fn test_detached_presenter_skips_hand_off() {
        let mut presenter = CartPresenter::detached();
        assert!(!presenter.has_renderer());

        // Must not panic without a render target.
        presenter.cart_changed(&Cart::new());
        presenter.notice(&CartNotice::OrderPlaced {
            total: Price::ZERO,
            item_count: 0,
        });
    }

    #[test]
    fn test_render_model_serialized_shape() {
        let mut store = store();
        store.add(&CatalogEntry::new("d1", "Lemonade", Price::from(80), "l.jpg"));

        let json = serde_json::to_value(CartPresenter::present(store.cart())).unwrap();
        assert_eq!(json["lines"][0]["totalPrice"], 80.0);
        assert_eq!(json["grandTotal"], 80.0);
        assert_eq!(json["itemCount"], 1);
    }
}
