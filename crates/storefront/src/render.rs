//! Terminal rendering of the menu and the cart.
//!
//! The cart is only drawn while the cart section is the current view, the
//! same way a hidden cart section would not be visible on a page. Notices
//! ("added to cart", "order placed") are always shown.

use std::cell::Cell;
use std::fmt::Write as _;
use std::io::Write;
use std::rc::Rc;

use tracing::warn;

use menu_cart_core::{CartNotice, CatalogEntry, Category, RenderModel, Renderer, Section};

/// Shared handle to the section currently on screen.
#[derive(Debug, Clone, Default)]
pub struct ViewHandle(Rc<Cell<Option<Section>>>);

impl ViewHandle {
    #[must_use]
    pub fn current(&self) -> Option<Section> {
        self.0.get()
    }

    /// Switch to `section`, returning the previous view.
    pub fn show(&self, section: Section) -> Option<Section> {
        self.0.replace(Some(section))
    }

    #[must_use]
    pub fn is_cart_visible(&self) -> bool {
        self.current().is_some_and(Section::is_cart)
    }
}

/// Writer that forwards to the process's standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl Write for StdoutWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stdout().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}

/// Draws render models and notices as text.
#[derive(Debug, Clone)]
pub struct TerminalRenderer<W> {
    out: W,
    currency: String,
    view: ViewHandle,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, currency: impl Into<String>, view: ViewHandle) -> Self {
        Self {
            out,
            currency: currency.into(),
            view,
        }
    }

    /// Write a block of text, logging instead of failing on I/O errors.
    pub fn write_text(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }

    /// Draw the cart regardless of the current view.
    pub fn draw_cart(&mut self, model: &RenderModel) {
        let text = format_cart(model, &self.currency);
        self.write_text(&text);
    }

    /// Draw one menu category.
    pub fn draw_menu(&mut self, category: Category, entries: &[CatalogEntry]) {
        let text = format_menu(category, entries, &self.currency);
        self.write_text(&text);
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, model: &RenderModel) {
        if self.view.is_cart_visible() {
            self.draw_cart(model);
        }
    }

    fn notify(&mut self, notice: &CartNotice) {
        let text = format_notice(notice, &self.currency);
        self.write_text(&text);
    }
}

/// Format the cart view.
#[must_use]
pub fn format_cart(model: &RenderModel, currency: &str) -> String {
    let mut text = String::from("Cart\n");

    if model.is_empty() {
        text.push_str("  Your cart is empty.\n");
    }

    for line in &model.lines {
        let _ = writeln!(
            text,
            "  [{}] {}: {} {currency} x {} = {} {currency}",
            line.id, line.name, line.price, line.quantity, line.total_price
        );
    }

    let _ = writeln!(
        text,
        "Total: {} {currency} ({} {})",
        model.grand_total,
        model.item_count,
        if model.item_count == 1 { "item" } else { "items" }
    );
    text
}

/// Format one menu category.
#[must_use]
pub fn format_menu(category: Category, entries: &[CatalogEntry], currency: &str) -> String {
    let mut text = format!("{}\n", category.title());

    if entries.is_empty() {
        text.push_str("  No items available.\n");
    }

    for entry in entries {
        let _ = writeln!(
            text,
            "  [{}] {}: {} {currency}",
            entry.id, entry.name, entry.price
        );
    }
    text
}

/// Format a transient notice.
#[must_use]
pub fn format_notice(notice: &CartNotice, currency: &str) -> String {
    match notice {
        CartNotice::Added { name, .. } => format!("Added \"{name}\" to cart\n"),
        CartNotice::OrderPlaced { total, item_count } => {
            format!("Your order has been placed! {item_count} item(s), {total} {currency}\n")
        }
    }
}
