//! Core types for Menu Cart.
//!
//! This module provides the data model shared by the cart and its collaborators.

pub mod cart;
pub mod catalog;
pub mod category;
pub mod id;
pub mod price;

pub use cart::{Cart, CartEntry};
pub use catalog::CatalogEntry;
pub use category::{Category, Section};
pub use id::ItemId;
pub use price::{Price, PriceError};
