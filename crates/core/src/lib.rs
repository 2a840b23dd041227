//! Menu Cart Core - Cart state manager.
//!
//! This crate owns everything with real invariants in the Menu Cart client:
//! - the ordered, unique-by-id collection of cart entries
//! - the `total_price == price * quantity` arithmetic on every entry
//! - the write-through persistence round-trip to durable client storage
//! - the projection handed to the view layer after every mutation
//!
//! # Architecture
//!
//! The core crate contains no network or filesystem access. Catalog entries
//! are handed in already fetched, durable storage is reached through the
//! [`CartStorage`] trait, and drawing is delegated to a [`Renderer`]. The
//! `storefront` crate provides the concrete collaborators.
//!
//! # Modules
//!
//! - [`types`] - Item IDs, prices, catalog/cart entries, categories and sections
//! - [`store`] - [`CartStore`], the owner of the cart
//! - [`persistence`] - [`PersistenceAdapter`] and the [`CartStorage`] trait
//! - [`presenter`] - [`CartPresenter`] and the [`RenderModel`] hand-off

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod persistence;
pub mod presenter;
pub mod store;
pub mod types;

pub use persistence::{CART_KEY, CartStorage, MemoryStorage, PersistenceAdapter, StorageError};
pub use presenter::{CartPresenter, RenderLine, RenderModel, Renderer};
pub use store::{CartListener, CartNotice, CartState, CartStore};
pub use types::*;
