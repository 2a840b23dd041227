//! Menu Cart Storefront library.
//!
//! This crate provides the terminal storefront as a library, allowing it to
//! be tested and reused:
//! - [`catalog`] - HTTP client for the menu backend, with caching
//! - [`storage`] - file-backed durable cart slot
//! - [`render`] - terminal renderer for the menu and the cart
//! - [`session`] - composition root wiring the cart store to its collaborators
//! - [`commands`] - clap command line and interactive shell

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod session;
pub mod storage;
