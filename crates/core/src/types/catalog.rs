//! Catalog entries as served by the menu backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ItemId;
use super::price::Price;

/// A purchasable menu item.
///
/// Wire shape: `{ "id", "name", "price", "image", "quantity" }`. The
/// `quantity` field is the backend's default display quantity and is purely
/// informational; adding to the cart always starts at one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique within its category.
    pub id: ItemId,
    pub name: String,
    /// Unit price, strictly positive.
    #[serde(deserialize_with = "deserialize_unit_price")]
    pub price: Price,
    /// Image URI, absolute or relative to the backend.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub quantity: u32,
}

impl CatalogEntry {
    /// Create a catalog entry with no informational quantity.
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: Price,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: image.into(),
            quantity: 0,
        }
    }
}

/// Deserialize a price and reject zero or negative amounts.
pub(crate) fn deserialize_unit_price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    let amount: Decimal = rust_decimal::serde::float::deserialize(deserializer)?;
    Price::unit(amount).map_err(serde::de::Error::custom)
}
