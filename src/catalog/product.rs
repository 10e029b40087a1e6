use serde::{Deserialize, Serialize};

/// Canonical output record for one product
///
/// Field names are the snapshot schema, verbatim. A `Product` is built once
/// by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Display name
    pub name: String,

    /// Effective price a buyer pays right now (2 decimal places, >= 0)
    pub price: f64,

    /// List/regular price; equals `price` when the product is not on sale
    pub list_price: f64,

    /// True exactly when `list_price > price`
    pub on_sale: bool,

    /// Availability resolved from explicit page signals
    pub stock_state: StockState,

    /// High-resolution image URL, or empty when the source had none
    pub image: String,

    /// Low-resolution image URL; mirrors `image` when only one was found
    pub thumbnail: String,

    /// Canonical product URL, the primary key of the snapshot
    pub link: String,

    /// Top-level category the product was discovered under
    pub category: String,

    /// Ordered category path, excluding the home root and the product name
    pub subcategories: Vec<String>,
}

impl Product {
    /// Sort key for the deterministic snapshot ordering
    pub fn sort_key(&self) -> (&str, &str) {
        (self.category.as_str(), self.name.as_str())
    }
}

/// Stock availability of a product
///
/// Resolved strictly from explicit page signals; never inferred from price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockState {
    /// The page offered an add-to-cart / purchase affordance
    Available,
    /// The page carried an explicit unavailable or does-not-exist marker
    OutOfStock,
    /// Neither signal was present
    Unknown,
}

impl StockState {
    /// Returns true when the source gave any explicit availability signal
    pub fn is_known(&self) -> bool {
        !matches!(self, StockState::Unknown)
    }
}

impl std::fmt::Display for StockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StockState::Available => "Available",
            StockState::OutOfStock => "OutOfStock",
            StockState::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}
