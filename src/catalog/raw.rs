/// Price as found in the source, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPrice {
    /// Decimal text, human- or machine-formatted ("1,234.56", "27.0")
    Text(String),

    /// Integer amount in a minor currency unit plus its exponent;
    /// "2700" with exponent 2 means 27.00
    MinorUnits { amount: String, exponent: u32 },
}

impl RawPrice {
    pub fn text(value: impl Into<String>) -> Self {
        RawPrice::Text(value.into())
    }

    pub fn minor_units(amount: impl Into<String>, exponent: u32) -> Self {
        RawPrice::MinorUnits {
            amount: amount.into(),
            exponent,
        }
    }
}

/// Stock signal literally present on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockSignal {
    /// An add-to-cart / purchase affordance was found
    Purchasable,

    /// An explicit does-not-exist or out-of-stock marker was found.
    /// Takes priority over `Purchasable` during normalization.
    Unavailable,

    /// Neither signal found
    #[default]
    Missing,
}

/// Raw fields extracted from one product, before normalization
///
/// Every field is optional: extractors report what the page actually
/// contained and nothing more. Ambiguity is resolved by the normalizer,
/// which also applies the documented defaults for anything missing.
#[derive(Debug, Clone, Default)]
pub struct RawProduct {
    /// Display name as written on the page
    pub name: Option<String>,

    /// Current price as displayed or machine-encoded
    pub price: Option<RawPrice>,

    /// List/regular price when the page shows one
    pub regular_price: Option<RawPrice>,

    /// Explicit sale price, where the source separates it from the
    /// current price
    pub sale_price: Option<RawPrice>,

    /// Breadcrumb labels in page order, still including any home root and
    /// the trailing product name
    pub breadcrumbs: Vec<String>,

    /// Taxonomy labels from a records source. Unlike breadcrumbs these are
    /// already clean category names and are used as-is.
    pub categories: Vec<String>,

    /// Stock signal found on the page
    pub stock: StockSignal,

    /// High-resolution image reference
    pub image: Option<String>,

    /// Thumbnail reference, when the source provides a separate one
    pub thumbnail: Option<String>,

    /// Canonical link when the record itself carries one (a permalink)
    pub link: Option<String>,
}
