//! Normalization of raw extractions into snapshot products
//!
//! Extractors report what a page contained; this module decides what the
//! snapshot says. All rules are deterministic and total: any `RawProduct`,
//! however sparse, normalizes to a valid `Product` with documented defaults
//! (price 0, stock Unknown, category "General") instead of failing the task.

mod price;

pub use price::{amount, from_minor_units, parse_amount, resolve, round2, ResolvedPrice};

use crate::catalog::{ListingEntry, Product, RawProduct, StockSignal, StockState};

/// Localized home/root labels never treated as category names.
/// Compared case-insensitively against trimmed breadcrumb labels.
const HOME_LABELS: [&str; 2] = ["home", "inicio"];

/// Default category for products whose source named none
const FALLBACK_CATEGORY: &str = "General";

/// Resolves a raw extraction into a snapshot product
///
/// `entry` is the listing-side view of the same product: the canonical
/// link, the category it was discovered under, and the listing thumbnail.
pub fn normalize(raw: RawProduct, entry: &ListingEntry) -> Product {
    let resolved = price::resolve(
        raw.price.as_ref().and_then(price::amount),
        raw.regular_price.as_ref().and_then(price::amount),
        raw.sale_price.as_ref().and_then(price::amount),
    );

    let crumbs = clean_breadcrumbs(&raw.breadcrumbs);

    let category = Some(entry.category.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| crumbs.last().cloned())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

    // Records taxonomy labels are already clean and win over breadcrumbs
    let mut subcategories = if raw.categories.is_empty() {
        crumbs
    } else {
        raw.categories
    };
    if subcategories.is_empty() {
        subcategories = vec![category.clone()];
    }

    let stock_state = match raw.stock {
        StockSignal::Purchasable => StockState::Available,
        StockSignal::Unavailable => StockState::OutOfStock,
        StockSignal::Missing => StockState::Unknown,
    };

    // Mirror whichever image reference exists into the missing slot
    let detail_image = raw.image;
    let thumb = raw
        .thumbnail
        .or_else(|| Some(entry.thumbnail.clone()).filter(|t| !t.is_empty()));
    let image = detail_image.clone().or_else(|| thumb.clone());
    let thumbnail = thumb.or(detail_image);

    Product {
        name: raw.name.map(|n| n.trim().to_string()).unwrap_or_default(),
        price: resolved.price,
        list_price: resolved.list_price,
        on_sale: resolved.on_sale,
        stock_state,
        image: image.unwrap_or_default(),
        thumbnail: thumbnail.unwrap_or_default(),
        link: entry.url.clone(),
        category,
        subcategories,
    }
}

/// Breadcrumb labels minus any home/root label and minus the trailing
/// label, which is the product's own name
fn clean_breadcrumbs(breadcrumbs: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = breadcrumbs
        .iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .filter(|label| !HOME_LABELS.contains(&label.to_lowercase().as_str()))
        .collect();
    cleaned.pop();
    cleaned
}
