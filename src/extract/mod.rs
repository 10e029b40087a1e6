//! Extraction of catalog data from fetched pages
//!
//! Each extractor turns one kind of page body into structured data:
//! - `CategoryExtractor` - category names and endpoints from a category index page
//! - `ListingExtractor` - product links, thumbnails, and pagination from a listing page
//! - `DetailExtractor` - a raw product from a product detail page
//! - `records` - serde decoding of JSON listing endpoints
//!
//! Extractors are pure: they never fetch, and selector chains make them
//! tolerant of minor template drift without panicking mid-run.

mod categories;
mod detail;
mod listing;
mod records;

pub use categories::CategoryExtractor;
pub use detail::DetailExtractor;
pub use listing::{ListingExtractor, ListingPage};
pub use records::{
    parse_category_records, parse_product_records, raw_from_record, CategoryRecord, ProductRecord,
};

use crate::ExtractError;
use scraper::Selector;

/// Compiles a CSS selector, carrying the selector text into the error
pub(crate) fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Collapses whitespace runs to single spaces and trims the ends;
/// template text drags its indentation and line breaks along
pub(crate) fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
