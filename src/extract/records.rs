//! Decoding of JSON listing endpoints
//!
//! A records storefront serves complete product data straight from its
//! listing endpoint, so there is no detail fetch. The structs below mirror
//! the wire shape; unknown fields are ignored. The source's own sale flag
//! is deliberately not decoded, the normalizer derives sale status from
//! the resolved prices instead.

use serde::Deserialize;

use crate::catalog::{RawPrice, RawProduct, StockSignal};
use crate::ExtractError;

/// One category record from the categories endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub count: i64,
}

/// Price block attached to a product record; amounts are integer strings
/// in a minor currency unit ("2700" with minor unit 2 is 27.00)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceRecord {
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub currency_minor_unit: u32,
}

/// Image attached to a product record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub srcset: String,
}

/// Category tag attached to a product record
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTag {
    pub name: String,
}

/// Stock availability block attached to a product record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityRecord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub class: String,
}

/// One product record from the products endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub prices: PriceRecord,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub categories: Vec<CategoryTag>,
    #[serde(default)]
    pub stock_availability: AvailabilityRecord,
}

/// Decodes a categories endpoint page
pub fn parse_category_records(body: &str) -> Result<Vec<CategoryRecord>, ExtractError> {
    Ok(serde_json::from_str(body)?)
}

/// Decodes a products endpoint page
pub fn parse_product_records(body: &str) -> Result<Vec<ProductRecord>, ExtractError> {
    Ok(serde_json::from_str(body)?)
}

/// Maps one decoded record onto the normalizer's input shape
pub fn raw_from_record(record: ProductRecord) -> RawProduct {
    let exponent = record.prices.currency_minor_unit;
    let price = non_empty(&record.prices.price).map(|v| RawPrice::minor_units(v, exponent));
    let regular_price =
        non_empty(&record.prices.regular_price).map(|v| RawPrice::minor_units(v, exponent));
    let sale_price =
        non_empty(&record.prices.sale_price).map(|v| RawPrice::minor_units(v, exponent));

    let (image, thumbnail) = match record.images.first() {
        Some(img) => {
            let image = non_empty(&img.src);
            let thumbnail = srcset_url(&img.srcset, "100w").or_else(|| image.clone());
            (image, thumbnail)
        }
        None => (None, None),
    };

    RawProduct {
        name: non_empty(&record.name),
        price,
        regular_price,
        sale_price,
        categories: record.categories.into_iter().map(|c| c.name).collect(),
        stock: stock_from_availability(&record.stock_availability),
        image,
        thumbnail,
        link: non_empty(&record.permalink),
        ..RawProduct::default()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Markers in the availability block, explicit out-of-stock first
fn stock_from_availability(availability: &AvailabilityRecord) -> StockSignal {
    let class = availability.class.to_lowercase();
    let text = availability.text.to_lowercase();

    if class.contains("out-of-stock") || text.contains("agotado") || text.contains("out of stock") {
        StockSignal::Unavailable
    } else if class.contains("in-stock") || !text.is_empty() {
        StockSignal::Purchasable
    } else {
        StockSignal::Missing
    }
}

/// Picks the URL with the given width descriptor out of a srcset value
/// ("a.jpg 64w, b.jpg 100w" with "100w" yields "b.jpg")
fn srcset_url(srcset: &str, width: &str) -> Option<String> {
    srcset.split(',').find_map(|entry| {
        let mut parts = entry.split_whitespace();
        let url = parts.next()?;
        let descriptor = parts.next()?;
        (descriptor == width && parts.next().is_none()).then(|| url.to_string())
    })
}
