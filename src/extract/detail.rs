//! Raw product extraction from a product detail page
//!
//! Selector chains are ordered most-specific first and fall through on
//! misses, so a partially redesigned template degrades field by field
//! instead of losing the whole product. Everything extracted here stays
//! raw; pricing and category resolution happen in the normalizer.

use scraper::{Html, Selector};
use url::Url;

use super::{clean_text, compile};
use crate::catalog::{RawPrice, RawProduct, StockSignal};
use crate::url::absolutize;
use crate::ExtractError;

/// Phrases a storefront renders when a product variant cannot be bought.
/// Checked against lowercased page text, so these stay lowercase.
const UNAVAILABLE_MARKERS: [&str; 2] = ["esta combinación no existe", "combination does not exist"];

/// Extracts a [`RawProduct`] from a product detail page
pub struct DetailExtractor {
    names: Vec<Selector>,
    hidden_price: Selector,
    visible_prices: Vec<Selector>,
    list_price: Selector,
    breadcrumbs: Selector,
    add_to_cart: Selector,
    images: Selector,
    og_image: Selector,
}

impl DetailExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            names: vec![
                compile("h1 [itemprop='name']")?,
                compile("h1[itemprop='name']")?,
                compile("h1")?,
            ],
            hidden_price: compile("[itemprop='price']")?,
            visible_prices: vec![
                compile(".oe_price .oe_currency_value")?,
                compile(".product_price .oe_currency_value")?,
            ],
            list_price: compile(".oe_default_price .oe_currency_value")?,
            breadcrumbs: compile("li.breadcrumb-item")?,
            add_to_cart: compile("#add_to_cart")?,
            images: compile("img[src*='/web/image/product']")?,
            og_image: compile("meta[property='og:image']")?,
        })
    }

    /// Extracts whatever product data the page carries
    ///
    /// Missing fields stay `None`; the page always yields a `RawProduct`.
    pub fn extract(&self, html: &str, base: &Url) -> RawProduct {
        let document = Html::parse_document(html);
        let page_text = document.root_element().text().collect::<String>();

        let name = self
            .names
            .iter()
            .find_map(|selector| first_text(&document, selector));

        // The machine-readable price is authoritative; the visible price
        // block and finally any money amount in the text are fallbacks
        let price = self
            .hidden_price_value(&document)
            .or_else(|| {
                self.visible_prices
                    .iter()
                    .find_map(|selector| first_text(&document, selector))
            })
            .or_else(|| money_amount(&page_text))
            .map(RawPrice::text);

        let regular_price = first_text(&document, &self.list_price).map(RawPrice::text);

        let breadcrumbs: Vec<String> = document
            .select(&self.breadcrumbs)
            .map(|li| clean_text(&li.text().collect::<String>()))
            .filter(|label| !label.is_empty())
            .collect();

        let stock = self.stock_signal(&document, &page_text);

        let image = document
            .select(&self.images)
            .next()
            .and_then(|img| img.value().attr("src"))
            .or_else(|| {
                document
                    .select(&self.og_image)
                    .next()
                    .and_then(|meta| meta.value().attr("content"))
            })
            .and_then(|src| absolutize(base, src));

        RawProduct {
            name,
            price,
            regular_price,
            breadcrumbs,
            stock,
            image,
            ..RawProduct::default()
        }
    }

    /// The `itemprop="price"` value, preferring the `content` attribute
    /// over visible text
    fn hidden_price_value(&self, document: &Html) -> Option<String> {
        let element = document.select(&self.hidden_price).next()?;
        if let Some(content) = element.value().attr("content") {
            if !content.trim().is_empty() {
                return Some(content.trim().to_string());
            }
        }
        Some(clean_text(&element.text().collect::<String>())).filter(|s| !s.is_empty())
    }

    /// Explicit unavailability markers beat the purchase affordance
    fn stock_signal(&self, document: &Html, page_text: &str) -> StockSignal {
        let lowered = page_text.to_lowercase();
        if UNAVAILABLE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            return StockSignal::Unavailable;
        }
        if document.select(&self.add_to_cart).next().is_some() {
            return StockSignal::Purchasable;
        }
        StockSignal::Missing
    }
}

/// First non-empty text content matched by the selector
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| clean_text(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

/// First money amount in the page text ("$ 1,299.00" yields "1,299.00")
fn money_amount(text: &str) -> Option<String> {
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        let after = rest[pos + 1..].trim_start();
        let amount: String = after
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .collect();
        if amount.bytes().any(|b| b.is_ascii_digit()) {
            return Some(amount);
        }
        rest = &rest[pos + 1..];
    }
    None
}
