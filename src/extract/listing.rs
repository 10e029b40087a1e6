//! Product link extraction from category listing pages
//!
//! A listing page yields lightweight entries (canonical product URL, nearby
//! thumbnail, owning category) plus a pagination verdict. Product anchors are
//! recognized by shape: a `/shop/` path whose last segment carries a numeric
//! suffix, the way storefront slugs embed record ids (`/shop/silla-ergo-41`).
//!
//! Query strings on product anchors are listing context (sort order, source
//! category) and are stripped before canonicalization so the same product
//! reached from two categories dedups to one URL.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

use super::compile;
use crate::catalog::ListingEntry;
use crate::url::{absolutize, canonicalize};
use crate::ExtractError;

/// Everything the scheduler needs from one listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Products found on the page, in document order, deduplicated
    pub entries: Vec<ListingEntry>,

    /// Whether the page links to the next listing page
    pub has_next: bool,
}

/// Extracts product entries and pagination state from a listing page
pub struct ListingExtractor {
    anchors: Selector,
    thumbnails: Selector,
}

impl ListingExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            anchors: compile("a[href]")?,
            thumbnails: compile("img[src*='/web/image/product']")?,
        })
    }

    /// Extracts product entries from one listing page
    ///
    /// `next_page` is the page number whose link, if present anywhere on the
    /// page, proves another listing page exists.
    pub fn extract(&self, html: &str, base: &Url, category: &str, next_page: u32) -> ListingPage {
        let document = Html::parse_document(html);

        let mut entries: Vec<ListingEntry> = Vec::new();
        let mut index_by_url: HashMap<String, usize> = HashMap::new();
        let mut has_next = false;

        for anchor in document.select(&self.anchors) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            if !has_next && links_to_page(base, href, next_page) {
                has_next = true;
            }

            let path = href.split(['?', '#']).next().unwrap_or(href);
            if !is_product_path(path) {
                continue;
            }
            let Some(url) = canonicalize(base, path) else {
                continue;
            };

            let thumbnail = self
                .thumbnail_near(anchor)
                .and_then(|src| absolutize(base, &src))
                .unwrap_or_default();

            match index_by_url.get(&url) {
                Some(&i) => {
                    // Same product linked twice on the card; keep the first
                    // entry but pick up a thumbnail the first anchor lacked
                    if entries[i].thumbnail.is_empty() && !thumbnail.is_empty() {
                        entries[i].thumbnail = thumbnail;
                    }
                }
                None => {
                    index_by_url.insert(url.clone(), entries.len());
                    entries.push(ListingEntry {
                        url,
                        thumbnail,
                        category: category.to_string(),
                    });
                }
            }
        }

        ListingPage { entries, has_next }
    }

    /// Looks for a product thumbnail inside the anchor, then inside its
    /// parent element to cover cards where image and link are siblings
    fn thumbnail_near(&self, anchor: ElementRef) -> Option<String> {
        if let Some(src) = anchor
            .select(&self.thumbnails)
            .next()
            .and_then(|img| img.value().attr("src"))
        {
            return Some(src.to_string());
        }

        let parent = anchor.parent().and_then(ElementRef::wrap)?;
        parent
            .select(&self.thumbnails)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string)
    }
}

/// Whether a query-stripped href path points at a product detail page
fn is_product_path(path: &str) -> bool {
    if !path.contains("/shop/") {
        return false;
    }
    if path.contains("/category/") || path.contains("/cart") || path.contains("/wishlist") {
        return false;
    }

    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    match segment.rsplit_once('-') {
        Some((name, id)) => {
            !name.is_empty() && !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Whether the href resolves to a URL carrying `page=<page>` in its query
fn links_to_page(base: &Url, href: &str, page: u32) -> bool {
    let Ok(url) = base.join(href) else {
        return false;
    };
    let wanted = page.to_string();
    url.query_pairs().any(|(k, v)| k == "page" && v == wanted)
}
