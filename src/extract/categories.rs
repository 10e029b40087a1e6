//! Category discovery from a storefront's category index page
//!
//! Two passes over the page, in order:
//! 1. Sidebar filter widgets carrying a `data-link-href` attribute, whose
//!    visible name lives in a nested `<label>`
//! 2. Plain anchors into `/shop/category/`, named by their link text
//!
//! Either pass falls back to a humanized slug when no visible name exists.
//! Results are deduplicated by endpoint, first sighting wins.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::{clean_text, compile};
use crate::catalog::CatalogCategory;
use crate::url::{absolutize, humanize_slug};
use crate::ExtractError;

/// Extracts category names and listing endpoints from a category index page
pub struct CategoryExtractor {
    sidebar: Selector,
    label: Selector,
    anchors: Selector,
}

impl CategoryExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            sidebar: compile("[data-link-href*='/shop/category/']")?,
            label: compile("label")?,
            anchors: compile("a[href*='/shop/category/']")?,
        })
    }

    /// Extracts every category linked from the page
    ///
    /// Returns categories in document order with the sidebar pass first.
    /// An empty result means the page carries no recognizable categories;
    /// the caller decides whether that is fatal.
    pub fn extract(&self, html: &str, base: &Url) -> Vec<CatalogCategory> {
        let document = Html::parse_document(html);
        let mut seen: HashSet<String> = HashSet::new();
        let mut categories = Vec::new();

        for element in document.select(&self.sidebar) {
            let Some(href) = element.value().attr("data-link-href") else {
                continue;
            };
            let Some(endpoint) = category_endpoint(base, href) else {
                continue;
            };

            let name = element
                .select(&self.label)
                .next()
                .map(|label| clean_text(&label.text().collect::<String>()))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| humanize_slug(category_slug(href)));

            if seen.insert(endpoint.clone()) {
                categories.push(CatalogCategory::new(name, endpoint));
            }
        }

        for element in document.select(&self.anchors) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(endpoint) = category_endpoint(base, href) else {
                continue;
            };

            let name = Some(clean_text(&element.text().collect::<String>()))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| humanize_slug(category_slug(href)));

            if seen.insert(endpoint.clone()) {
                categories.push(CatalogCategory::new(name, endpoint));
            }
        }

        categories
    }
}

/// Resolves a category href to an absolute endpoint, dropping any fragment
fn category_endpoint(base: &Url, href: &str) -> Option<String> {
    let href = href.split('#').next().unwrap_or(href);
    absolutize(base, href)
}

/// The slug part of a category href, query and fragment stripped
fn category_slug(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.split("/shop/category/").nth(1).unwrap_or("")
}
