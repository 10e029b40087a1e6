/// One top-level grouping of products, produced by category discovery
///
/// Categories are created once at run start and never change for the
/// lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCategory {
    /// Human-readable label; becomes the snapshot `category` field
    pub name: String,

    /// Absolute listing URL base for this category
    pub endpoint: String,
}

impl CatalogCategory {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Builds the listing URL for the given 1-based page
    ///
    /// Page 1 is the endpoint itself; later pages append a `page` query
    /// parameter, reusing `&` when the endpoint already carries a query.
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            return self.endpoint.clone();
        }
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}page={}", self.endpoint, separator, page)
    }
}

/// Lightweight reference to a product discovered on a listing page
///
/// Exactly one entry exists per distinct canonical product URL in a run;
/// the run-wide seen set enforces the invariant before a detail task is
/// ever created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Canonical product URL; doubles as the run-wide dedup key
    pub url: String,

    /// Thumbnail found near the product link, or empty
    pub thumbnail: String,

    /// Category the product was discovered under
    pub category: String,
}
