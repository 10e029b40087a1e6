//! Category discovery
//!
//! A run starts by enumerating the storefront's top-level categories. A
//! markup source gets its category index page parsed; a records source
//! gets its categories endpoint walked page by page. Failures here are
//! fatal, unlike everywhere downstream: with zero categories there is no
//! run to speak of.

use reqwest::Client;
use url::Url;

use crate::catalog::CatalogCategory;
use crate::config::{FetchConfig, SourceConfig, SourceFlavor};
use crate::extract::{parse_category_records, CategoryExtractor, CategoryRecord};
use crate::scrape::fetcher::fetch_with_retry;
use crate::{Result, VitrinaError};

/// Discovers every top-level category the run will walk
///
/// # Errors
///
/// Returns [`VitrinaError::Discovery`] when the source yields zero
/// categories, and propagates fetch or decode failures as-is. All of
/// these abort the run.
pub async fn discover_categories(
    client: &Client,
    source: &SourceConfig,
    fetch: &FetchConfig,
    base: &Url,
) -> Result<Vec<CatalogCategory>> {
    let categories = match source.flavor {
        SourceFlavor::Markup => discover_from_index(client, source, fetch, base).await?,
        SourceFlavor::Records => discover_from_records(client, source, fetch).await?,
    };

    if categories.is_empty() {
        return Err(VitrinaError::Discovery(format!(
            "no categories discovered at {}",
            source.base_url
        )));
    }

    tracing::info!("Discovered {} categories", categories.len());
    for category in &categories {
        tracing::debug!("Category {} -> {}", category.name, category.endpoint);
    }

    Ok(categories)
}

/// Parses the category index page of a markup storefront
async fn discover_from_index(
    client: &Client,
    source: &SourceConfig,
    fetch: &FetchConfig,
    base: &Url,
) -> Result<Vec<CatalogCategory>> {
    let extractor = CategoryExtractor::new()?;
    let url = join_path(&source.base_url, &source.category_index_path);
    let page = fetch_with_retry(client, &url, fetch.max_attempts).await?;
    Ok(extractor.extract(&page.body, base))
}

/// Walks the categories endpoint of a records storefront until an empty
/// page, keeping top-level categories that actually hold products
async fn discover_from_records(
    client: &Client,
    source: &SourceConfig,
    fetch: &FetchConfig,
) -> Result<Vec<CatalogCategory>> {
    let categories_endpoint = join_path(&source.base_url, &source.categories_path);
    let products_endpoint = join_path(&source.base_url, &source.products_path);

    let mut categories = Vec::new();
    let mut page = 1u32;
    loop {
        let url = format!("{}?per_page=100&page={}", categories_endpoint, page);
        let fetched = fetch_with_retry(client, &url, fetch.max_attempts).await?;
        let records = parse_category_records(&fetched.body)?;
        if records.is_empty() {
            break;
        }

        for record in records {
            if !keep_category(&record, &source.ignore_slugs) {
                continue;
            }
            let endpoint = format!(
                "{}?category={}&per_page={}",
                products_endpoint, record.slug, source.per_page
            );
            categories.push(CatalogCategory::new(record.name, endpoint));
        }
        page += 1;
    }

    Ok(categories)
}

/// Top-level, non-empty, and not explicitly ignored
fn keep_category(record: &CategoryRecord, ignore_slugs: &[String]) -> bool {
    record.parent == 0 && record.count > 0 && !ignore_slugs.iter().any(|slug| slug == &record.slug)
}

/// Joins a path onto the configured base URL
fn join_path(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
