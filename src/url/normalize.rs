use url::Url;

/// Tracking query parameters removed during canonicalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref"];

/// Link schemes and pseudo-links that can never be catalog URLs
const SKIP_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Canonicalizes a product link discovered on a page
///
/// The returned string is used both as the fetch URL for the detail page and
/// as the run-wide dedup key, so the same product reached through different
/// raw hrefs must canonicalize identically.
///
/// # Canonicalization Steps
///
/// 1. Skip pseudo-links (javascript:, mailto:, tel:, data:, bare fragments)
/// 2. Resolve the href against the page base URL
/// 3. Reject anything that is not http(s)
/// 4. Lowercase the host
/// 5. Normalize the path (collapse duplicate slashes and dot segments,
///    drop the trailing slash except for the root)
/// 6. Drop the fragment
/// 7. Drop tracking parameters (`utm_*` and common click ids)
/// 8. Sort the remaining query parameters alphabetically
///
/// # Arguments
///
/// * `base` - The URL of the page the href was found on
/// * `href` - The raw href attribute value
///
/// # Returns
///
/// * `Some(String)` - Canonical absolute URL
/// * `None` - The href cannot refer to a fetchable catalog page
pub fn canonicalize(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_lowercase();
    if SKIP_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }

    let mut url = base.join(href).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let host = url.host_str()?.to_lowercase();
    url.set_host(Some(&host)).ok()?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query_string));
        }
    }

    Some(url.to_string())
}

/// Resolves a possibly-relative reference (an image src, a category href)
/// against the page base, keeping it otherwise untouched
///
/// # Returns
///
/// * `Some(String)` - Absolute http(s) URL
/// * `None` - Unresolvable or non-http(s) reference
pub fn absolutize(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let url = base.join(reference).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    Some(url.to_string())
}

/// Normalizes a URL path by collapsing duplicate slashes and dot segments
/// and dropping the trailing slash (except for the root)
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts the rest by key
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
