//! HTTP fetching with retry and backoff
//!
//! This module handles all HTTP requests for a run, including:
//! - Building the one HTTP client every worker shares
//! - Error classification (rate limited vs transient vs network)
//! - Retry with exponential backoff, harsher for rate limiting
//!
//! Redirects are followed by the client; the body a caller sees is the
//! body of the final URL.

use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{FetchConfig, SourceConfig};
use crate::{FetchError, FetchResult};

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, empty when absent
    pub content_type: String,

    /// Response body
    pub body: String,
}

/// Builds the HTTP client shared by every worker in a run
///
/// # Arguments
///
/// * `source` - Storefront identity (user agent, accept-language)
/// * `fetch` - Timeout configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(source: &SourceConfig, fetch: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
    );
    if let Ok(value) = header::HeaderValue::from_str(&source.accept_language) {
        headers.insert(header::ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(source.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once, classifying failures
///
/// | Condition | Error |
/// |-----------|-------|
/// | HTTP 429 | `RateLimited` |
/// | Other non-2xx | `Status` |
/// | Request timeout | `Timeout` |
/// | Connection/body failure | `Network` |
pub async fn fetch_once(client: &Client, url: &str) -> FetchResult<FetchedPage> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify(url, e))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response.text().await.map_err(|e| classify(url, e))?;

    Ok(FetchedPage {
        final_url,
        status: status.as_u16(),
        content_type,
        body,
    })
}

/// Fetches a URL, retrying failed attempts with backoff
///
/// Every failure kind is retried; a storefront that serves an error page
/// one second and a product the next is the normal case, not the edge
/// case. After `max_attempts` failures the last error is wrapped in
/// [`FetchError::Exhausted`] and the caller decides what the task becomes.
/// No backoff is slept after the final failure.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    max_attempts: u32,
) -> FetchResult<FetchedPage> {
    let mut last_error: Option<FetchError> = None;

    for attempt in 0..max_attempts {
        match fetch_once(client, url).await {
            Ok(page) => {
                if attempt > 0 {
                    tracing::debug!("Fetch of {} recovered on attempt {}", url, attempt + 1);
                }
                return Ok(page);
            }
            Err(error) => {
                let is_final = attempt + 1 == max_attempts;
                if !is_final {
                    let delay = backoff_delay(&error, attempt);
                    tracing::warn!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        max_attempts,
                        url,
                        error,
                        delay
                    );
                    last_error = Some(error);
                    sleep(delay).await;
                } else {
                    last_error = Some(error);
                }
            }
        }
    }

    let last = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no attempts were made".to_string());
    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts: max_attempts,
        last,
    })
}

/// Backoff before retrying, given the 0-based index of the failed attempt
///
/// Rate limiting backs off much harder than transient failures: with the
/// default three attempts the sequence is 3s then 9s, versus 1s then 2s.
pub fn backoff_delay(error: &FetchError, attempt: u32) -> Duration {
    if error.is_rate_limited() {
        Duration::from_secs(3u64.pow(attempt + 1))
    } else {
        Duration::from_secs(2u64.pow(attempt))
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}
