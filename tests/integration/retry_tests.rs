//! Failure-path tests: retries, skipped tasks, and fatal discovery
//!
//! These runs hit storefronts that misbehave. A flaky detail page must
//! recover, an unreachable one must be skipped without sinking the run,
//! and an unreachable category index must abort it.

use std::path::Path;

use vitrina::config::Config;
use vitrina::{run_snapshot, FetchError, Product, VitrinaError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(base_url: &str, snapshot_path: &Path, max_attempts: u32) -> Config {
    let text = format!(
        r#"
[source]
base-url = "{}"

[fetch]
max-attempts = {}

[pool]
workers = 1
delay-ms = 0

[output]
snapshot-path = "{}"
"#,
        base_url,
        max_attempts,
        snapshot_path.display()
    );
    toml::from_str(&text).expect("test config must parse")
}

fn read_snapshot(snapshot_path: &Path) -> Vec<Product> {
    let content = std::fs::read_to_string(snapshot_path).expect("snapshot file must exist");
    serde_json::from_str(&content).expect("snapshot must be valid JSON")
}

const CATEGORY_INDEX: &str = r#"
<html><body>
    <div data-link-href="/shop/category/cables-3"><label>Cables</label></div>
</body></html>
"#;

const GOOD_DETAIL: &str = r#"
<html><body>
    <h1 itemprop="name">Cable bueno</h1>
    <span itemprop="price" content="150.00"></span>
    <a id="add_to_cart" href="#">Agregar al carrito</a>
</body></html>
"#;

#[tokio::test]
async fn test_flaky_detail_page_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATEGORY_INDEX))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/category/cables-3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a href="/shop/cable-bueno-21">Cable bueno</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    // The first hit fails; once this mock is spent the request falls
    // through to the healthy one below.
    Mock::given(method("GET"))
        .and(path("/shop/cable-bueno-21"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/cable-bueno-21"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GOOD_DETAIL))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("products.json");

    let config = create_test_config(&server.uri(), &snapshot_path, 3);
    let summary = run_snapshot(config).await.expect("run should succeed");

    assert_eq!(summary.products, 1);
    assert_eq!(summary.skipped, 0);

    let products = read_snapshot(&snapshot_path);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Cable bueno");
    assert_eq!(products[0].price, 150.0);
}

#[tokio::test]
async fn test_exhausted_detail_page_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATEGORY_INDEX))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/category/cables-3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"
<html><body>
    <a href="/shop/cable-bueno-21">Cable bueno</a>
    <a href="/shop/cable-roto-23">Cable roto</a>
</body></html>
"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/cable-bueno-21"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GOOD_DETAIL))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/cable-roto-23"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("products.json");

    let config = create_test_config(&server.uri(), &snapshot_path, 2);
    let summary = run_snapshot(config).await.expect("run should survive a dead page");

    // The broken page costs one product, never the whole run.
    assert_eq!(summary.products, 1);
    assert_eq!(summary.skipped, 1);

    let products = read_snapshot(&snapshot_path);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Cable bueno");
}

#[tokio::test]
async fn test_unreachable_index_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("products.json");

    let config = create_test_config(&server.uri(), &snapshot_path, 2);
    let err = run_snapshot(config).await.expect_err("run should abort");

    assert!(matches!(
        err,
        VitrinaError::Fetch(FetchError::Exhausted { attempts: 2, .. })
    ));
    assert!(!snapshot_path.exists());
}
