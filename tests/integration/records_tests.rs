//! End-to-end tests for records storefronts
//!
//! A records source serves complete product data from its JSON listing
//! endpoint, so a run has no detail fetches: categories endpoint, then
//! products endpoint page by page until an empty page.

use std::path::Path;

use vitrina::config::Config;
use vitrina::{run_snapshot, Product, StockState};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(base_url: &str, snapshot_path: &Path, summary_path: &Path) -> Config {
    let text = format!(
        r#"
[source]
base-url = "{}"
flavor = "records"

[pool]
workers = 1
delay-ms = 0

[output]
snapshot-path = "{}"
flush-every = 10
summary-path = "{}"
"#,
        base_url,
        snapshot_path.display(),
        summary_path.display()
    );
    toml::from_str(&text).expect("test config must parse")
}

fn read_snapshot(snapshot_path: &Path) -> Vec<Product> {
    let content = std::fs::read_to_string(snapshot_path).expect("snapshot file must exist");
    serde_json::from_str(&content).expect("snapshot must be valid JSON")
}

// Only "Cables" survives the filter: "Ofertas" is a child category,
// "Uncategorized" is on the default ignore list, "Vacia" holds nothing.
const CATEGORIES_PAGE_1: &str = r#"
[
    {"id": 3, "name": "Cables", "slug": "cables", "parent": 0, "count": 2},
    {"id": 7, "name": "Ofertas", "slug": "ofertas", "parent": 3, "count": 5},
    {"id": 9, "name": "Uncategorized", "slug": "uncategorized", "parent": 0, "count": 9},
    {"id": 11, "name": "Vacia", "slug": "vacia", "parent": 0, "count": 0}
]
"#;

const CABLES_RECORDS: &str = r#"
[
    {
        "id": 101,
        "name": "Cable HDMI 2m",
        "permalink": "https://tienda.example.com/producto/cable-hdmi-2m/",
        "prices": {
            "price": "27000",
            "regular_price": "30000",
            "sale_price": "27000",
            "currency_minor_unit": 2
        },
        "images": [
            {
                "src": "https://cdn.example.com/img/hdmi.jpg",
                "srcset": "https://cdn.example.com/img/hdmi-100x100.jpg 100w, https://cdn.example.com/img/hdmi-300x300.jpg 300w"
            }
        ],
        "categories": [{"name": "Cables"}, {"name": "Video"}],
        "stock_availability": {"text": "", "class": "in-stock"}
    },
    {
        "id": 102,
        "name": "Cable agotado",
        "permalink": "https://tienda.example.com/producto/cable-agotado/",
        "prices": {
            "price": "9900",
            "regular_price": "9900",
            "sale_price": "",
            "currency_minor_unit": 2
        },
        "images": [],
        "categories": [{"name": "Cables"}],
        "stock_availability": {"text": "Agotado", "class": "out-of-stock"}
    }
]
"#;

async fn mount_store_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/store/v1/products/categories"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATEGORIES_PAGE_1))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/store/v1/products/categories"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(server)
        .await;

    // First match wins, so the page-2 terminator goes in ahead of the
    // page-1 mock, whose request carries no page parameter at all.
    Mock::given(method("GET"))
        .and(path("/wp-json/wc/store/v1/products"))
        .and(query_param("category", "cables"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wc/store/v1/products"))
        .and(query_param("category", "cables"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CABLES_RECORDS))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_records_full_run() {
    let server = MockServer::start().await;
    mount_store_api(&server).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("products.json");
    let summary_path = dir.path().join("summary.md");

    let config = create_test_config(&server.uri(), &snapshot_path, &summary_path);
    let summary = run_snapshot(config).await.expect("run should succeed");

    assert_eq!(summary.categories, 1);
    assert_eq!(summary.products, 2);
    assert_eq!(summary.skipped, 0);

    let products = read_snapshot(&snapshot_path);
    assert_eq!(products.len(), 2);

    let hdmi = &products[0];
    assert_eq!(hdmi.name, "Cable HDMI 2m");
    assert_eq!(hdmi.category, "Cables");
    assert_eq!(hdmi.price, 270.0);
    assert_eq!(hdmi.list_price, 300.0);
    assert!(hdmi.on_sale);
    assert_eq!(hdmi.stock_state, StockState::Available);
    // Permalinks are canonicalized, so the trailing slash is gone.
    assert_eq!(hdmi.link, "https://tienda.example.com/producto/cable-hdmi-2m");
    assert_eq!(hdmi.image, "https://cdn.example.com/img/hdmi.jpg");
    assert_eq!(hdmi.thumbnail, "https://cdn.example.com/img/hdmi-100x100.jpg");
    assert_eq!(
        hdmi.subcategories,
        vec!["Cables".to_string(), "Video".to_string()]
    );

    let agotado = &products[1];
    assert_eq!(agotado.name, "Cable agotado");
    assert_eq!(agotado.price, 99.0);
    assert_eq!(agotado.list_price, 99.0);
    assert!(!agotado.on_sale);
    assert_eq!(agotado.stock_state, StockState::OutOfStock);
    assert_eq!(agotado.image, "");
    assert_eq!(agotado.thumbnail, "");

    let report = std::fs::read_to_string(&summary_path).expect("summary report must exist");
    assert!(report.contains("# Vitrina Run Summary"));
    assert!(report.contains("- **Products**: 2"));
    assert!(report.contains("| Cables | 2 |"));
}
