//! End-to-end tests for markup storefronts
//!
//! Each test serves a small Odoo-style shop (category index, paginated
//! listings, detail pages) and checks the snapshot that comes out.

use std::path::Path;

use vitrina::config::Config;
use vitrina::{run_snapshot, Product, StockState, VitrinaError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(base_url: &str, snapshot_path: &Path, workers: usize) -> Config {
    let text = format!(
        r#"
[source]
base-url = "{}"

[pool]
workers = {}
delay-ms = 0

[output]
snapshot-path = "{}"
flush-every = 2
"#,
        base_url,
        workers,
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
    <a href="/shop/category/muebles-5">Muebles</a>
</body></html>
"#;

const CABLES_PAGE_1: &str = r#"
<html><body>
    <div class="oe_product">
        <a href="/shop/cable-hdmi-7">
            <img src="/web/image/product.template/7/image_256" alt="Cable HDMI" />
            Cable HDMI
        </a>
    </div>
    <div class="oe_product">
        <a href="/shop/cable-usb-9">Cable USB</a>
    </div>
    <ul class="pagination">
        <li><a href="/shop/category/cables-3?page=2">2</a></li>
    </ul>
</body></html>
"#;

const CABLES_PAGE_2: &str = r#"
<html><body>
    <div class="oe_product">
        <a href="/shop/cable-vga-11">Cable VGA</a>
    </div>
</body></html>
"#;

// The HDMI cable shows up again here so the run has to dedup it.
const MUEBLES_PAGE_1: &str = r#"
<html><body>
    <a href="/shop/silla-ergo-41">Silla Ergo</a>
    <a href="/shop/cable-hdmi-7?category=5">Cable HDMI</a>
</body></html>
"#;

const HDMI_DETAIL: &str = r#"
<html><body>
    <ol class="breadcrumb">
        <li class="breadcrumb-item"><a href="/">Inicio</a></li>
        <li class="breadcrumb-item"><a href="/shop/category/cables-3">Cables</a></li>
        <li class="breadcrumb-item active">Cable HDMI</li>
    </ol>
    <h1 itemprop="name">Cable HDMI</h1>
    <div class="product_price">
        <span class="oe_price">
            <span itemprop="price" style="display:none;">95.0</span>
            <span class="oe_currency_value">95.00</span>
        </span>
        <span class="text-danger oe_default_price">
            <span class="oe_currency_value">120.00</span>
        </span>
    </div>
    <a id="add_to_cart" href="#">Agregar al carrito</a>
    <img src="/web/image/product.template/7/image_1024" alt="Cable HDMI" />
</body></html>
"#;

// The unavailable-combination marker must win over the add-to-cart button.
const USB_DETAIL: &str = r#"
<html><body>
    <h1>Cable USB</h1>
    <span itemprop="price" content="45.00"></span>
    <p>Esta combinación no existe.</p>
    <a id="add_to_cart" href="#">Agregar al carrito</a>
</body></html>
"#;

// No structured price anywhere, only a money string in the body text.
const VGA_DETAIL: &str = r#"
<html><body>
    <h1>Cable VGA</h1>
    <p>Precio: $ 199.00</p>
    <a id="add_to_cart" href="#">Comprar</a>
</body></html>
"#;

const SILLA_DETAIL: &str = r#"
<html>
<head>
    <meta property="og:image" content="/web/image/product.template/41/social" />
</head>
<body>
    <ol class="breadcrumb">
        <li class="breadcrumb-item">Inicio</li>
        <li class="breadcrumb-item">Muebles</li>
        <li class="breadcrumb-item">Sillas</li>
        <li class="breadcrumb-item active">Silla Ergo</li>
    </ol>
    <h1><span itemprop="name">Silla Ergo</span></h1>
    <div class="oe_price"><span class="oe_currency_value">1,299.00</span></div>
    <a id="add_to_cart" href="#">Agregar</a>
</body></html>
"#;

async fn mount_storefront(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CATEGORY_INDEX))
        .mount(server)
        .await;

    // Page 2 must be mounted before the bare-path mock or it never matches.
    Mock::given(method("GET"))
        .and(path("/shop/category/cables-3"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CABLES_PAGE_2))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/category/cables-3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CABLES_PAGE_1))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/category/muebles-5"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MUEBLES_PAGE_1))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/cable-hdmi-7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HDMI_DETAIL))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/cable-usb-9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USB_DETAIL))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/cable-vga-11"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VGA_DETAIL))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/silla-ergo-41"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SILLA_DETAIL))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_markup_full_run() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("products.json");

    // A stale snapshot from an earlier run must be replaced, not appended to.
    std::fs::write(&snapshot_path, "not json at all").expect("seed stale snapshot");

    let config = create_test_config(&server.uri(), &snapshot_path, 1);
    let summary = run_snapshot(config).await.expect("run should succeed");

    assert_eq!(summary.categories, 2);
    assert_eq!(summary.products, 4);
    assert_eq!(summary.skipped, 0);
    assert!(summary.snapshot_writes >= 1);

    let products = read_snapshot(&snapshot_path);
    assert_eq!(products.len(), 4);

    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Cable HDMI", "Cable USB", "Cable VGA", "Silla Ergo"]);

    let hdmi = &products[0];
    assert_eq!(hdmi.category, "Cables");
    assert_eq!(hdmi.price, 95.0);
    assert_eq!(hdmi.list_price, 120.0);
    assert!(hdmi.on_sale);
    assert_eq!(hdmi.stock_state, StockState::Available);
    assert_eq!(hdmi.subcategories, vec!["Cables".to_string()]);
    assert!(hdmi.link.ends_with("/shop/cable-hdmi-7"));
    assert!(hdmi.image.ends_with("/web/image/product.template/7/image_1024"));
    assert!(hdmi.thumbnail.ends_with("/web/image/product.template/7/image_256"));

    let usb = &products[1];
    assert_eq!(usb.stock_state, StockState::OutOfStock);
    assert_eq!(usb.price, 45.0);
    assert_eq!(usb.list_price, 45.0);
    assert!(!usb.on_sale);
    assert_eq!(usb.image, "");
    assert_eq!(usb.thumbnail, "");

    let vga = &products[2];
    assert_eq!(vga.price, 199.0);
    assert_eq!(vga.stock_state, StockState::Available);

    let silla = &products[3];
    assert_eq!(silla.category, "Muebles");
    assert_eq!(silla.price, 1299.0);
    assert_eq!(
        silla.subcategories,
        vec!["Muebles".to_string(), "Sillas".to_string()]
    );
    // With no listing thumbnail the detail image stands in for it.
    assert!(silla.image.ends_with("/web/image/product.template/41/social"));
    assert_eq!(silla.thumbnail, silla.image);

    // The duplicate listing entry must not produce a second HDMI cable.
    let hdmi_count = products
        .iter()
        .filter(|p| p.link.ends_with("/shop/cable-hdmi-7"))
        .count();
    assert_eq!(hdmi_count, 1);
}

#[tokio::test]
async fn test_markup_concurrent_workers_agree_on_totals() {
    let server = MockServer::start().await;
    mount_storefront(&server).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("products.json");

    let config = create_test_config(&server.uri(), &snapshot_path, 3);
    let summary = run_snapshot(config).await.expect("run should succeed");

    // Which worker claims the duplicate first is unpredictable, but the
    // totals and the sort order are not.
    assert_eq!(summary.products, 4);

    let products = read_snapshot(&snapshot_path);
    assert_eq!(products.len(), 4);
    for pair in products.windows(2) {
        assert!(
            (&pair[0].category, &pair[0].name) <= (&pair[1].category, &pair[1].name),
            "snapshot must stay sorted by category then name"
        );
    }

    let mut links: Vec<&str> = products.iter().map(|p| p.link.as_str()).collect();
    links.sort();
    links.dedup();
    assert_eq!(links.len(), 4);
}

#[tokio::test]
async fn test_markup_index_without_categories_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>Mantenimiento</p></body></html>"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot_path = dir.path().join("products.json");

    let config = create_test_config(&server.uri(), &snapshot_path, 1);
    let err = run_snapshot(config).await.expect_err("run should fail");

    assert!(matches!(err, VitrinaError::Discovery(_)));
    // Discovery failed before the writer touched the filesystem.
    assert!(!snapshot_path.exists());
}
