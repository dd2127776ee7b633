//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock storefronts and run the full
//! bootstrap, discovery, crawl and export cycle end-to-end in direct mode.

use catalog_harvester::config::{load_config_with_hash, Config, SessionCookie, SessionMode};
use catalog_harvester::crawler::harvest;
use catalog_harvester::session::DirectBootstrapper;
use catalog_harvester::{HarvestError, ProductRecord, RunStatus};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITEMAP: &str = r#"<html><body>
    <ul class="sitemap">
      <li><a href="/pumps.html">Насосы</a></li>
      <li><a href="/filters.html">Фильтры</a></li>
      <li><a href="/customer/account/login.html">Личный кабинет</a></li>
      <li><a href="/about.html">О компании</a></li>
    </ul>
</body></html>"#;

/// Three cards, the last of which has no recoverable name
fn listing(slug: &str, title: &str, paginated: bool) -> String {
    let pager = if paginated {
        r#"<div class="pages"><a class="action next" href="?p=2">Далее</a></div>"#
    } else {
        ""
    };
    format!(
        r#"<html><body><ol class="products">
        <li class="product-item">
          <img src="/media/{slug}-1.jpg">
          <h3 class="product-item-name"><a href="/{slug}/one.html">{title} 1</a></h3>
          <span class="price">12 990,50 ₽</span>
          <div class="stock available">В наличии</div>
        </li>
        <li class="product-item">
          <img src="data:image/gif;base64,R0lGOD" data-src="/media/{slug}-2.jpg">
          <a class="product-item-link" href="/{slug}/two.html">{title} 2</a>
          <span class="price">4 500 ₽</span>
        </li>
        <li class="product-item">
          <span class="price">990 ₽</span>
        </li>
        </ol>{pager}</body></html>"#
    )
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::for_site(Url::parse(&server.uri()).unwrap());
    config.session.mode = SessionMode::Direct;
    config.crawler.page_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.output.json_path = Some(path_string(&dir.path().join("out/products.json")));
    config.output.database_path = Some(path_string(&dir.path().join("out/products.db")));
    config
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn read_products(path: &Path) -> Vec<ProductRecord> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_harvest_two_categories() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/map.html"))
        .respond_with(html(SITEMAP))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pumps.html"))
        .respond_with(html(listing("pumps", "Насос", false)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filters.html"))
        .respond_with(html(listing("filters", "Фильтр", false)))
        .mount(&server)
        .await;

    let mut config = test_config(&server, &dir);
    let csv_path = dir.path().join("out/products.csv");
    config.output.csv_path = Some(path_string(&csv_path));
    let json_path = dir.path().join("out/products.json");

    let report = harvest(config, "test-hash", Box::new(DirectBootstrapper))
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Complete);
    assert_eq!(report.records().len(), 4);
    assert_eq!(report.count_for("Насосы"), 2);
    assert_eq!(report.count_for("Фильтры"), 2);

    let products = read_products(&json_path);
    assert_eq!(products.len(), 4);
    assert!(products
        .iter()
        .all(|p| p.category == "Насосы" || p.category == "Фильтры"));

    let first_pump = products.iter().find(|p| p.name == "Насос 1").unwrap();
    assert_eq!(first_pump.price.as_deref(), Some("12990,50"));
    assert_eq!(first_pump.in_stock, "В наличии");
    assert_eq!(
        first_pump.url.as_ref().unwrap().as_str(),
        format!("{}/pumps/one.html", server.uri())
    );

    let second_pump = products.iter().find(|p| p.name == "Насос 2").unwrap();
    assert_eq!(second_pump.price.as_deref(), Some("4500"));
    assert_eq!(second_pump.in_stock, "Уточняйте");
    assert_eq!(
        second_pump.image.as_ref().unwrap().as_str(),
        format!("{}/media/pumps-2.jpg", server.uri())
    );

    assert!(dir.path().join("out/products.db").exists());

    let table = fs::read_to_string(&csv_path).unwrap();
    let mut lines = table.lines();
    assert_eq!(
        lines.next(),
        Some("Название,Цена,Наличие,Категория,Ссылка,Изображение")
    );
    assert_eq!(lines.count(), 4);
}

#[tokio::test]
async fn test_pagination_follows_page_parameter() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/map.html"))
        .respond_with(html(r#"<a href="/pumps.html">Насосы</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pumps.html"))
        .and(query_param("p", "2"))
        .respond_with(html(listing("pumps-p2", "Помпа", false)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pumps.html"))
        .respond_with(html(listing("pumps", "Насос", true)))
        .mount(&server)
        .await;

    let report = harvest(
        test_config(&server, &dir),
        "test-hash",
        Box::new(DirectBootstrapper),
    )
    .await
    .unwrap();

    assert_eq!(report.records().len(), 4);
    let outcome = &report.outcomes()[0];
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.stop_reason.page(), 2);
}

#[tokio::test]
async fn test_sitemap_fallback_to_root() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/map.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<nav><a href="/filters.html">Фильтры</a></nav>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filters.html"))
        .respond_with(html(listing("filters", "Фильтр", false)))
        .mount(&server)
        .await;

    let report = harvest(
        test_config(&server, &dir),
        "test-hash",
        Box::new(DirectBootstrapper),
    )
    .await
    .unwrap();

    assert_eq!(report.records().len(), 2);
    assert_eq!(report.count_for("Фильтры"), 2);
}

#[tokio::test]
async fn test_unreachable_site_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir);

    let result = harvest(config, "test-hash", Box::new(DirectBootstrapper)).await;

    assert!(matches!(result, Err(HarvestError::Discovery(_))));
    assert!(!dir.path().join("out/products.json").exists());
}

#[tokio::test]
async fn test_failed_category_makes_run_partial() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/map.html"))
        .respond_with(html(SITEMAP))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pumps.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filters.html"))
        .respond_with(html(listing("filters", "Фильтр", false)))
        .mount(&server)
        .await;

    let config = test_config(&server, &dir);
    let json_path = dir.path().join("out/products.json");

    let report = harvest(config, "test-hash", Box::new(DirectBootstrapper))
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Partial);
    assert_eq!(report.status().exit_status(), 2);
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].label(), "Насосы");
    assert_eq!(read_products(&json_path).len(), 2);
}

#[tokio::test]
async fn test_session_headers_and_cookies_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut config = test_config(&server, &dir);
    config.session.cookies = vec![SessionCookie {
        name: "cf_clearance".to_string(),
        value: "cleared".to_string(),
        path: None,
    }];
    config.categories = vec![catalog_harvester::config::CategoryEntry {
        label: "Насосы".to_string(),
        url: Url::parse(&format!("{}/pumps.html", server.uri())).unwrap(),
    }];
    // Header matching splits values on commas, so use an agent without any
    config.session.user_agent = "catalog-harvester-test/1.0".to_string();
    let user_agent = config.session.user_agent.clone();

    Mock::given(method("GET"))
        .and(path("/pumps.html"))
        .and(header("user-agent", user_agent.as_str()))
        .and(header("cookie", "cf_clearance=cleared"))
        .respond_with(html(listing("pumps", "Насос", false)))
        .expect(1)
        .mount(&server)
        .await;

    let report = harvest(config, "test-hash", Box::new(DirectBootstrapper))
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Complete);
    assert_eq!(report.records().len(), 2);
}

#[tokio::test]
async fn test_harvest_from_config_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/map.html"))
        .respond_with(html(SITEMAP))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pumps.html"))
        .respond_with(html(listing("pumps", "Насос", false)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filters.html"))
        .respond_with(html(listing("filters", "Фильтр", false)))
        .mount(&server)
        .await;

    let json_path = dir.path().join("products.json");
    let config_path = dir.path().join("harvest.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[site]
base-url = "{}"

[crawler]
max-workers = 2
page-delay-ms = 0

[session]
mode = "direct"

[output]
json-path = "{}"
"#,
            server.uri(),
            json_path.to_string_lossy().replace('\\', "/")
        ),
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(config.session.mode, SessionMode::Direct);

    let report = harvest(config, &hash, Box::new(DirectBootstrapper))
        .await
        .unwrap();

    assert_eq!(report.status(), RunStatus::Complete);
    assert_eq!(read_products(&json_path).len(), 4);
}
