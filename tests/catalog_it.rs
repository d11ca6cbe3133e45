// std
use std::time::Duration as StdDuration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use voorraad_sync::{
	auth::ClientCredentials,
	catalog::{CatalogFetcher, ProductRecord},
	error::Error,
	http::ReqwestHttpClient,
	url::Url,
};

const PRODUCTS_PATH: &str = "/wp-json/wc/v3/products";
// base64("ck_test:cs_test")
const BASIC_HEADER: &str = "Basic Y2tfdGVzdDpjc190ZXN0";

fn build_fetcher(server: &MockServer) -> CatalogFetcher {
	CatalogFetcher::new(
		&Url::parse(&server.base_url()).expect("Mock store URL should parse successfully."),
		ClientCredentials::new("ck_test", "cs_test"),
		ReqwestHttpClient::default(),
	)
	.expect("Fetcher should build for the mock store.")
}

// Deterministic mix: every third record is a variable product, every fifth is a draft, and every
// seventh does not manage stock. Variations show up on odd ids.
fn product(id: u64) -> Value {
	let kind = if id % 3 == 0 {
		"variable"
	} else if id % 2 == 1 {
		"variation"
	} else {
		"simple"
	};
	let status = if id % 5 == 0 { "draft" } else { "publish" };
	let manage_stock = if id % 7 == 0 { json!(false) } else { json!(true) };

	json!({
		"id": id,
		"name": format!("Product {id}"),
		"type": kind,
		"status": status,
		"manage_stock": manage_stock,
		"stock_quantity": id % 13,
		"sku": format!("SKU-{id}"),
	})
}

fn expected_eligible(id: u64) -> bool {
	id % 3 != 0 && id % 5 != 0 && id % 7 != 0
}

fn page_body(page: u64, size: u64) -> Value {
	let first = (page - 1) * size + 1;

	Value::Array((first..first + size).map(product).collect())
}

async fn mock_page<'a>(server: &'a MockServer, page: u64, body: Value) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PRODUCTS_PATH)
				.query_param("page", page.to_string())
				.query_param("per_page", "100")
				.query_param("status", "publish")
				.header("authorization", BASIC_HEADER);
			then.status(200).header("content-type", "application/json").json_body(body);
		})
		.await
}

#[tokio::test]
async fn fetch_all_walks_until_empty_page() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let mut mocks = Vec::new();

	for page in 1..=3 {
		mocks.push(mock_page(&server, page, page_body(page, 100)).await);
	}

	let empty = mock_page(&server, 4, json!([])).await;
	let products = fetcher.fetch_all().await?;

	for mock in &mocks {
		mock.assert_calls_async(1).await;
	}

	empty.assert_calls_async(1).await;

	let ids = products.iter().map(|p| p.id).collect::<Vec<_>>();
	let expected = (1..=300).filter(|id| expected_eligible(*id)).collect::<Vec<_>>();

	assert_eq!(ids, expected);
	assert!(products.iter().all(ProductRecord::is_eligible));

	Ok(())
}

#[tokio::test]
async fn fetch_all_is_idempotent() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);

	mock_page(&server, 1, page_body(1, 100)).await;
	mock_page(&server, 2, page_body(2, 40)).await;
	mock_page(&server, 3, json!([])).await;

	let first = fetcher.fetch_all().await?;
	let second = fetcher.fetch_all().await?;

	assert_eq!(first, second);
	assert!(!first.is_empty());

	Ok(())
}

#[tokio::test]
async fn fetch_all_stops_at_advertised_last_page() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let mut mocks = Vec::new();

	for page in 1..=2 {
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path(PRODUCTS_PATH).query_param("page", page.to_string());
				then.status(200)
					.header("content-type", "application/json")
					.header("X-WP-Total", "200")
					.header("X-WP-TotalPages", "2")
					.json_body(page_body(page, 100));
			})
			.await;

		mocks.push(mock);
	}

	let beyond = mock_page(&server, 3, json!([])).await;
	let products = fetcher.fetch_all().await?;

	for mock in &mocks {
		mock.assert_calls_async(1).await;
	}

	beyond.assert_calls_async(0).await;

	assert_eq!(products.len(), (1..=200).filter(|id| expected_eligible(*id)).count());

	Ok(())
}

#[tokio::test]
async fn fetch_all_filters_ineligible_records() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);

	mock_page(
		&server,
		1,
		json!([
			{"id": 1, "type": "simple", "status": "publish", "manage_stock": true, "stock_quantity": 4},
			{"id": 2, "type": "variable", "status": "publish", "manage_stock": true, "stock_quantity": 9},
			{"id": 3, "type": "variation", "status": "publish", "manage_stock": "parent", "stock_quantity": null},
			{"id": 4, "type": "variation", "status": "publish", "manage_stock": true, "stock_quantity": 2.0},
			{"id": 5, "type": "simple", "status": "private", "manage_stock": true, "stock_quantity": 1},
			{"id": 6, "type": "bundle", "status": "publish", "manage_stock": true, "stock_quantity": 1},
			{"id": 7, "type": "simple", "status": "publish", "manage_stock": false, "stock_quantity": null},
		]),
	)
	.await;
	mock_page(&server, 2, json!([])).await;

	let products = fetcher.fetch_all().await?;

	assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), [1, 4]);
	assert_eq!(products[1].stock_quantity, Some(2));

	Ok(())
}

#[tokio::test]
async fn failure_mid_scan_discards_partial_results() {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let first = mock_page(&server, 1, page_body(1, 100)).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(PRODUCTS_PATH).query_param("page", "2");
			then.status(503).body("{\"code\":\"maintenance\"}");
		})
		.await;

	let err = fetcher.fetch_all().await.expect_err("Scan must fail when a page fails.");

	assert!(matches!(err, Error::Upstream(_)));
	assert_eq!(err.status(), Some(503));
	assert_eq!(err.body(), Some("{\"code\":\"maintenance\"}"));

	first.assert_calls_async(1).await;
}

#[tokio::test]
async fn malformed_page_is_a_parse_failure() {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(PRODUCTS_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"code\":\"rest_no_route\"}");
		})
		.await;

	let err = fetcher.fetch_all().await.expect_err("Object body must not parse as a page.");

	assert!(matches!(err, Error::Parse(_)));
	assert_eq!(err.status(), Some(200));
	assert_eq!(err.body(), Some("{\"code\":\"rest_no_route\"}"));
}

#[tokio::test]
async fn fetch_page_reports_totals_from_headers() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PRODUCTS_PATH)
				.query_param("page", "2")
				.query_param("per_page", "50");
			then.status(200)
				.header("content-type", "application/json")
				.header("X-WP-Total", "120")
				.header("X-WP-TotalPages", "3")
				.json_body(Value::Array(
					(51..=100)
						.map(|id| {
							json!({
								"id": id,
								"type": "simple",
								"status": "publish",
								"manage_stock": true,
								"stock_quantity": 1,
							})
						})
						.collect(),
				));
		})
		.await;
	let page = fetcher.fetch_page(2, 50).await?;

	mock.assert_calls_async(1).await;

	assert_eq!(page.page, 2);
	assert_eq!(page.per_page, 50);
	assert_eq!(page.total_items, 120);
	assert_eq!(page.total_pages, 3);
	assert_eq!(page.items.len(), 50);
	assert_eq!(page.items.first().map(|p| p.id), Some(51));

	Ok(())
}

#[tokio::test]
async fn fetch_page_without_headers_estimates_totals() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(PRODUCTS_PATH).query_param("page", "1");
			then.status(200).header("content-type", "application/json").json_body(json!([
				{"id": 1, "type": "simple", "status": "publish", "manage_stock": true, "stock_quantity": 3},
				{"id": 2, "type": "variable", "status": "publish", "manage_stock": true, "stock_quantity": 3},
			]));
		})
		.await;

	let page = fetcher.fetch_page(1, 10).await?;

	assert_eq!(page.items.len(), 1);
	assert_eq!(page.total_items, 1);
	assert_eq!(page.total_pages, 1);

	Ok(())
}

#[tokio::test]
async fn update_stock_returns_echoed_record() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path(format!("{PRODUCTS_PATH}/42"))
				.header("authorization", BASIC_HEADER)
				.json_body(json!({"stock_quantity": 7, "manage_stock": true}));
			then.status(200).header("content-type", "application/json").json_body(json!({
				"id": 42,
				"name": "Kaasschaaf",
				"type": "simple",
				"status": "publish",
				"manage_stock": true,
				"stock_quantity": 7,
				"date_modified": "2025-03-01T10:00:00",
			}));
		})
		.await;
	let record = fetcher.update_stock(42, 7).await?;

	mock.assert_calls_async(1).await;

	assert_eq!(record.id, 42);
	assert_eq!(record.stock_quantity, Some(7));
	assert!(record.manage_stock);
	assert_eq!(record.extra.get("date_modified"), Some(&json!("2025-03-01T10:00:00")));

	Ok(())
}

#[tokio::test]
async fn update_stock_accepts_a_verbatim_echo() -> Result<()> {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let sent = json!({"stock_quantity": 7, "manage_stock": true});
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT).path(format!("{PRODUCTS_PATH}/42")).json_body(sent.clone());
			then.status(200).header("content-type", "application/json").json_body(sent);
		})
		.await;
	let record = fetcher.update_stock(42, 7).await?;

	mock.assert_calls_async(1).await;

	assert_eq!(record.id, 42);
	assert_eq!(record.stock_quantity, Some(7));
	assert!(record.manage_stock);
	assert!(!record.is_eligible());

	Ok(())
}

#[tokio::test]
async fn update_stock_rejects_mistyped_echo() {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let body = "{\"stock_quantity\":\"seven\"}";

	server
		.mock_async(|when, then| {
			when.method(PUT).path(format!("{PRODUCTS_PATH}/42"));
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;

	let err = fetcher.update_stock(42, 7).await.expect_err("Text quantity must not parse.");

	assert!(matches!(err, Error::Parse(_)));
	assert_eq!(err.status(), Some(200));
	assert_eq!(err.body(), Some(body));
}

#[tokio::test]
async fn update_stock_surfaces_rejection_verbatim() {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);
	let body = "{\"code\":\"woocommerce_rest_product_invalid_id\",\"message\":\"Invalid ID.\"}";

	server
		.mock_async(|when, then| {
			when.method(PUT).path(format!("{PRODUCTS_PATH}/999"));
			then.status(404).header("content-type", "application/json").body(body);
		})
		.await;

	let err = fetcher.update_stock(999, 1).await.expect_err("Unknown product must be rejected.");

	assert!(matches!(err, Error::Upstream(_)));
	assert_eq!(err.status(), Some(404));
	assert_eq!(err.body(), Some(body));
}

#[tokio::test]
async fn update_stock_rejects_non_record_success() {
	let server = MockServer::start_async().await;
	let fetcher = build_fetcher(&server);

	server
		.mock_async(|when, then| {
			when.method(PUT).path(format!("{PRODUCTS_PATH}/42"));
			then.status(200).header("content-type", "text/html").body("<p>Saved</p>");
		})
		.await;

	let err = fetcher.update_stock(42, 3).await.expect_err("HTML echo must not parse.");

	assert!(matches!(err, Error::Parse(_)));
	assert_eq!(err.status(), Some(200));
	assert_eq!(err.body(), Some("<p>Saved</p>"));
}

#[tokio::test]
async fn slow_storefront_times_out() {
	let server = MockServer::start_async().await;
	let fetcher = CatalogFetcher::new(
		&Url::parse(&server.base_url()).expect("Mock store URL should parse successfully."),
		ClientCredentials::new("ck_test", "cs_test"),
		ReqwestHttpClient::with_timeout(StdDuration::from_millis(100))
			.expect("Timeout client should build."),
	)
	.expect("Fetcher should build for the mock store.");

	server
		.mock_async(|when, then| {
			when.method(GET).path(PRODUCTS_PATH);
			then.status(200).delay(StdDuration::from_secs(2)).json_body(json!([]));
		})
		.await;

	let err = fetcher.fetch_all().await.expect_err("Slow storefront must time out.");

	assert!(matches!(err, Error::Upstream(_)));
	assert_eq!(err.status(), None);
}
