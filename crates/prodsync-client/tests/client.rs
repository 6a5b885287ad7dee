//! Integration tests for `ProductsClient` using wiremock HTTP mocks.

use prodsync_client::{ClientError, ProductsClient, UpdateOutcome};
use prodsync_core::{Product, ProductId};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ProductsClient {
    ProductsClient::new(base_url, 5, "prodsync-test/0.1")
        .expect("client construction should not fail")
}

fn api_base(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

#[tokio::test]
async fn fetch_products_returns_results_in_server_order() {
    let server = MockServer::start().await;

    let body = json!({
        "results": [
            {"id": 2, "name": "Bib Overall Straight", "thumbnail": "uploads/product2.webp"},
            {"id": 1, "name": "W simple pant", "thumbnail": "uploads/product1.webp"}
        ],
        "success": true
    });

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("user-agent", "prodsync-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let products = client.fetch_products().await.expect("should parse products");

    let ids: Vec<String> = products
        .iter()
        .map(|p| p.id().expect("fixture has ids").to_string())
        .collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(products[1].get("name"), Some(&json!("W simple pant")));
}

#[tokio::test]
async fn fetch_products_treats_not_found_envelope_as_empty_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(404).set_body_json(&json!({
            "success": false,
            "message": "No products found"
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let products = client.fetch_products().await.expect("404 envelope is empty");
    assert!(products.is_empty());
}

#[tokio::test]
async fn fetch_products_plain_404_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Cannot GET /api/products"))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let err = client.fetch_products().await.unwrap_err();
    assert!(
        matches!(err, ClientError::UnexpectedStatus { status: 404, .. }),
        "expected UnexpectedStatus(404), got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_products_server_error_carries_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500).set_body_json(&json!({
            "success": false,
            "message": "connection refused by database"
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let err = client.fetch_products().await.unwrap_err();
    match err {
        ClientError::UnexpectedStatus {
            status, message, ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("connection refused by database"));
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_products_non_json_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }));
}

#[tokio::test]
async fn fetch_products_without_results_key_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"success": true})))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }));
}

#[tokio::test]
async fn fetch_products_unreachable_server_is_http_error() {
    // Port 1 on loopback is reserved and refuses connections.
    let client = test_client("http://127.0.0.1:1/api");
    let err = client.fetch_products().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}

#[tokio::test]
async fn fetch_product_returns_single_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "results": {"id": 1, "name": "W simple pant", "price": 123},
            "success": true
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let product = client
        .fetch_product(&ProductId::from(1))
        .await
        .expect("should parse product");
    assert_eq!(product.get("price"), Some(&json!(123)));
}

#[tokio::test]
async fn fetch_product_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(&json!({
            "success": false,
            "message": "Product not found"
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let err = client.fetch_product(&ProductId::from(99)).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { ref url } if url.ends_with("/api/products/99")));
}

#[tokio::test]
async fn update_product_puts_full_record_and_returns_server_copy() {
    let server = MockServer::start().await;

    let sent = json!({
        "id": 1,
        "name": "W simple pant",
        "price": 123,
        "thumbnail": "uploads/product1.webp",
        "thumbnail_base64": "aGVsbG8=",
        "thumbnail_name": "product1.webp"
    });

    Mock::given(method("PUT"))
        .and(path("/api/products/1"))
        .and(body_json(&sent))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "success": true,
            "results": {"id": 1, "name": "W simple pant", "price": 123,
                        "thumbnail": "https://cdn.example.com/product1.webp"},
            "message": "Product 1 has been successfully updated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let product: Product = serde_json::from_value(sent).unwrap();
    let outcome = client
        .update_product(&ProductId::from(1), &product)
        .await
        .expect("update should reach the server");

    match outcome {
        UpdateOutcome::Updated(updated) => assert_eq!(
            updated.get("thumbnail"),
            Some(&json!("https://cdn.example.com/product1.webp"))
        ),
        UpdateOutcome::Rejected { status, .. } => panic!("unexpected rejection: {status}"),
    }
}

#[tokio::test]
async fn update_product_rejection_is_an_outcome_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/products/4"))
        .respond_with(ResponseTemplate::new(400).set_body_json(&json!({
            "success": false,
            "message": "Product ID, name, and price are required fields"
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let product: Product = serde_json::from_value(json!({"id": 4})).unwrap();
    let outcome = client
        .update_product(&ProductId::from(4), &product)
        .await
        .expect("a rejection still reached the server");

    assert!(matches!(
        outcome,
        UpdateOutcome::Rejected { status: 400, ref message }
            if message.as_deref() == Some("Product ID, name, and price are required fields")
    ));
}

#[tokio::test]
async fn fetch_product_server_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/7"))
        .respond_with(ResponseTemplate::new(500).set_body_json(&json!({
            "success": false,
            "message": "database unavailable"
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let err = client.fetch_product(&ProductId::from(7)).await.unwrap_err();
    match err {
        ClientError::UnexpectedStatus {
            status,
            url,
            message,
        } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/api/products/7"), "got url: {url}");
            assert_eq!(message.as_deref(), Some("database unavailable"));
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn update_product_non_envelope_2xx_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("garbage"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_base(&server));
    let product: Product = serde_json::from_value(json!({"id": 1})).unwrap();
    let err = client
        .update_product(&ProductId::from(1), &product)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ClientError::Deserialize { ref context, .. } if context.contains("product 1")),
        "expected Deserialize, got: {err:?}"
    );
}
