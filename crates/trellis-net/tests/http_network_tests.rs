//! Integration tests for the HTTP network collaborator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::sync::oneshot;
use trellis_net::http::{DeliveryMode, HttpClient, HttpClientBuilder, HttpNetworkClient};
use trellis_net::{FetchResult, NetworkClient, NetworkError, QueryParams};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_params(count: &str, cursor: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert("count".to_string(), count.to_string());
    if let Some(cursor) = cursor {
        params.insert("cursor".to_string(), cursor.to_string());
    }
    params
}

async fn fetch_immediate(network: &HttpNetworkClient, url: &str, params: QueryParams) -> FetchResult {
    let (tx, rx) = oneshot::channel();
    let _handle = network.get(
        url,
        params,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("fetch timed out")
        .expect("completion dropped")
}

#[tokio::test]
async fn test_client_builder() {
    let client = HttpClientBuilder::new()
        .timeout(Duration::from_secs(60))
        .max_redirects(5)
        .user_agent("FeedTest/1.0")
        .build()
        .expect("Failed to build client");

    assert_eq!(client.config().timeout, Duration::from_secs(60));
    assert_eq!(client.config().max_redirects, 5);
    assert_eq!(client.config().user_agent, "FeedTest/1.0");
    assert_eq!(client.config().bearer_token, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_client_credentials_reach_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(header("authorization", "Bearer token123"))
        .and(header("accept-language", "en"))
        .and(header("user-agent", "FeedTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client = HttpClient::builder()
        .user_agent("FeedTest/1.0")
        .bearer_token("token123")
        .default_header("Accept-Language", "en")
        .expect("header")
        .build()
        .expect("client");
    let network = HttpNetworkClient::from_client(client)
        .expect("network")
        .with_delivery(DeliveryMode::Immediate);
    let url = format!("{}/posts", server.uri());

    for cursor in [None, Some("c1")] {
        let result = fetch_immediate(&network, &url, page_params("20", cursor)).await;
        assert!(result.is_success(), "{:?}", result.error());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unauthenticated_request_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(header("authorization", "Bearer token123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let network = HttpNetworkClient::new()
        .expect("client")
        .with_delivery(DeliveryMode::Immediate);

    let result = fetch_immediate(&network, &format!("{}/posts", server.uri()), QueryParams::new()).await;

    assert_eq!(
        result.error(),
        Some(&NetworkError::HttpStatus {
            status: 401,
            message: None,
        })
    );
}

#[tokio::test]
async fn test_fetch_page_directly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("lang", "en"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cursor": "next"})))
        .mount(&server)
        .await;

    let client = HttpClient::new().expect("client");
    let url = format!("{}/posts?lang=en", server.uri());

    let result = client.fetch_page(&url, &page_params("5", None)).await;

    assert_eq!(result.status_code(), Some(200));
    assert_eq!(result.cursor("cursor"), Some("next"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_immediate_delivery_decodes_json_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("count", "20"))
        .and(query_param("cursor", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1}, {"id": 2}],
            "cursor": "c2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let network = HttpNetworkClient::new()
        .expect("client")
        .with_delivery(DeliveryMode::Immediate);
    let url = format!("{}/posts", server.uri());

    let result = fetch_immediate(&network, &url, page_params("20", Some("c1"))).await;

    assert!(result.is_success());
    assert_eq!(result.status_code(), Some(200));
    assert_eq!(result.cursor("cursor"), Some("c2"));
    assert_eq!(result.field("items").and_then(|v| v.as_array()).map(Vec::len), Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_error_status_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let network = HttpNetworkClient::new()
        .expect("client")
        .with_delivery(DeliveryMode::Immediate);
    let url = format!("{}/posts", server.uri());

    let result = fetch_immediate(&network, &url, page_params("20", None)).await;

    assert!(!result.is_success());
    assert_eq!(result.status_code(), Some(500));
    assert_eq!(
        result.error(),
        Some(&NetworkError::HttpStatus {
            status: 500,
            message: Some("boom".to_string()),
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_non_json_body_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let network = HttpNetworkClient::new()
        .expect("client")
        .with_delivery(DeliveryMode::Immediate);
    let url = format!("{}/posts", server.uri());

    let result = fetch_immediate(&network, &url, QueryParams::new()).await;

    assert!(matches!(result.error(), Some(NetworkError::Json(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_url_is_failure() {
    let network = HttpNetworkClient::new()
        .expect("client")
        .with_delivery(DeliveryMode::Immediate);

    let result = fetch_immediate(&network, "not a url", QueryParams::new()).await;

    assert!(matches!(result.error(), Some(NetworkError::InvalidUrl(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queued_delivery_waits_for_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let network = HttpNetworkClient::new().expect("client");
    assert_eq!(network.delivery(), DeliveryMode::Queued);

    let delivered = Arc::new(AtomicBool::new(false));
    let delivered_clone = delivered.clone();
    let _handle = network.get(
        &format!("{}/posts", server.uri()),
        QueryParams::new(),
        Box::new(move |result| {
            assert!(result.is_success());
            delivered_clone.store(true, Ordering::SeqCst);
        }),
    );

    let mut waited = Duration::ZERO;
    while network.pending_deliveries() == 0 && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += Duration::from_millis(10);
    }

    assert!(!delivered.load(Ordering::SeqCst));
    assert_eq!(network.dispatch_pending(), 1);
    assert!(delivered.load(Ordering::SeqCst));
    assert_eq!(network.dispatch_pending(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_request_never_completes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"cursor": "late"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let network = HttpNetworkClient::new()
        .expect("client")
        .with_delivery(DeliveryMode::Immediate);

    let completed = Arc::new(AtomicBool::new(false));
    let completed_clone = completed.clone();
    let handle = network.get(
        &format!("{}/slow", server.uri()),
        QueryParams::new(),
        Box::new(move |_| completed_clone.store(true, Ordering::SeqCst)),
    );

    assert!(handle.is_pending());
    assert!(handle.cancel());
    assert!(!handle.is_pending());

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert!(!completed.load(Ordering::SeqCst));
}
