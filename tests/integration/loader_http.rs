//! Integration tests for the loader HTTP client against a mock venue

use energy_symbol_crawler::crawler::RateLimiter;
use energy_symbol_crawler::fetcher::loader_http::LoaderHttpClient;
use energy_symbol_crawler::fetcher::{DocumentFetcher, FetchError};
use energy_symbol_crawler::identifier::SymbolIdentifier;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn identifier() -> SymbolIdentifier {
    SymbolIdentifier::from_raw("DAP00PFBEXD000101")
}

fn client(server: &MockServer, timeout: Duration) -> LoaderHttpClient {
    LoaderHttpClient::new(server.uri(), "crawler-test/1.0", timeout).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_loader_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Loader.aspx"))
        .and(query_param("ParTree", "15131S"))
        .and(query_param("i", "DAP00PFBEXD000101"))
        .and(header("user-agent", "crawler-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("var InsCode='7';"))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server, Duration::from_secs(5))
        .fetch(&identifier())
        .await
        .unwrap();
    assert_eq!(body, "var InsCode='7';");
}

#[tokio::test]
async fn test_error_status_keeps_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Loader.aspx"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .fetch(&identifier())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(err.response_body(), Some("maintenance"));
    assert!(err.url().unwrap().contains("i=DAP00PFBEXD000101"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_not_found_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .fetch(&identifier())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_millis(200))
        .fetch(&identifier())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limiter_spaces_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(3)
        .mount(&server)
        .await;

    let limiter = Arc::new(RateLimiter::request_based(2, Duration::from_millis(300)));
    let client = client(&server, Duration::from_secs(5)).with_rate_limiter(limiter);

    let start = Instant::now();
    for _ in 0..3 {
        client.fetch(&identifier()).await.unwrap();
    }
    assert!(start.elapsed() >= Duration::from_millis(250));
}
