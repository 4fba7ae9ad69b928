//! End-to-end crawl runs against a mock venue

use crate::fixtures::symbol_page;
use energy_symbol_crawler::config::{CrawlConfig, LoadType};
use energy_symbol_crawler::crawler::events::{CrawlEvent, MemorySink, Severity};
use energy_symbol_crawler::crawler::Crawler;
use energy_symbol_crawler::fetcher::loader_http::LoaderHttpClient;
use energy_symbol_crawler::fetcher::DocumentFetcher;
use energy_symbol_crawler::shutdown::ShutdownCoordinator;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> CrawlConfig {
    CrawlConfig::default()
        .with_dates("1400/01/01", "1400/01/02")
        .unwrap()
        .with_load_types(vec![LoadType::new("Base", "B"), LoadType::new("Peak", "P")])
        .with_base_url(server.uri())
}

fn crawler(config: &CrawlConfig) -> Crawler {
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(LoaderHttpClient::from_config(config).unwrap());
    Crawler::new(fetcher)
}

async fn serve(server: &MockServer, identifier: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/Loader.aspx"))
        .and(query_param("i", identifier))
        .respond_with(template)
        .mount(server)
        .await;
}

fn page(ins_code: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(symbol_page(ins_code, &[("1400/01/01", "100")]))
}

#[tokio::test]
async fn test_failed_identifier_is_isolated() {
    let server = MockServer::start().await;
    serve(&server, "DAP00PFBEXD000101", page("1")).await;
    serve(&server, "DAP00PFBEXD000102", ResponseTemplate::new(500).set_body_string("boom")).await;
    serve(&server, "DAP00PFPEXD000101", page("3")).await;
    serve(&server, "DAP00PFPEXD000102", page("4")).await;

    let config = config(&server);
    let sink = MemorySink::new();
    let result = crawler(&config).run(&config, &sink).await.unwrap();

    assert_eq!(result.attempted, 4);
    assert!(!result.interrupted);
    let ins_codes: Vec<&str> = result.records().map(|r| r.ins_code.as_str()).collect();
    assert_eq!(ins_codes, ["1", "3", "4"]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].identifier.as_str(), "DAP00PFBEXD000102");

    let failed = sink.with_severity(Severity::Error);
    assert_eq!(failed.len(), 1);
    match &failed[0] {
        CrawlEvent::FetchFailed {
            counter,
            status,
            response,
            request,
            ..
        } => {
            assert_eq!(*counter, 2);
            assert_eq!(*status, Some(500));
            assert_eq!(response.as_deref(), Some("boom"));
            assert!(request.as_deref().unwrap().ends_with("i=DAP00PFBEXD000102"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_timed_out_identifier_is_isolated() {
    let server = MockServer::start().await;
    serve(&server, "DAP00PFBEXD000101", page("1")).await;
    serve(
        &server,
        "DAP00PFBEXD000102",
        page("2").set_delay(Duration::from_secs(3)),
    )
    .await;
    serve(&server, "DAP00PFBEXD000103", page("3")).await;

    let config = config(&server)
        .with_dates("1400/01/01", "1400/01/03")
        .unwrap()
        .with_load_types(vec![LoadType::new("Base", "B")])
        .with_timeout(Duration::from_millis(300));
    let sink = MemorySink::new();
    let result = crawler(&config).run(&config, &sink).await.unwrap();

    let ins_codes: Vec<&str> = result.records().map(|r| r.ins_code.as_str()).collect();
    assert_eq!(ins_codes, ["1", "3"]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].date.to_string(), "1400/01/02");

    let failed = sink.with_severity(Severity::Error);
    assert_eq!(failed.len(), 1);
    match &failed[0] {
        CrawlEvent::FetchFailed {
            counter,
            request,
            status,
            response,
            ..
        } => {
            assert_eq!(*counter, 2);
            assert!(request.as_deref().unwrap().ends_with("i=DAP00PFBEXD000102"));
            assert_eq!(*status, None);
            assert_eq!(*response, None);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_attempt_log_lines_follow_crawl_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page("1"))
        .mount(&server)
        .await;

    let config = config(&server);
    let sink = MemorySink::new();
    crawler(&config).run(&config, &sink).await.unwrap();

    let lines: Vec<String> = sink
        .events()
        .iter()
        .filter(|e| matches!(e, CrawlEvent::Attempt { .. }))
        .map(CrawlEvent::message)
        .collect();
    assert_eq!(
        lines,
        [
            "1,Base,DAP00PFBEXD000101",
            "2,Base,DAP00PFBEXD000102",
            "3,Peak,DAP00PFPEXD000101",
            "4,Peak,DAP00PFPEXD000102",
        ]
    );
}

#[tokio::test]
async fn test_transient_error_recovers_on_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("i", "DAP00PFBEXD000101"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(page("9"))
        .mount(&server)
        .await;

    let config = config(&server).with_dates("1400/01/01", "1400/01/01").unwrap();
    let sink = MemorySink::new();
    let result = crawler(&config)
        .with_max_retries(1)
        .run(&config, &sink)
        .await
        .unwrap();

    assert!(result.is_complete());
    assert_eq!(result.entries.len(), 2);
    let retries = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, CrawlEvent::Retrying { .. }))
        .count();
    assert_eq!(retries, 1);
}

#[tokio::test]
async fn test_malformed_page_kept_with_empty_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Service Unavailable</html>"))
        .mount(&server)
        .await;

    let config = config(&server)
        .with_dates("1400/01/01", "1400/01/01")
        .unwrap()
        .with_load_types(vec![LoadType::new("Base", "B")]);
    let sink = MemorySink::new();
    let result = crawler(&config).run(&config, &sink).await.unwrap();

    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].record.ins_code, "");
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, CrawlEvent::MalformedDocument { .. })));
}

#[tokio::test]
async fn test_concurrent_crawl_matches_sequential() {
    let server = MockServer::start().await;
    serve(&server, "DAP00PFBEXD000101", page("1")).await;
    serve(&server, "DAP00PFBEXD000102", page("2")).await;
    serve(&server, "DAP00PFPEXD000101", page("3")).await;
    serve(&server, "DAP00PFPEXD000102", page("4")).await;

    let config = config(&server);
    let sequential = crawler(&config).run(&config, &MemorySink::new()).await.unwrap();
    let concurrent = crawler(&config)
        .with_concurrency(4)
        .run(&config, &MemorySink::new())
        .await
        .unwrap();

    assert_eq!(sequential, concurrent);
}

#[tokio::test]
async fn test_shutdown_before_start_skips_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page("1"))
        .expect(0)
        .mount(&server)
        .await;

    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let config = config(&server);
    let sink = MemorySink::new();
    let result = crawler(&config)
        .with_shutdown(shutdown)
        .run(&config, &sink)
        .await
        .unwrap();

    assert!(result.interrupted);
    assert_eq!(result.attempted, 0);
    assert!(result.entries.is_empty());
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, CrawlEvent::Interrupted { attempted: 0, total: 4 })));
}
