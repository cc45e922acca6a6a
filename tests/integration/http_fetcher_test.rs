use fincrawl::config::settings::{FetcherEngine, FetcherSettings};
use fincrawl::domain::models::crawl::FetchErrorKind;
use fincrawl::engines::fetch_client::FetchClient;
use fincrawl::engines::http_fetcher::HttpPageFetcher;
use fincrawl::engines::traits::{PageFetchError, PageFetcher};
use fincrawl::utils::retry_policy::RetryPolicy;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUOTE_PAGE: &str = r#"<html><body>
<div class="quote"><span class="price">$1,234.50</span></div>
</body></html>"#;

fn fetcher_for(server: &MockServer) -> HttpPageFetcher {
    let settings = FetcherSettings {
        engine: FetcherEngine::Http,
        base_url: format!("{}/quote", server.uri()),
        price_selector: ".quote .price".to_string(),
        wait_timeout_secs: 1,
        remote_debugging_url: None,
        user_agent: None,
    };
    HttpPageFetcher::new(&settings).unwrap()
}

#[tokio::test]
async fn test_fetch_price_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    assert_eq!(fetcher.fetch_price("AAPL").await.unwrap(), "$1,234.50");
}

#[tokio::test]
async fn test_missing_price_element_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_price("AAPL").await.unwrap_err();
    assert!(matches!(err, PageFetchError::NotFound(_)));
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote/MISSING"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quote/BROKEN"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let missing = fetcher.fetch_price("MISSING").await.unwrap_err();
    assert_eq!(missing.kind(), FetchErrorKind::NotFound);
    let broken = fetcher.fetch_price("BROKEN").await.unwrap_err();
    assert_eq!(broken.kind(), FetchErrorKind::Unexpected);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote/SLOW"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(QUOTE_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_price("SLOW").await.unwrap_err();
    assert!(matches!(err, PageFetchError::Timeout(_)));
}

/// 404 会按重试策略重试，直到用完尝试次数
#[tokio::test]
async fn test_fetch_client_retries_not_found_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote/GONE"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quote/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(QUOTE_PAGE))
        .mount(&server)
        .await;

    let fetcher: Arc<dyn PageFetcher> = Arc::new(fetcher_for(&server));
    let client = FetchClient::new(
        fetcher,
        RetryPolicy::fixed(3, Duration::from_millis(5)),
        Duration::from_secs(2),
    );

    let outcome = client.fetch("GONE").await;
    assert!(!outcome.succeeded);
    assert_eq!(outcome.error, Some(FetchErrorKind::NotFound));
    assert_eq!(outcome.attempts, 3);

    let outcome = client.fetch("AAPL").await;
    assert!(outcome.succeeded);
    assert_eq!(outcome.price, Some(dec!(1234.50)));
    assert_eq!(outcome.attempts, 1);
}
