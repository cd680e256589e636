/*!
 * Integration tests for HTTP page and payload retrieval
 */

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytcapsum::captions::{CaptionEntry, CaptionSource};
use ytcapsum::errors::{FetchError, PipelineError};
use ytcapsum::fetcher::{HttpFetcher, TextFetcher};

use crate::common;

fn source_for(server: &MockServer, timeout: Duration) -> CaptionSource {
    CaptionSource::new(Arc::new(HttpFetcher::new(timeout)), server.uri())
}

#[tokio::test]
async fn test_fetchText_withSuccess_shouldReturnBody() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5));
    let body = fetcher
        .fetch_text(&format!("{}/page", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn test_fetchText_withErrorStatus_shouldReportStatus() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5));
    let url = format!("{}/missing", server.uri());
    let error = fetcher.fetch_text(&url).await.unwrap_err();

    assert_eq!(error, FetchError::Status { status: 404, url });
}

#[tokio::test]
async fn test_fetchText_withSlowServer_shouldTimeOut() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_millis(200));
    let error = fetcher
        .fetch_text(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(error, FetchError::Timeout(_)), "got {:?}", error);
}

#[tokio::test]
async fn test_fetchText_withClosedPort_shouldBeConnectionError() {
    let url = format!("{}/gone", common::closed_port_uri());

    let fetcher = HttpFetcher::new(Duration::from_secs(5));
    let error = fetcher.fetch_text(&url).await.unwrap_err();

    assert!(matches!(error, FetchError::Connection(_)), "got {:?}", error);
}

#[tokio::test]
async fn test_watchPage_shouldRequestWatchUrlWithVideoId() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", common::VIDEO_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_secs(5));
    let html = source.watch_page(common::VIDEO_ID).await.unwrap();

    assert_eq!(html, "<html></html>");
}

#[tokio::test]
async fn test_watchPage_withServerError_shouldBePageFetchFailed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_secs(5));
    let error = source.watch_page(common::VIDEO_ID).await.unwrap_err();

    assert!(matches!(
        error,
        PipelineError::PageFetchFailed(FetchError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_entries_shouldFetchAndParsePayload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "en"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(common::timed_text(&[("1", "2", "Hi there")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_secs(5));
    let entries = source
        .entries(&format!("{}/api/timedtext?v=x&lang=en", server.uri()))
        .await
        .unwrap();

    assert_eq!(entries, vec![CaptionEntry::new(1.0, 2.0, "Hi there")]);
}

#[tokio::test]
async fn test_entries_withMalformedPayload_shouldBePayloadParseFailed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<transcript><text>a</b></transcript>"),
        )
        .mount(&server)
        .await;

    let source = source_for(&server, Duration::from_secs(5));
    let error = source
        .entries(&format!("{}/api/timedtext", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::PayloadParseFailed(_)));
}
