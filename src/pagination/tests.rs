//! Tests for pagination module

use super::*;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::Requestor;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::{Duration, Instant};
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn paginator_for(server: &MockServer) -> Paginator {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .max_requests_per_second(1000)
        .build();
    Paginator::new(Requestor::with_config(&config).unwrap())
}

fn page_items(page: u32) -> Vec<u32> {
    vec![page * 100, page * 100 + 1, page * 100 + 2]
}

fn page_response(page: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(page_items(page))
}

fn page_mock(page: u32, response: ResponseTemplate) -> Mock {
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
}

/// Mount pages `1..=total_pages`, each advertising the total
async fn mount_total(server: &MockServer, total_pages: u32) {
    for page in 1..=total_pages {
        page_mock(
            page,
            page_response(page).insert_header("X-Total-Pages", total_pages.to_string()),
        )
        .expect(1)
        .mount(server)
        .await;
    }
}

fn expected_items(pages: std::ops::RangeInclusive<u32>) -> Vec<u32> {
    pages.flat_map(page_items).collect()
}

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, HeaderValue::from_static(value));
    }
    map
}

// ============================================================================
// Strategy Decision Tests
// ============================================================================

#[test_case(0, 0 => FetchStrategy::SinglePage ; "no total no next")]
#[test_case(0, 1 => FetchStrategy::SinglePage ; "no total next is one")]
#[test_case(0, 2 => FetchStrategy::Next ; "no total next is two")]
#[test_case(0, 40 => FetchStrategy::Next ; "no total far next")]
#[test_case(1, 0 => FetchStrategy::SinglePage ; "one page")]
#[test_case(1, 9 => FetchStrategy::SinglePage ; "one page ignores next")]
#[test_case(5, 0 => FetchStrategy::Total { total_pages: 5 } ; "known total")]
#[test_case(5, 2 => FetchStrategy::Total { total_pages: 5 } ; "known total ignores next")]
fn test_strategy_decision(total_pages: u32, next_page: u32) -> FetchStrategy {
    let metadata = PageMetadata {
        total_pages,
        next_page,
        ..PageMetadata::default()
    };
    FetchStrategy::decide(&metadata).unwrap()
}

#[test]
fn test_strategy_display() {
    assert_eq!(FetchStrategy::SinglePage.to_string(), "single-page");
    assert_eq!(FetchStrategy::Next.to_string(), "next");
    assert_eq!(
        FetchStrategy::Total { total_pages: 3 }.to_string(),
        "total (3 pages)"
    );
}

// ============================================================================
// Page URL Tests
// ============================================================================

#[test_case("https://host/api/v4/projects", 1 => "https://host/api/v4/projects?per_page=100&page=1" ; "no query")]
#[test_case("https://host/api/v4/projects?archived=false", 3 => "https://host/api/v4/projects?archived=false&per_page=100&page=3" ; "existing query")]
#[test_case("/items", 12 => "/items?per_page=100&page=12" ; "relative path")]
fn test_page_url(url: &str, page: u32) -> String {
    page_url(url, page)
}

// ============================================================================
// Header Parsing Tests
// ============================================================================

#[test]
fn test_parse_header_absent_and_empty_read_as_zero() {
    let map = headers(&[("x-next-page", "")]);
    assert_eq!(parse_header::<u32>(&map, "x-next-page").unwrap(), 0);
    assert_eq!(parse_header::<u32>(&map, "x-total-pages").unwrap(), 0);
}

#[test]
fn test_parse_header_reads_first_value() {
    let mut map = headers(&[("x-total-pages", "7")]);
    map.append("x-total-pages", HeaderValue::from_static("9"));
    assert_eq!(parse_header::<u32>(&map, "x-total-pages").unwrap(), 7);
    assert_eq!(parse_header::<u32>(&map, "X-Total-Pages").unwrap(), 7);
}

#[test]
fn test_parse_header_malformed_is_error() {
    let map = headers(&[("x-total-pages", "many")]);
    let err = parse_header::<u32>(&map, "x-total-pages").unwrap_err();
    match err {
        Error::InvalidHeader { name, value } => {
            assert_eq!(name, "x-total-pages");
            assert_eq!(value, "many");
        }
        other => panic!("Expected InvalidHeader, got {other:?}"),
    }
}

#[test]
fn test_page_metadata_from_headers() {
    let map = headers(&[
        ("x-total-pages", "4"),
        ("x-next-page", "3"),
        ("x-total", "350"),
        ("x-page", "2"),
        ("x-per-page", "100"),
    ]);
    let metadata = PageMetadata::from_headers(&map).unwrap();

    assert_eq!(
        metadata,
        PageMetadata {
            total_pages: 4,
            next_page: 3,
            total_items: 350,
            page: 2,
            per_page: 100,
        }
    );
    assert!(metadata.has_next());
    assert!(!PageMetadata::default().has_next());
}

// ============================================================================
// fetch_all Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_all_single_page() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1))
        .expect(1)
        .mount(&mock_server)
        .await;

    let items: Vec<u32> = paginator_for(&mock_server)
        .fetch_all("/items")
        .await
        .unwrap();

    assert_eq!(items, page_items(1));
}

#[tokio::test]
async fn test_fetch_all_follows_next_page() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1).insert_header("X-Next-Page", "2"))
        .expect(1)
        .mount(&mock_server)
        .await;
    page_mock(2, page_response(2).insert_header("X-Next-Page", "3"))
        .expect(1)
        .mount(&mock_server)
        .await;
    page_mock(3, page_response(3).insert_header("X-Next-Page", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let items: Vec<u32> = paginator_for(&mock_server)
        .fetch_all("/items")
        .await
        .unwrap();

    assert_eq!(items, expected_items(1..=3));
}

#[tokio::test]
async fn test_fetch_all_total_preserves_page_order() {
    let mock_server = MockServer::start().await;
    for page in 1..=5 {
        // Earlier pages answer slower so completion order is reversed.
        let delay = Duration::from_millis(u64::from(6 - page) * 30);
        page_mock(
            page,
            page_response(page)
                .insert_header("X-Total-Pages", "5")
                .set_delay(delay),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    }

    let items: Vec<u32> = paginator_for(&mock_server)
        .with_parallelism(3)
        .fetch_all("/items")
        .await
        .unwrap();

    assert_eq!(items, expected_items(1..=5));
}

#[tokio::test]
async fn test_fetch_all_total_fetches_window_concurrently() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1).insert_header("X-Total-Pages", "5"))
        .mount(&mock_server)
        .await;
    for page in 2..=5 {
        page_mock(
            page,
            page_response(page)
                .insert_header("X-Total-Pages", "5")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    }

    let start = Instant::now();
    let items: Vec<u32> = paginator_for(&mock_server)
        .with_parallelism(4)
        .fetch_all("/items")
        .await
        .unwrap();

    assert_eq!(items.len(), 15);
    assert!(start.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_fetch_all_failure_discards_partial_results() {
    let mock_server = MockServer::start().await;
    for page in [1, 3, 4, 5] {
        page_mock(page, page_response(page).insert_header("X-Total-Pages", "5"))
            .mount(&mock_server)
            .await;
    }
    page_mock(2, ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let err = paginator_for(&mock_server)
        .with_parallelism(1)
        .fetch_all::<u32>("/items")
        .await
        .unwrap_err();

    match err {
        Error::Remote { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("Expected Remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_all_keeps_existing_query() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("archived", "false"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .respond_with(page_response(1))
        .expect(1)
        .mount(&mock_server)
        .await;

    let items: Vec<u32> = paginator_for(&mock_server)
        .fetch_all("/items?archived=false")
        .await
        .unwrap();

    assert_eq!(items, page_items(1));
}

#[tokio::test]
async fn test_fetch_all_malformed_header() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1).insert_header("X-Total-Pages", "lots"))
        .mount(&mock_server)
        .await;

    let err = paginator_for(&mock_server)
        .fetch_all::<u32>("/items")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidHeader { .. }));
}

#[tokio::test]
async fn test_first_page_reports_strategy() {
    let mock_server = MockServer::start().await;
    page_mock(
        1,
        page_response(1)
            .insert_header("X-Total-Pages", "0")
            .insert_header("X-Next-Page", "2"),
    )
    .mount(&mock_server)
    .await;

    let (items, metadata, strategy) = paginator_for(&mock_server)
        .first_page::<u32>("/items")
        .await
        .unwrap();

    assert_eq!(items, page_items(1));
    assert_eq!(metadata.next_page, 2);
    assert_eq!(strategy, FetchStrategy::Next);
}

// ============================================================================
// fetch_paged Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_paged_rejects_invalid_arguments() {
    let mock_server = MockServer::start().await;
    let paginator = paginator_for(&mock_server);

    let err = paginator.fetch_paged::<u32>("/items", 0, 1).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let err = paginator.fetch_paged::<u32>("/items", 4, 0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_fetch_paged_is_lazy() {
    let mock_server = MockServer::start().await;
    mount_total(&mock_server, 1).await;

    let mut pages = paginator_for(&mock_server)
        .fetch_paged::<u32>("/items", 2, 1)
        .unwrap();
    assert!(mock_server.received_requests().await.unwrap().is_empty());

    assert_eq!(pages.next().await.unwrap().unwrap(), page_items(1));
    assert!(pages.next().await.is_none());
}

#[tokio::test]
async fn test_fetch_paged_single_page() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1))
        .expect(1)
        .mount(&mock_server)
        .await;

    let batches: Vec<Vec<u32>> = paginator_for(&mock_server)
        .fetch_paged("/items", 3, 1)
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(batches, vec![page_items(1)]);
}

#[tokio::test]
async fn test_fetch_paged_total_one_buffered_page() {
    let mock_server = MockServer::start().await;
    mount_total(&mock_server, 3).await;

    let batches: Vec<Vec<u32>> = paginator_for(&mock_server)
        .fetch_paged("/items", 1, 1)
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(batches, vec![page_items(1), page_items(2), page_items(3)]);
}

#[tokio::test]
async fn test_fetch_paged_total_keeps_order_with_look_ahead() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1).insert_header("X-Total-Pages", "6"))
        .mount(&mock_server)
        .await;
    for page in 2..=6 {
        let delay = Duration::from_millis(if page % 2 == 0 { 120 } else { 10 });
        page_mock(
            page,
            page_response(page)
                .insert_header("X-Total-Pages", "6")
                .set_delay(delay),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    }

    let batches: Vec<Vec<u32>> = paginator_for(&mock_server)
        .fetch_paged("/items", 3, 1)
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    let expected: Vec<Vec<u32>> = (1..=6).map(page_items).collect();
    assert_eq!(batches, expected);
}

#[tokio::test]
async fn test_fetch_paged_prefetches_while_consumer_waits() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1).insert_header("X-Total-Pages", "4"))
        .mount(&mock_server)
        .await;
    for page in 2..=4 {
        page_mock(
            page,
            page_response(page)
                .insert_header("X-Total-Pages", "4")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    }

    let mut pages = paginator_for(&mock_server)
        .fetch_paged::<u32>("/items", 3, 1)
        .unwrap();
    let start = Instant::now();
    let mut count = 0;
    while let Some(batch) = pages.next().await {
        batch.unwrap();
        count += 1;
    }

    assert_eq!(count, 4);
    assert!(start.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn test_fetch_paged_from_later_first_page() {
    let mock_server = MockServer::start().await;
    for page in 2..=3 {
        page_mock(page, page_response(page).insert_header("X-Total-Pages", "3"))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let batches: Vec<Vec<u32>> = paginator_for(&mock_server)
        .fetch_paged("/items", 2, 2)
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(batches, vec![page_items(2), page_items(3)]);
}

#[tokio::test]
async fn test_fetch_paged_from_last_page_index() {
    let mock_server = MockServer::start().await;
    page_mock(
        u32::MAX,
        ResponseTemplate::new(200)
            .set_body_json(vec![7u32])
            .insert_header("X-Total-Pages", "5"),
    )
    .expect(1)
    .mount(&mock_server)
    .await;

    let batches: Vec<Vec<u32>> = paginator_for(&mock_server)
        .fetch_paged("/items", 1, u32::MAX)
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(batches, vec![vec![7]]);
}

#[tokio::test]
async fn test_fetch_paged_stops_at_largest_page_index() {
    let mock_server = MockServer::start().await;
    let total = u32::MAX.to_string();
    for (page, item) in [(u32::MAX - 1, 1u32), (u32::MAX, 2)] {
        page_mock(
            page,
            ResponseTemplate::new(200)
                .set_body_json(vec![item])
                .insert_header("X-Total-Pages", total.as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    }

    let batches: Vec<Vec<u32>> = paginator_for(&mock_server)
        .fetch_paged("/items", 1, u32::MAX - 1)
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(batches, vec![vec![1], vec![2]]);
}

#[tokio::test]
async fn test_fetch_paged_follows_next_page() {
    let mock_server = MockServer::start().await;
    page_mock(1, page_response(1).insert_header("X-Next-Page", "2"))
        .expect(1)
        .mount(&mock_server)
        .await;
    page_mock(2, page_response(2))
        .expect(1)
        .mount(&mock_server)
        .await;

    let batches: Vec<Vec<u32>> = paginator_for(&mock_server)
        .fetch_paged("/items", 5, 1)
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(batches, vec![page_items(1), page_items(2)]);
}

#[tokio::test]
async fn test_fetch_paged_error_ends_stream() {
    let mock_server = MockServer::start().await;
    for page in [1, 2, 4] {
        page_mock(page, page_response(page).insert_header("X-Total-Pages", "4"))
            .mount(&mock_server)
            .await;
    }
    page_mock(3, ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let mut pages = paginator_for(&mock_server)
        .fetch_paged::<u32>("/items", 1, 1)
        .unwrap();

    assert_eq!(pages.next().await.unwrap().unwrap(), page_items(1));
    assert_eq!(pages.next().await.unwrap().unwrap(), page_items(2));

    let err = pages.next().await.unwrap().unwrap_err();
    assert_eq!(err.status(), Some(502));

    assert!(pages.next().await.is_none());
    assert!(pages.next().await.is_none());
}
