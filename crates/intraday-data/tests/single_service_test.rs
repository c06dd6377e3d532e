//! 단일 조회 SWR 통합 테스트.
//!
//! 메모리 백엔드와 Mock 제공자로 서비스의 public API만 검증합니다.
//! 시간은 `start_paused`로 멈춘 뒤 직접 진행시킵니다.

mod common;

use common::{build_service, sample_bars, stock_key, MockProvider, UnreachableBackend};
use intraday_core::{DataKind, DateRange, Interval};
use intraday_data::{CacheBackend, MemoryCache};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_miss_fetches_and_stores_then_hits() {
    let cache = MemoryCache::new();
    let (service, stats) = build_service(Arc::new(cache.clone()), MockProvider::new());

    let first = service
        .get_stock_intraday("aapl", Interval::M1, DateRange::unbounded())
        .await;
    assert_eq!(first.symbol, "AAPL");
    assert!(!first.cached);
    assert_eq!(first.ttl_remaining, Some(60));
    assert_eq!(first.data.len(), 3);
    assert!(first.error.is_none());

    // 미스 경로의 저장은 응답 전에 끝남
    assert_eq!(cache.ttl_remaining(&stock_key("AAPL")).await.unwrap(), Some(60));

    let second = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    assert!(second.cached);
    assert_eq!(second.ttl_remaining, Some(60));
    assert!(!second.background_refresh_triggered);
    assert_eq!(second.data, first.data);

    assert_eq!(stats.fetches(), 1);
    let metrics = service.metrics();
    assert_eq!(metrics.hits, 1);
    assert_eq!(metrics.misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_hit_does_not_refresh() {
    let cache = MemoryCache::new();
    cache.set(&stock_key("MSFT"), &sample_bars(2), 60).await.unwrap();
    let (service, stats) = build_service(Arc::new(cache), MockProvider::new());

    tokio::time::advance(Duration::from_secs(29)).await;
    let result = service
        .get_stock_intraday("MSFT", Interval::M1, DateRange::unbounded())
        .await;

    assert!(result.cached);
    assert_eq!(result.ttl_remaining, Some(31));
    assert!(!result.background_refresh_triggered);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(stats.opens(), 0);
    assert_eq!(stats.fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_hit_serves_cached_and_refreshes_once() {
    let cache = MemoryCache::new();
    let cached_bars = sample_bars(2);
    cache.set(&stock_key("AAPL"), &cached_bars, 60).await.unwrap();

    let provider = MockProvider::new()
        .with_bars(sample_bars(5))
        .with_delay(Duration::from_secs(1));
    let (service, stats) = build_service(Arc::new(cache.clone()), provider);

    // 남은 TTL 25초 (임계값 30초 이하)
    tokio::time::advance(Duration::from_secs(35)).await;

    let (a, b) = tokio::join!(
        service.get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded()),
        service.get_stock_intraday("aapl", Interval::M1, DateRange::unbounded()),
    );

    for result in [&a, &b] {
        assert!(result.cached);
        assert_eq!(result.data, cached_bars);
        assert_eq!(result.ttl_remaining, Some(25));
        assert!(result.background_refresh_triggered);
    }
    assert!(
        service
            .is_refreshing(DataKind::Stock, "AAPL", Interval::M1, &DateRange::unbounded())
            .await
    );

    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(stats.fetches(), 1, "concurrent stale hits share one refresh");
    assert!(
        !service
            .is_refreshing(DataKind::Stock, "AAPL", Interval::M1, &DateRange::unbounded())
            .await
    );

    let metrics = service.metrics();
    assert_eq!(metrics.refreshes_spawned, 1);
    assert_eq!(metrics.refreshes_skipped, 1);
    assert_eq!(metrics.stale_hits, 2);

    // 갱신된 값은 하드 TTL로 다시 저장됨
    let refreshed = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    assert!(refreshed.cached);
    assert_eq!(refreshed.data.len(), 5);
    assert!(!refreshed.background_refresh_triggered);
    assert_eq!(refreshed.ttl_remaining, Some(59));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_can_run_again_after_completion() {
    let cache = MemoryCache::new();
    cache.set(&stock_key("AAPL"), &sample_bars(2), 60).await.unwrap();
    // 갱신 결과가 저장되지 않도록 실패시켜 항목을 stale 상태로 유지
    let provider = MockProvider::new().failing("AAPL");
    let (service, stats) = build_service(Arc::new(cache), provider);

    tokio::time::advance(Duration::from_secs(40)).await;

    service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(stats.fetches(), 2);
    assert_eq!(service.metrics().refreshes_spawned, 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_stale_value() {
    let cache = MemoryCache::new();
    let cached_bars = sample_bars(2);
    cache.set(&stock_key("AAPL"), &cached_bars, 60).await.unwrap();
    let (service, _stats) = build_service(
        Arc::new(cache.clone()),
        MockProvider::new().failing("AAPL"),
    );

    tokio::time::advance(Duration::from_secs(35)).await;

    let result = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    assert!(result.cached);
    assert!(result.background_refresh_triggered);
    assert!(result.error.is_none());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(service.metrics().refresh_failures, 1);
    assert_eq!(cache.get(&stock_key("AAPL")).await.unwrap(), Some(cached_bars));
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_miss() {
    let cache = MemoryCache::new();
    cache.set(&stock_key("AAPL"), &sample_bars(2), 60).await.unwrap();
    let (service, stats) = build_service(Arc::new(cache), MockProvider::new());

    tokio::time::advance(Duration::from_secs(60)).await;

    let result = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    assert!(!result.cached);
    assert_eq!(result.data.len(), 3);
    assert_eq!(stats.fetches(), 1);
}

#[tokio::test]
async fn test_fetch_error_is_reported_in_result() {
    let cache = MemoryCache::new();
    let (service, _stats) = build_service(
        Arc::new(cache.clone()),
        MockProvider::new().failing("BADSYM"),
    );

    let result = service
        .get_stock_intraday("badsym", Interval::M5, DateRange::unbounded())
        .await;

    assert_eq!(result.symbol, "BADSYM");
    assert_eq!(result.interval, Interval::M5);
    assert!(result.data.is_empty());
    assert!(!result.cached);
    assert_eq!(result.ttl_remaining, None);
    assert!(!result.background_refresh_triggered);
    assert!(result.error.unwrap().contains("BADSYM"));

    assert!(cache.is_empty().await, "failures are not cached");
    assert_eq!(service.metrics().fetch_errors, 1);
}

#[tokio::test]
async fn test_session_open_failure_is_reported_in_result() {
    let (service, _stats) = build_service(
        Arc::new(MemoryCache::new()),
        MockProvider::new().failing_open(),
    );

    let result = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;

    assert!(result.data.is_empty());
    assert!(result.error.unwrap().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_empty_upstream_result_is_success() {
    let cache = MemoryCache::new();
    let (service, stats) = build_service(
        Arc::new(cache.clone()),
        MockProvider::new().with_bars(Vec::new()),
    );

    let first = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    assert!(first.data.is_empty());
    assert!(first.error.is_none());

    let second = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    assert!(second.cached, "empty result is cached like any other");
    assert_eq!(stats.fetches(), 1);
}

#[tokio::test]
async fn test_backend_failure_degrades_to_upstream() {
    let (service, stats) = build_service(Arc::new(UnreachableBackend), MockProvider::new());

    let result = service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;

    assert!(!result.cached);
    assert_eq!(result.data.len(), 3);
    assert!(result.error.is_none());
    assert_eq!(stats.fetches(), 1);

    // 조회 실패 + 저장 실패
    assert_eq!(service.metrics().backend_errors, 2);
}

#[tokio::test]
async fn test_index_marker_shares_cache_entry() {
    let (service, stats) = build_service(Arc::new(MemoryCache::new()), MockProvider::new());

    let first = service
        .get_index_intraday("^GSPC", Interval::M1, DateRange::unbounded())
        .await;
    let second = service
        .get_index_intraday("gspc", Interval::M1, DateRange::unbounded())
        .await;

    assert_eq!(first.symbol, "GSPC");
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(stats.calls(), vec![("GSPC".to_string(), DataKind::Index)]);
}

#[tokio::test]
async fn test_stock_and_index_do_not_share_entries() {
    let (service, stats) = build_service(Arc::new(MemoryCache::new()), MockProvider::new());

    service
        .get_stock_intraday("SPX", Interval::M1, DateRange::unbounded())
        .await;
    let index = service
        .get_index_intraday("SPX", Interval::M1, DateRange::unbounded())
        .await;

    assert!(!index.cached);
    assert_eq!(stats.fetches(), 2);
}

#[tokio::test]
async fn test_date_range_is_part_of_cache_identity() {
    let (service, stats) = build_service(Arc::new(MemoryCache::new()), MockProvider::new());
    let range = DateRange::parse(Some("2024-01-02"), Some("2024-01-05")).unwrap();

    service
        .get_stock_intraday("AAPL", Interval::M1, DateRange::unbounded())
        .await;
    let ranged = service.get_stock_intraday("AAPL", Interval::M1, range).await;
    let ranged_again = service.get_stock_intraday("AAPL", Interval::M1, range).await;

    assert!(!ranged.cached);
    assert!(ranged_again.cached);
    assert_eq!(stats.fetches(), 2);
}
