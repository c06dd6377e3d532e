//! 통합 테스트 공용 헬퍼.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use intraday_core::{CacheConfig, DataKind, DateRange, Interval, IntradayBar};
use intraday_data::{
    CacheBackend, CacheKey, DataError, IntradayCacheService, IntradayProvider, IntradaySession,
    Result,
};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// 테스트 데이터
// ============================================================================

/// 테스트용 분봉 생성 (09:30부터 1분 간격).
pub fn sample_bars(count: u32) -> Vec<IntradayBar> {
    (0..count)
        .map(|i| IntradayBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 5)
                .and_then(|d| d.and_hms_opt(9, 30 + i, 0))
                .unwrap(),
            open: dec!(100.0),
            high: dec!(101.5),
            low: dec!(99.5),
            close: dec!(101.0),
            volume: dec!(12000),
        })
        .collect()
}

pub fn stock_key(symbol: &str) -> CacheKey {
    CacheKey::build(DataKind::Stock, symbol, Interval::M1, &DateRange::unbounded())
}

// ============================================================================
// Mock 제공자
// ============================================================================

/// 호출 기록.
#[derive(Debug, Default)]
pub struct ProviderStats {
    pub opens: AtomicUsize,
    pub fetches: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: Mutex<Vec<(String, DataKind)>>,
}

impl ProviderStats {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(String, DataKind)> {
        self.calls.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct Behavior {
    bars: Vec<IntradayBar>,
    failing: HashSet<String>,
    delay: Duration,
}

/// 설정 가능한 Mock 제공자.
pub struct MockProvider {
    stats: Arc<ProviderStats>,
    behavior: Behavior,
    fail_open: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(ProviderStats::default()),
            behavior: Behavior {
                bars: sample_bars(3),
                failing: HashSet::new(),
                delay: Duration::ZERO,
            },
            fail_open: false,
        }
    }

    pub fn with_bars(mut self, bars: Vec<IntradayBar>) -> Self {
        self.behavior.bars = bars;
        self
    }

    /// 해당 심볼 조회는 실패합니다.
    pub fn failing(mut self, symbol: &str) -> Self {
        self.behavior.failing.insert(symbol.to_string());
        self
    }

    /// 조회마다 지연을 줍니다.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = delay;
        self
    }

    /// 세션 열기가 실패합니다.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn stats(&self) -> Arc<ProviderStats> {
        Arc::clone(&self.stats)
    }
}

impl IntradayProvider for MockProvider {
    fn open_session(&self) -> Result<Box<dyn IntradaySession>> {
        if self.fail_open {
            return Err(DataError::FetchError("upstream unavailable".to_string()));
        }

        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            stats: Arc::clone(&self.stats),
            behavior: self.behavior.clone(),
        }))
    }
}

struct MockSession {
    stats: Arc<ProviderStats>,
    behavior: Behavior,
}

#[async_trait]
impl IntradaySession for MockSession {
    async fn fetch(
        &self,
        symbol: &str,
        kind: DataKind,
        _interval: Interval,
        _range: &DateRange,
    ) -> Result<Vec<IntradayBar>> {
        self.stats.fetches.fetch_add(1, Ordering::SeqCst);
        self.stats
            .calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), kind));

        let now = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.behavior.delay.is_zero() {
            tokio::time::sleep(self.behavior.delay).await;
        }

        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.behavior.failing.contains(symbol) {
            return Err(DataError::FetchError(format!("no data for {}", symbol)));
        }
        Ok(self.behavior.bars.clone())
    }
}

// ============================================================================
// 장애 백엔드
// ============================================================================

/// 모든 명령이 실패하는 캐시 백엔드.
pub struct UnreachableBackend;

#[async_trait]
impl CacheBackend for UnreachableBackend {
    async fn get_raw(&self, _key: &CacheKey) -> Result<Option<String>> {
        Err(DataError::CacheError("connection refused".to_string()))
    }

    async fn set(&self, _key: &CacheKey, _bars: &[IntradayBar], _ttl_secs: u64) -> Result<()> {
        Err(DataError::CacheError("connection refused".to_string()))
    }

    async fn ttl_remaining(&self, _key: &CacheKey) -> Result<Option<i64>> {
        Err(DataError::CacheError("connection refused".to_string()))
    }
}

// ============================================================================
// 서비스 생성
// ============================================================================

pub fn build_service(
    backend: Arc<dyn CacheBackend>,
    provider: MockProvider,
) -> (IntradayCacheService, Arc<ProviderStats>) {
    build_service_with(backend, provider, CacheConfig::default())
}

pub fn build_service_with(
    backend: Arc<dyn CacheBackend>,
    provider: MockProvider,
    config: CacheConfig,
) -> (IntradayCacheService, Arc<ProviderStats>) {
    let stats = provider.stats();
    let service = IntradayCacheService::new(backend, Arc::new(provider), &config);
    (service, stats)
}
