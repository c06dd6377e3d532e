//! 분봉 캐시 서비스.
//!
//! # 동작 흐름
//!
//! ```text
//! 요청 (kind, symbol, interval, range)
//!         │
//!         ▼
//! ┌───────────────────┐
//! │ 1. 캐시 키 생성    │
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐
//! │ 2. 값 + 신선도 조회 │ ← 백엔드 오류는 미스로 취급
//! └─────────┬─────────┘
//!      ┌────┴──────────────┐
//!   히트 │                 │ 미스
//!      │                   ▼
//!      │        ┌─────────────────────┐
//!      │        │ 3. 업스트림 조회      │
//!      │        │    → 하드 TTL로 저장  │
//!      │        └──────────┬──────────┘
//!      ▼                   │
//! ┌──────────────────┐     │
//! │ stale이면 갱신 시작 │     │
//! │ (기다리지 않음)     │     │
//! └────────┬─────────┘     │
//!          ▼               ▼
//!       ┌──────────────────────┐
//!       │ 4. FetchResult 반환   │
//!       └──────────────────────┘
//! ```
//!
//! 서비스는 시작 시 한 번 만들어 `Arc`로 공유합니다. 갱신 Lock 맵과
//! 배치 동시성 제한(Semaphore)은 서비스 인스턴스에 속합니다.

mod batch;
mod single;

use crate::cache::{
    normalize_symbol, CacheKey, CacheMetrics, FreshnessPolicy, Lookup, MetricsSnapshot,
    RefreshCoordinator, RefreshJob, RefreshOutcome,
};
use crate::provider::IntradayProvider;
use crate::storage::CacheBackend;
use intraday_core::{CacheConfig, DataKind, DateRange, Interval, IntradayBar};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// 단일 조회 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    /// 정규화된 심볼
    pub symbol: String,
    pub interval: Interval,
    pub data: Vec<IntradayBar>,
    /// 캐시에서 응답했는지 여부
    pub cached: bool,
    /// 남은 TTL (초)
    pub ttl_remaining: Option<u64>,
    pub background_refresh_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 배치 통계.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total_requests: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub background_refreshes: usize,
}

/// 배치 조회 결과.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    /// 심볼 → 분봉 데이터
    pub results: HashMap<String, Vec<IntradayBar>>,
    /// 심볼 → 에러 메시지
    pub errors: HashMap<String, String>,
    pub stats: BatchStats,
}

/// SWR 분봉 캐시 서비스.
pub struct IntradayCacheService {
    backend: Arc<dyn CacheBackend>,
    provider: Arc<dyn IntradayProvider>,
    policy: FreshnessPolicy,
    max_batch_symbols: usize,
    /// 배치 업스트림 호출 동시성 제한
    fetch_gate: Arc<Semaphore>,
    refresher: RefreshCoordinator,
    metrics: Arc<CacheMetrics>,
}

impl IntradayCacheService {
    /// 새로운 서비스 생성.
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        provider: Arc<dyn IntradayProvider>,
        config: &CacheConfig,
    ) -> Self {
        let metrics = Arc::new(CacheMetrics::new());
        let refresher = RefreshCoordinator::new(
            Arc::clone(&backend),
            Arc::clone(&provider),
            config.ttl_secs,
            Arc::clone(&metrics),
        );

        Self {
            backend,
            provider,
            policy: FreshnessPolicy::from(config),
            max_batch_symbols: config.max_batch_symbols,
            fetch_gate: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            refresher,
            metrics,
        }
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    /// 누적 메트릭.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 해당 요청의 백그라운드 갱신이 진행 중인지 확인합니다.
    pub async fn is_refreshing(
        &self,
        kind: DataKind,
        symbol: &str,
        interval: Interval,
        range: &DateRange,
    ) -> bool {
        let key = CacheKey::build(kind, symbol, interval, range);
        self.refresher.is_refreshing(&key).await
    }

    fn hard_ttl(&self) -> u64 {
        self.policy.original_ttl
    }

    /// 캐시 조회. 백엔드 오류는 미스로 취급합니다.
    async fn probe(&self, key: &CacheKey) -> Lookup {
        match self.backend.get_with_freshness(key, &self.policy).await {
            Ok(lookup) => {
                if lookup.is_hit() {
                    self.metrics.record_hit(lookup.needs_refresh);
                } else {
                    self.metrics.record_miss();
                }
                lookup
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed, treating as miss");
                self.metrics.record_backend_error();
                self.metrics.record_miss();
                Lookup::miss()
            }
        }
    }

    /// 히트 응답에 쓸 남은 TTL. 0 이하이거나 조회 실패 시 `None`.
    async fn remaining_ttl(&self, key: &CacheKey) -> Option<u64> {
        match self.backend.ttl_remaining(key).await {
            Ok(Some(ttl)) if ttl > 0 => Some(ttl as u64),
            Ok(_) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "TTL lookup failed");
                self.metrics.record_backend_error();
                None
            }
        }
    }

    /// stale 히트에 대한 백그라운드 갱신을 요청합니다.
    async fn schedule_refresh(
        &self,
        key: &CacheKey,
        symbol: &str,
        kind: DataKind,
        interval: Interval,
        range: &DateRange,
    ) -> RefreshOutcome {
        self.refresher
            .trigger(RefreshJob {
                key: key.clone(),
                symbol: symbol.to_string(),
                kind,
                interval,
                range: *range,
            })
            .await
    }

    /// 저장 실패는 응답에 영향을 주지 않습니다.
    async fn store(&self, key: &CacheKey, bars: &[IntradayBar]) {
        if let Err(e) = self.backend.set(key, bars, self.hard_ttl()).await {
            warn!(key = %key, error = %e, "Cache write failed");
            self.metrics.record_backend_error();
        }
    }

    /// 기다리지 않는 캐시 저장.
    fn spawn_store(&self, key: CacheKey, bars: Vec<IntradayBar>) {
        let backend = Arc::clone(&self.backend);
        let metrics = Arc::clone(&self.metrics);
        let ttl = self.hard_ttl();

        tokio::spawn(async move {
            if let Err(e) = backend.set(&key, &bars, ttl).await {
                warn!(key = %key, error = %e, "Cache write failed");
                metrics.record_backend_error();
            }
        });
    }
}

/// 요청 심볼을 정규화하고 중복을 제거합니다 (첫 등장 순서 유지).
fn dedup_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    symbols
        .iter()
        .map(|s| normalize_symbol(s.as_ref()))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}
