//! 누적 캐시 메트릭.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 메트릭 스냅샷.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// 히트 중 갱신이 필요했던 횟수
    pub stale_hits: u64,
    pub refreshes_spawned: u64,
    /// 이미 진행 중이라 건너뛴 갱신
    pub refreshes_skipped: u64,
    pub refresh_failures: u64,
    pub fetch_errors: u64,
    pub backend_errors: u64,
    pub hit_rate: f64,
}

/// 서비스 수명 동안의 카운터.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    stale_hits: AtomicU64,
    refreshes_spawned: AtomicU64,
    refreshes_skipped: AtomicU64,
    refresh_failures: AtomicU64,
    fetch_errors: AtomicU64,
    backend_errors: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, stale: bool) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        if stale {
            self.stale_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_spawned(&self) {
        self.refreshes_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_skipped(&self) {
        self.refreshes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_failure(&self) {
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_error(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend_error(&self) {
        self.backend_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            hits,
            misses,
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
            refreshes_spawned: self.refreshes_spawned.load(Ordering::Relaxed),
            refreshes_skipped: self.refreshes_skipped.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
            backend_errors: self.backend_errors.load(Ordering::Relaxed),
            hit_rate,
        }
    }

    /// 모든 카운터를 0으로 되돌립니다.
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.stale_hits,
            &self.refreshes_spawned,
            &self.refreshes_skipped,
            &self.refresh_failures,
            &self.fetch_errors,
            &self.backend_errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
