//! 백그라운드 갱신 조정자.
//!
//! 키마다 하나의 `Mutex`를 지연 생성하고, 갱신 요청 시 **기다리지 않고**
//! `try_lock`으로 획득을 시도합니다. 이미 잡혀 있으면 그 요청은 버립니다.
//! 획득한 guard는 spawn된 작업으로 옮겨지므로 요청한 쪽은 아무것도 붙잡지 않습니다.

use crate::cache::key::CacheKey;
use crate::cache::metrics::CacheMetrics;
use crate::error::Result;
use crate::provider::IntradayProvider;
use crate::storage::CacheBackend;
use intraday_core::{DataKind, DateRange, Interval};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// 키별 갱신 Lock 맵.
type RefreshLockMap = RwLock<HashMap<CacheKey, Arc<Mutex<()>>>>;

/// 갱신 대상.
#[derive(Debug, Clone)]
pub struct RefreshJob {
    pub key: CacheKey,
    /// 정규화된 심볼
    pub symbol: String,
    pub kind: DataKind,
    pub interval: Interval,
    pub range: DateRange,
}

/// 갱신 요청 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// 새 갱신 작업이 시작됨
    Spawned,
    /// 같은 키의 갱신이 이미 진행 중이라 건너뜀
    AlreadyRunning,
}

/// 키당 최대 하나의 백그라운드 갱신을 보장합니다.
pub struct RefreshCoordinator {
    backend: Arc<dyn CacheBackend>,
    provider: Arc<dyn IntradayProvider>,
    ttl_secs: u64,
    locks: RefreshLockMap,
    metrics: Arc<CacheMetrics>,
}

impl RefreshCoordinator {
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        provider: Arc<dyn IntradayProvider>,
        ttl_secs: u64,
        metrics: Arc<CacheMetrics>,
    ) -> Self {
        Self {
            backend,
            provider,
            ttl_secs,
            locks: RwLock::new(HashMap::new()),
            metrics,
        }
    }

    /// 갱신을 시작합니다. 작업 완료를 기다리지 않습니다.
    pub async fn trigger(&self, job: RefreshJob) -> RefreshOutcome {
        let lock = self.get_or_create_lock(&job.key).await;

        let guard = match lock.try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(key = %job.key, "Background refresh already in progress");
                self.metrics.record_refresh_skipped();
                return RefreshOutcome::AlreadyRunning;
            }
        };

        let backend = Arc::clone(&self.backend);
        let provider = Arc::clone(&self.provider);
        let metrics = Arc::clone(&self.metrics);
        let ttl_secs = self.ttl_secs;

        self.metrics.record_refresh_spawned();

        tokio::spawn(async move {
            let _guard = guard;
            debug!(key = %job.key, "Starting background refresh");

            match refresh_once(&job, backend.as_ref(), provider.as_ref(), ttl_secs).await {
                Ok(points) => {
                    debug!(key = %job.key, points, "Background refresh completed");
                }
                Err(e) => {
                    // 오래된 값은 하드 TTL까지 유효하므로 로그만 남김
                    warn!(key = %job.key, error = %e, "Background refresh failed");
                    metrics.record_refresh_failure();
                }
            }
        });

        RefreshOutcome::Spawned
    }

    /// 해당 키의 갱신이 진행 중인지 확인합니다.
    pub async fn is_refreshing(&self, key: &CacheKey) -> bool {
        let locks = self.locks.read().await;
        match locks.get(key) {
            Some(lock) => lock.try_lock().is_err(),
            None => false,
        }
    }

    /// 지금까지 Lock이 만들어진 키 수.
    pub async fn tracked_keys(&self) -> usize {
        self.locks.read().await.len()
    }

    async fn get_or_create_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(key) {
                return Arc::clone(lock);
            }
        }

        let mut locks = self.locks.write().await;
        Arc::clone(
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

/// 조회 후 하드 TTL로 저장합니다. 세션은 저장 전에 닫습니다.
async fn refresh_once(
    job: &RefreshJob,
    backend: &dyn CacheBackend,
    provider: &dyn IntradayProvider,
    ttl_secs: u64,
) -> Result<usize> {
    let session = provider.open_session()?;
    let bars = session
        .fetch(&job.symbol, job.kind, job.interval, &job.range)
        .await?;
    drop(session);

    backend.set(&job.key, &bars, ttl_secs).await?;
    Ok(bars.len())
}
