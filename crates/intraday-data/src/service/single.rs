//! 단일 심볼 조회.

use super::{FetchResult, IntradayCacheService};
use crate::cache::{normalize_symbol, CacheKey, RefreshOutcome};
use crate::error::Result;
use intraday_core::{DataKind, DateRange, Interval, IntradayBar};
use tracing::{debug, error, instrument};

impl IntradayCacheService {
    /// 주식 분봉 조회.
    pub async fn get_stock_intraday(
        &self,
        symbol: &str,
        interval: Interval,
        range: DateRange,
    ) -> FetchResult {
        self.get_single(DataKind::Stock, symbol, interval, range).await
    }

    /// 지수 분봉 조회 (`^` 접두사 유무 무관).
    pub async fn get_index_intraday(
        &self,
        symbol: &str,
        interval: Interval,
        range: DateRange,
    ) -> FetchResult {
        self.get_single(DataKind::Index, symbol, interval, range).await
    }

    /// SWR 방식으로 분봉 데이터를 조회합니다.
    ///
    /// 결과는 신선한 히트, 갱신을 시작한 stale 히트, 조회 후 저장한 미스,
    /// 에러를 담은 미스 중 하나이며 에러는 반환값 안에 담깁니다.
    /// 한 번의 호출은 최대 한 번의 업스트림 조회만 수행합니다.
    #[instrument(skip(self), fields(kind = %kind, interval = %interval))]
    pub async fn get_single(
        &self,
        kind: DataKind,
        symbol: &str,
        interval: Interval,
        range: DateRange,
    ) -> FetchResult {
        let key = CacheKey::build(kind, symbol, interval, &range);
        let normalized = normalize_symbol(symbol);

        let lookup = self.probe(&key).await;

        if let Some(data) = lookup.payload {
            let ttl_remaining = self.remaining_ttl(&key).await;

            // 같은 키의 갱신이 이미 진행 중이어도 트리거된 것으로 보고합니다
            if lookup.needs_refresh {
                let outcome = self
                    .schedule_refresh(&key, &normalized, kind, interval, &range)
                    .await;
                if outcome == RefreshOutcome::AlreadyRunning {
                    debug!(key = %key, "Stale cache hit, refresh already running");
                }
            }

            return FetchResult {
                symbol: normalized,
                interval,
                data,
                cached: true,
                ttl_remaining,
                background_refresh_triggered: lookup.needs_refresh,
                error: None,
            };
        }

        match self.fetch_once(&normalized, kind, interval, &range).await {
            Ok(data) => {
                self.store(&key, &data).await;
                debug!(key = %key, points = data.len(), "Cache miss filled from upstream");

                FetchResult {
                    symbol: normalized,
                    interval,
                    data,
                    cached: false,
                    ttl_remaining: Some(self.hard_ttl()),
                    background_refresh_triggered: false,
                    error: None,
                }
            }
            Err(e) => {
                error!(symbol = %normalized, error = %e, "Failed to fetch intraday data");
                self.metrics.record_fetch_error();

                FetchResult {
                    symbol: normalized,
                    interval,
                    data: Vec::new(),
                    cached: false,
                    ttl_remaining: None,
                    background_refresh_triggered: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// 세션을 열어 한 번 조회하고 닫습니다.
    async fn fetch_once(
        &self,
        symbol: &str,
        kind: DataKind,
        interval: Interval,
        range: &DateRange,
    ) -> Result<Vec<IntradayBar>> {
        let session = self.provider.open_session()?;
        let data = session.fetch(symbol, kind, interval, range).await?;
        Ok(data)
    }
}
