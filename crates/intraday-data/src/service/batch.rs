//! 배치 조회.
//!
//! 1단계: 모든 심볼의 캐시를 동시에 조회 (업스트림 호출 없음)
//! 2단계: 미스만 하나의 세션을 공유하며 Semaphore로 동시 호출 수를 제한해 조회

use super::{dedup_symbols, BatchOutcome, BatchStats, IntradayCacheService};
use crate::cache::CacheKey;
use crate::error::{DataError, Result};
use futures::future::join_all;
use intraday_core::{DataKind, DateRange, Interval, IntradayBar};
use tracing::{error, info, instrument};

/// 1단계 결과.
enum Probe {
    Hit {
        symbol: String,
        data: Vec<IntradayBar>,
        refreshed: bool,
    },
    Miss {
        symbol: String,
        key: CacheKey,
    },
}

impl IntradayCacheService {
    /// 주식 배치 조회.
    pub async fn get_batch_stocks<S: AsRef<str>>(
        &self,
        symbols: &[S],
        interval: Interval,
        range: DateRange,
    ) -> Result<BatchOutcome> {
        self.get_batch(DataKind::Stock, symbols, interval, range).await
    }

    /// 지수 배치 조회.
    pub async fn get_batch_indexes<S: AsRef<str>>(
        &self,
        symbols: &[S],
        interval: Interval,
        range: DateRange,
    ) -> Result<BatchOutcome> {
        self.get_batch(DataKind::Index, symbols, interval, range).await
    }

    /// 여러 심볼을 2단계로 조회합니다.
    ///
    /// 심볼별 실패는 `errors`에 담기며, `Err`는 요청 심볼 수가
    /// `max_batch_symbols`를 넘는 경우에만 반환됩니다.
    /// 심볼은 정규화 후 중복 제거되며 결과 맵의 키도 정규화된 심볼입니다.
    #[instrument(skip(self, symbols), fields(kind = %kind, interval = %interval, requested = symbols.len()))]
    pub async fn get_batch<S: AsRef<str>>(
        &self,
        kind: DataKind,
        symbols: &[S],
        interval: Interval,
        range: DateRange,
    ) -> Result<BatchOutcome> {
        if symbols.len() > self.max_batch_symbols {
            return Err(DataError::BatchTooLarge {
                requested: symbols.len(),
                max: self.max_batch_symbols,
            });
        }

        let targets = dedup_symbols(symbols);
        let mut outcome = BatchOutcome {
            stats: BatchStats {
                total_requests: targets.len(),
                ..Default::default()
            },
            ..Default::default()
        };

        // 1단계: 캐시 조회
        let probes = join_all(targets.into_iter().map(|symbol| async move {
            let key = CacheKey::build(kind, &symbol, interval, &range);
            let lookup = self.probe(&key).await;

            match lookup.payload {
                Some(data) => {
                    if lookup.needs_refresh {
                        self.schedule_refresh(&key, &symbol, kind, interval, &range)
                            .await;
                    }
                    Probe::Hit {
                        symbol,
                        data,
                        refreshed: lookup.needs_refresh,
                    }
                }
                None => Probe::Miss { symbol, key },
            }
        }))
        .await;

        let mut pending = Vec::new();
        for probe in probes {
            match probe {
                Probe::Hit {
                    symbol,
                    data,
                    refreshed,
                } => {
                    outcome.stats.cache_hits += 1;
                    if refreshed {
                        outcome.stats.background_refreshes += 1;
                    }
                    outcome.results.insert(symbol, data);
                }
                Probe::Miss { symbol, key } => pending.push((symbol, key)),
            }
        }
        outcome.stats.cache_misses = pending.len();

        // 2단계: 미스만 업스트림 조회
        if !pending.is_empty() {
            self.fetch_misses(kind, interval, &range, pending, &mut outcome)
                .await;
        }

        info!(
            total = outcome.stats.total_requests,
            hits = outcome.stats.cache_hits,
            misses = outcome.stats.cache_misses,
            refreshes = outcome.stats.background_refreshes,
            errors = outcome.errors.len(),
            "Batch intraday fetch completed"
        );

        Ok(outcome)
    }

    /// 하나의 세션을 공유하며 동시성 제한 하에 미스를 조회합니다.
    async fn fetch_misses(
        &self,
        kind: DataKind,
        interval: Interval,
        range: &DateRange,
        pending: Vec<(String, CacheKey)>,
        outcome: &mut BatchOutcome,
    ) {
        let session = match self.provider.open_session() {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Failed to open provider session for batch");
                let message = e.to_string();
                for (symbol, _) in pending {
                    self.metrics.record_fetch_error();
                    outcome.errors.insert(symbol, message.clone());
                }
                return;
            }
        };
        let session = session.as_ref();

        let fetched = join_all(pending.into_iter().map(|(symbol, key)| async move {
            let _permit = match self.fetch_gate.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    return (
                        symbol,
                        Err(DataError::FetchError("fetch gate closed".to_string())),
                    )
                }
            };

            let result = session.fetch(&symbol, kind, interval, range).await;
            if let Ok(data) = &result {
                // 배치 완료는 캐시 저장을 기다리지 않음
                self.spawn_store(key, data.clone());
            }
            (symbol, result)
        }))
        .await;

        for (symbol, result) in fetched {
            match result {
                Ok(data) => {
                    outcome.results.insert(symbol, data);
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Failed to fetch intraday data");
                    self.metrics.record_fetch_error();
                    outcome.errors.insert(symbol, e.to_string());
                }
            }
        }
    }
}
