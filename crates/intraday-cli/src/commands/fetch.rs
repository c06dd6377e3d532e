//! 분봉 조회 명령 (`get`, `batch`).

use anyhow::{bail, Result};
use intraday_core::{DataKind, DateRange, Interval};
use intraday_data::{BatchOutcome, FetchResult, IntradayCacheService};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// 백그라운드 갱신 완료 확인 간격.
const REFRESH_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 조회 공통 옵션.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub kind: DataKind,
    pub interval: Interval,
    pub range: DateRange,
    /// 프로세스 종료 전에 백그라운드 갱신을 기다릴 최대 시간
    pub refresh_wait: Duration,
}

impl FetchOptions {
    /// 문자열 인자를 파싱합니다.
    pub fn parse(
        kind: &str,
        interval: &str,
        from: Option<&str>,
        to: Option<&str>,
        refresh_wait_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            kind: kind.parse()?,
            interval: interval.parse()?,
            range: DateRange::parse(from, to)?,
            refresh_wait: Duration::from_secs(refresh_wait_secs),
        })
    }
}

/// 단일 심볼 조회.
pub async fn run_get(
    service: &IntradayCacheService,
    symbol: &str,
    options: &FetchOptions,
) -> Result<FetchResult> {
    if symbol.trim().is_empty() {
        bail!("symbol must not be empty");
    }

    let result = service
        .get_single(options.kind, symbol, options.interval, options.range)
        .await;

    info!(
        symbol = %result.symbol,
        cached = result.cached,
        points = result.data.len(),
        refresh = result.background_refresh_triggered,
        "조회 완료"
    );

    if result.background_refresh_triggered {
        wait_for_refresh(service, &[result.symbol.as_str()], options).await;
    }

    Ok(result)
}

/// 여러 심볼 배치 조회.
pub async fn run_batch(
    service: &IntradayCacheService,
    symbols: &[String],
    options: &FetchOptions,
) -> Result<BatchOutcome> {
    if symbols.is_empty() {
        bail!("at least one symbol is required");
    }

    let outcome = service
        .get_batch(options.kind, symbols, options.interval, options.range)
        .await?;

    if outcome.stats.background_refreshes > 0 {
        let cached: Vec<&str> = outcome.results.keys().map(String::as_str).collect();
        wait_for_refresh(service, &cached, options).await;
    }

    Ok(outcome)
}

/// 단발성 프로세스가 종료되며 갱신 작업이 끊기지 않도록 잠시 기다립니다.
async fn wait_for_refresh(service: &IntradayCacheService, symbols: &[&str], options: &FetchOptions) {
    let deadline = Instant::now() + options.refresh_wait;

    loop {
        let mut pending = 0;
        for symbol in symbols {
            if service
                .is_refreshing(options.kind, symbol, options.interval, &options.range)
                .await
            {
                pending += 1;
            }
        }

        if pending == 0 {
            return;
        }
        if Instant::now() >= deadline {
            warn!(pending, "Background refresh still running at exit");
            return;
        }
        sleep(REFRESH_POLL_INTERVAL).await;
    }
}
