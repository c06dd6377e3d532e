//! FMP historical-chart 클라이언트.
//!
//! ```text
//! GET {base_url}/api/v3/historical-chart/{interval}/{symbol}?from=YYYY-MM-DD&to=YYYY-MM-DD&apikey=...
//! ```
//!
//! 응답은 최신순 배열이며, 이 모듈은 오래된 것부터 정렬해 반환합니다.
//! 인증 실패 등은 200 응답에 `{"Error Message": "..."}` 객체로 오기도 합니다.

use super::{IntradayProvider, IntradaySession};
use crate::error::{DataError, Result};
use async_trait::async_trait;
use intraday_core::{DataKind, DateRange, Interval, IntradayBar, ProviderConfig};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 에러 메시지에 포함할 응답 본문 최대 길이.
const MAX_ERROR_BODY: usize = 200;

/// FMP 데이터 제공자.
#[derive(Clone)]
pub struct FmpProvider {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl FmpProvider {
    /// 설정으로 제공자를 생성합니다. API 키가 없으면 설정 오류입니다.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DataError::ConfigError(
                "FMP API key is not configured (INTRADAY__PROVIDER__API_KEY or FMP_API_KEY)"
                    .to_string(),
            ));
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

impl IntradayProvider for FmpProvider {
    fn open_session(&self) -> Result<Box<dyn IntradaySession>> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| DataError::FetchError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Box::new(FmpSession {
            client,
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
        }))
    }
}

/// FMP 세션. drop 시 연결 풀이 함께 해제됩니다.
pub struct FmpSession {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[async_trait]
impl IntradaySession for FmpSession {
    async fn fetch(
        &self,
        symbol: &str,
        kind: DataKind,
        interval: Interval,
        range: &DateRange,
    ) -> Result<Vec<IntradayBar>> {
        let api_symbol = kind.api_symbol(symbol);
        let url = format!(
            "{}/api/v3/historical-chart/{}/{}",
            self.base_url,
            interval.as_str(),
            api_symbol
        );

        let mut query = vec![("apikey", self.api_key.clone())];
        if let Some(from) = range.from {
            query.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = range.to {
            query.push(("to", to.format("%Y-%m-%d").to_string()));
        }

        debug!(symbol = %api_symbol, interval = %interval, "FMP 분봉 조회");

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "FMP API {} returned {}: {}",
                api_symbol,
                status,
                truncate(&body)
            )));
        }

        let body: Value = response.json().await?;
        let bars = parse_bars(&api_symbol, body)?;

        debug!(symbol = %api_symbol, count = bars.len(), "FMP 분봉 수신");
        Ok(bars)
    }
}

/// 응답 본문을 분봉 벡터로 변환합니다 (오래된 것부터).
fn parse_bars(api_symbol: &str, body: Value) -> Result<Vec<IntradayBar>> {
    match body {
        Value::Array(_) => {
            let mut bars: Vec<IntradayBar> = serde_json::from_value(body).map_err(|e| {
                DataError::InvalidData(format!("FMP 응답 파싱 실패 ({}): {}", api_symbol, e))
            })?;
            bars.sort_by_key(|bar| bar.date);
            Ok(bars)
        }
        Value::Object(map) => match map.get("Error Message").and_then(Value::as_str) {
            Some(message) => Err(DataError::FetchError(format!(
                "FMP API {}: {}",
                api_symbol, message
            ))),
            None => Err(DataError::InvalidData(format!(
                "FMP 응답이 배열이 아님 ({})",
                api_symbol
            ))),
        },
        other => Err(DataError::InvalidData(format!(
            "FMP 응답이 배열이 아님 ({}): {}",
            api_symbol,
            truncate(&other.to_string())
        ))),
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
