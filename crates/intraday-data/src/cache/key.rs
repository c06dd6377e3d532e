//! 분봉 캐시 키 생성.
//!
//! ```text
//! fmp:intraday:stock:symbol=AAPL:interval=1min
//! fmp:intraday:index:symbol=GSPC:interval=5min:from=2024-01-02:to=2024-01-05
//! ```
//!
//! 대소문자와 지수 접두사(`^`)는 키에 영향을 주지 않습니다.

use intraday_core::{DataKind, DateRange, Interval};
use std::fmt;

/// 캐시 키 접두사.
pub const KEY_PREFIX: &str = "fmp:intraday";

/// 정규화된 캐시 키.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// 요청 파라미터로 캐시 키를 생성합니다.
    ///
    /// 날짜 범위의 각 끝은 값이 있을 때만 키에 붙으므로
    /// 범위 없는 요청과 범위 있는 요청은 서로 다른 키를 가집니다.
    pub fn build(kind: DataKind, symbol: &str, interval: Interval, range: &DateRange) -> Self {
        let mut key = format!(
            "{}:{}:symbol={}:interval={}",
            KEY_PREFIX,
            kind.as_str(),
            normalize_symbol(symbol),
            interval.as_str()
        );

        if let Some(from) = range.from {
            key.push_str(&format!(":from={}", from.format("%Y-%m-%d")));
        }
        if let Some(to) = range.to {
            key.push_str(&format!(":to={}", to.format("%Y-%m-%d")));
        }

        CacheKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 심볼을 canonical 형식으로 변환합니다 (앞쪽 `^` 제거, 대문자).
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().trim_start_matches('^').to_uppercase()
}
