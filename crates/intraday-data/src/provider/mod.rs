//! 분봉 데이터 Provider 모듈.
//!
//! ## FMP (Financial Modeling Prep)
//! - `FmpProvider`: historical-chart API 기반 분봉 조회
//!
//! Provider는 요청(또는 배치 한 단계)마다 세션을 열고, 세션이 drop될 때
//! 연결 풀 등 네트워크 자원이 해제됩니다.

pub mod fmp;

use crate::error::Result;
use async_trait::async_trait;
use intraday_core::{DataKind, DateRange, Interval, IntradayBar};

pub use fmp::{FmpProvider, FmpSession};

/// 업스트림 데이터 제공자.
pub trait IntradayProvider: Send + Sync {
    /// 새 세션을 엽니다. 세션 수명 동안만 네트워크 자원을 보유합니다.
    fn open_session(&self) -> Result<Box<dyn IntradaySession>>;
}

/// 열린 제공자 세션.
#[async_trait]
pub trait IntradaySession: Send + Sync {
    /// 분봉 데이터를 조회합니다.
    ///
    /// `symbol`은 정규화된 심볼(`GSPC`, `AAPL`)이며 제공자별 접두사는 세션이 붙입니다.
    /// 데이터가 없으면 빈 벡터를 반환하며, 이는 에러가 아닙니다.
    async fn fetch(
        &self,
        symbol: &str,
        kind: DataKind,
        interval: Interval,
        range: &DateRange,
    ) -> Result<Vec<IntradayBar>>;
}
