//! 분봉 데이터 포인트.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 분봉 한 개.
///
/// 데이터 제공자의 응답 형식(`"2024-01-05 15:59:00"`)을 그대로 직렬화하므로
/// 캐시에 저장된 값과 제공자 응답을 같은 타입으로 다룰 수 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradayBar {
    /// 봉 시작 시각 (거래소 현지 시간)
    #[serde(with = "provider_datetime")]
    pub date: NaiveDateTime,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: Decimal,
}

/// 제공자 시각 형식 (`YYYY-MM-DD HH:MM:SS`, 날짜만 있는 경우 자정).
mod provider_datetime {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;

        if let Ok(parsed) = NaiveDateTime::parse_from_str(&raw, FORMAT) {
            return Ok(parsed);
        }

        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| de::Error::custom(format!("invalid bar timestamp: {}", raw)))
    }
}
