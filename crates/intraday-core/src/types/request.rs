//! 분봉 요청 파라미터 타입.

use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 데이터 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// 개별 주식
    Stock,
    /// 지수 (제공자 API에서는 `^` 접두사 사용)
    Index,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Stock => "stock",
            DataKind::Index => "index",
        }
    }

    /// 정규화된 심볼을 제공자 API 호출용 심볼로 변환합니다.
    ///
    /// 지수는 `^GSPC`처럼 접두사를 붙이고, 주식은 그대로 사용합니다.
    pub fn api_symbol(&self, normalized: &str) -> String {
        match self {
            DataKind::Index if !normalized.starts_with('^') => format!("^{}", normalized),
            _ => normalized.to_string(),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stock" => Ok(DataKind::Stock),
            "index" => Ok(DataKind::Index),
            _ => Err(CoreError::InvalidInput(format!(
                "Unknown data kind: {} (supported: stock, index)",
                s
            ))),
        }
    }
}

/// 분봉 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1min")]
    M1,
    #[serde(rename = "5min")]
    M5,
    #[serde(rename = "15min")]
    M15,
    #[serde(rename = "30min")]
    M30,
    #[serde(rename = "1hour")]
    H1,
    #[serde(rename = "4hour")]
    H4,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::M1,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H4,
    ];

    /// 제공자 API 및 캐시 키에서 사용하는 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1min",
            Interval::M5 => "5min",
            Interval::M15 => "15min",
            Interval::M30 => "30min",
            Interval::H1 => "1hour",
            Interval::H4 => "4hour",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Interval::ALL
            .iter()
            .copied()
            .find(|iv| iv.as_str() == lowered)
            .ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "Unknown interval: {} (supported: 1min, 5min, 15min, 30min, 1hour, 4hour)",
                    s
                ))
            })
    }
}

/// 조회 날짜 범위 (양 끝 모두 선택).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// 범위를 생성합니다. 시작일이 종료일보다 늦으면 에러입니다.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, CoreError> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(CoreError::InvalidInput(format!(
                    "from ({}) must not be after to ({})",
                    f, t
                )));
            }
        }
        Ok(Self { from, to })
    }

    /// 범위 제한 없음.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `YYYY-MM-DD` 문자열로부터 범위를 생성합니다.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, CoreError> {
        Self::new(from.map(parse_date).transpose()?, to.map(parse_date).transpose()?)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| CoreError::InvalidInput(format!("Invalid date '{}': {}", raw, e)))
}
