//! SWR 신선도 판정.
//!
//! 신선도는 저장되지 않고, 남은 TTL과 두 임계값으로부터 매번 계산됩니다.
//!
//! ```text
//!  original_ttl                soft threshold                 0
//!  |----------- Fresh ---------|---------- Stale -------------| Expired
//!                              (original_ttl * soft_ttl_ratio)
//! ```

use intraday_core::{CacheConfig, IntradayBar};

/// 남은 TTL 기준 항목 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// 그대로 사용
    Fresh,
    /// 사용 가능하지만 백그라운드 갱신 필요
    Stale,
    /// 만료 또는 없음 (캐시 미스)
    Expired,
}

/// 하드 TTL과 소프트 TTL 비율.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessPolicy {
    pub original_ttl: u64,
    pub soft_ttl_ratio: f64,
}

impl FreshnessPolicy {
    pub fn new(original_ttl: u64, soft_ttl_ratio: f64) -> Self {
        Self {
            original_ttl,
            soft_ttl_ratio: soft_ttl_ratio.clamp(0.0, 1.0),
        }
    }

    /// 이 값 이하로 남으면 갱신이 필요합니다.
    pub fn soft_threshold_secs(&self) -> f64 {
        self.original_ttl as f64 * self.soft_ttl_ratio
    }

    /// 남은 TTL(초)로 상태를 판정합니다. `None` 또는 0 이하는 만료입니다.
    pub fn classify(&self, ttl_remaining: Option<i64>) -> Freshness {
        match ttl_remaining {
            Some(remaining) if remaining > 0 => {
                if remaining as f64 <= self.soft_threshold_secs() {
                    Freshness::Stale
                } else {
                    Freshness::Fresh
                }
            }
            _ => Freshness::Expired,
        }
    }
}

impl From<&CacheConfig> for FreshnessPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self::new(config.ttl_secs, config.soft_ttl_ratio)
    }
}

/// `get_with_freshness` 결과.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lookup {
    /// 캐시된 데이터 (미스이면 `None`)
    pub payload: Option<Vec<IntradayBar>>,
    /// 히트이면서 소프트 임계값을 넘은 경우 `true`
    pub needs_refresh: bool,
}

impl Lookup {
    pub fn miss() -> Self {
        Self::default()
    }

    pub fn hit(payload: Vec<IntradayBar>, freshness: Freshness) -> Self {
        Self {
            payload: Some(payload),
            needs_refresh: freshness == Freshness::Stale,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.payload.is_some()
    }
}
