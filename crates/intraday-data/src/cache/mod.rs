//! SWR 캐싱 레이어.
//!
//! - 캐시 키: 요청 파라미터 → canonical 키
//! - 신선도: 남은 TTL 기반 Fresh / Stale / Expired 판정
//! - 갱신 조정자: 키당 하나의 백그라운드 갱신
//! - 메트릭: 누적 히트/미스 카운터

pub mod freshness;
pub mod key;
pub mod metrics;
pub mod refresh;

pub use freshness::{Freshness, FreshnessPolicy, Lookup};
pub use key::{normalize_symbol, CacheKey, KEY_PREFIX};
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use refresh::{RefreshCoordinator, RefreshJob, RefreshOutcome};
