//! # Intraday Data
//!
//! 분봉 시세를 위한 stale-while-revalidate 캐시.
//!
//! - `cache`: 캐시 키, 신선도 판정, 백그라운드 갱신 조정, 메트릭
//! - `storage`: 캐시 백엔드 (Redis, 메모리)
//! - `provider`: 업스트림 데이터 제공자 (FMP)
//! - `service`: 단일/배치 조회 서비스

pub mod cache;
pub mod error;
pub mod provider;
pub mod service;
pub mod storage;

pub use cache::{CacheKey, Freshness, FreshnessPolicy, MetricsSnapshot, RefreshOutcome};
pub use error::{DataError, Result};
pub use provider::{FmpProvider, IntradayProvider, IntradaySession};
pub use service::{BatchOutcome, BatchStats, FetchResult, IntradayCacheService};
pub use storage::{CacheBackend, MemoryCache, RedisCache};
