//! 캐시 저장소.
//!
//! - `RedisCache`: 운영용 Redis 백엔드 (GET + TTL을 하나의 트랜잭션으로 조회)
//! - `MemoryCache`: 프로세스 내 백엔드 (테스트, 단일 노드 개발용)

pub mod memory;
pub mod redis;

use crate::cache::freshness::{Freshness, FreshnessPolicy, Lookup};
use crate::cache::key::CacheKey;
use crate::error::Result;
use async_trait::async_trait;
use intraday_core::IntradayBar;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

/// 키/값 캐시 백엔드.
///
/// 페이로드는 JSON 문자열로 저장되며 만료는 백엔드가 관리합니다.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 저장된 원본 문자열을 가져옵니다.
    async fn get_raw(&self, key: &CacheKey) -> Result<Option<String>>;

    /// 값을 무조건 덮어쓰고 `ttl_secs` 후 만료되도록 설정합니다.
    async fn set(&self, key: &CacheKey, bars: &[IntradayBar], ttl_secs: u64) -> Result<()>;

    /// 남은 TTL(초). 키가 없으면 `None`.
    async fn ttl_remaining(&self, key: &CacheKey) -> Result<Option<i64>>;

    /// 저장된 분봉 데이터를 가져옵니다.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<IntradayBar>>> {
        match self.get_raw(key).await? {
            Some(raw) => Ok(Some(decode_payload(&raw)?)),
            None => Ok(None),
        }
    }

    /// 값과 함께 SWR 갱신 필요 여부를 판정합니다.
    ///
    /// 미스이면 `(None, false)`. 원자적 조회가 가능한 백엔드는 재정의합니다.
    async fn get_with_freshness(&self, key: &CacheKey, policy: &FreshnessPolicy) -> Result<Lookup> {
        let freshness = policy.classify(self.ttl_remaining(key).await?);
        if freshness == Freshness::Expired {
            return Ok(Lookup::miss());
        }

        Ok(match self.get(key).await? {
            Some(payload) => Lookup::hit(payload, freshness),
            None => Lookup::miss(),
        })
    }
}

/// 페이로드를 JSON으로 인코딩합니다.
pub fn encode_payload(bars: &[IntradayBar]) -> Result<String> {
    Ok(serde_json::to_string(bars)?)
}

/// JSON 페이로드를 디코딩합니다.
pub fn decode_payload(raw: &str) -> Result<Vec<IntradayBar>> {
    Ok(serde_json::from_str(raw)?)
}
