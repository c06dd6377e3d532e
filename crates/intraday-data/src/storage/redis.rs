//! Redis 캐시 백엔드.

use super::{decode_payload, encode_payload, CacheBackend};
use crate::cache::freshness::{Freshness, FreshnessPolicy, Lookup};
use crate::cache::key::CacheKey;
use crate::error::{DataError, Result};
use ::redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use async_trait::async_trait;
use intraday_core::{IntradayBar, RedisConfig};
use tracing::{debug, info, instrument};

/// `TTL` 명령이 키 없음에 대해 돌려주는 값.
const TTL_KEY_MISSING: i64 = -2;

/// Redis 연결 래퍼.
///
/// `MultiplexedConnection`은 복제해도 같은 연결을 공유하므로
/// 호출마다 복제해서 사용하고 별도의 잠금은 두지 않습니다.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    /// 새로운 Redis 연결을 생성합니다.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        info!("Connecting to Redis...");

        let client = Client::open(config.url.as_str())
            .map_err(|e| DataError::ConfigError(format!("invalid redis url: {}", e)))?;
        let connection = client.get_multiplexed_async_connection().await?;

        info!("Redis connection established");

        Ok(Self { connection })
    }

    /// Redis 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection.clone();
        let reply: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(reply == "PONG")
    }

    /// 키를 삭제합니다.
    pub async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let mut conn = self.connection.clone();
        let deleted: i64 = conn.del(key.as_str()).await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get_raw(&self, key: &CacheKey) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key.as_str()).await?;
        Ok(value)
    }

    #[instrument(skip_all, fields(key = %key, points = bars.len()))]
    async fn set(&self, key: &CacheKey, bars: &[IntradayBar], ttl_secs: u64) -> Result<()> {
        let json = encode_payload(bars)?;
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(key.as_str(), json, ttl_secs).await?;
        Ok(())
    }

    async fn ttl_remaining(&self, key: &CacheKey) -> Result<Option<i64>> {
        let mut conn = self.connection.clone();
        let ttl: i64 = conn.ttl(key.as_str()).await?;
        Ok((ttl != TTL_KEY_MISSING).then_some(ttl))
    }

    /// GET과 TTL을 `MULTI`/`EXEC`로 묶어 값과 만료 시간이 같은 시점을 보도록 합니다.
    async fn get_with_freshness(&self, key: &CacheKey, policy: &FreshnessPolicy) -> Result<Lookup> {
        let mut conn = self.connection.clone();
        let (raw, ttl): (Option<String>, i64) = ::redis::pipe()
            .atomic()
            .get(key.as_str())
            .ttl(key.as_str())
            .query_async(&mut conn)
            .await?;

        let remaining = (ttl != TTL_KEY_MISSING).then_some(ttl);
        let freshness = policy.classify(remaining);

        match raw {
            Some(raw) if freshness != Freshness::Expired => {
                debug!(key = %key, ttl = ttl, ?freshness, "Redis cache hit");
                Ok(Lookup::hit(decode_payload(&raw)?, freshness))
            }
            _ => Ok(Lookup::miss()),
        }
    }
}
