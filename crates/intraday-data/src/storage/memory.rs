//! 프로세스 내 캐시 백엔드.
//!
//! Redis와 같은 의미(JSON 저장, 절대 만료, 초 단위 TTL 반올림)를 따르며
//! `tokio::time::Instant`를 사용하므로 테스트에서 시간을 멈추고 진행시킬 수 있습니다.

use super::{encode_payload, CacheBackend};
use crate::cache::key::CacheKey;
use crate::error::Result;
use async_trait::async_trait;
use intraday_core::IntradayBar;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct MemoryEntry {
    raw: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn remaining(&self, now: Instant) -> Option<Duration> {
        let left = self.expires_at.saturating_duration_since(now);
        (!left.is_zero()).then_some(left)
    }
}

/// 메모리 캐시.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 원본 문자열을 그대로 저장합니다.
    pub async fn set_raw(&self, key: &CacheKey, raw: impl Into<String>, ttl_secs: u64) {
        let entry = MemoryEntry {
            raw: raw.into(),
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }

    /// 만료되지 않은 항목 수.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.remaining(now).is_some())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 만료된 항목을 제거하고 제거한 개수를 반환합니다.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.remaining(now).is_some());
        before - entries.len()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get_raw(&self, key: &CacheKey) -> Result<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key.as_str())
            .filter(|e| e.remaining(now).is_some())
            .map(|e| e.raw.clone()))
    }

    async fn set(&self, key: &CacheKey, bars: &[IntradayBar], ttl_secs: u64) -> Result<()> {
        let raw = encode_payload(bars)?;
        self.set_raw(key, raw, ttl_secs).await;
        Ok(())
    }

    async fn ttl_remaining(&self, key: &CacheKey) -> Result<Option<i64>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key.as_str())
            .and_then(|e| e.remaining(now))
            // Redis와 동일하게 가장 가까운 초로 반올림
            .map(|left| ((left.as_millis() + 500) / 1000) as i64))
    }
}
