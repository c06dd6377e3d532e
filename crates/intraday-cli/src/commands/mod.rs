//! CLI 명령어 구현 모듈.

pub mod fetch;
pub mod health;

use anyhow::{Context, Result};
use intraday_core::AppConfig;
use intraday_data::{FmpProvider, IntradayCacheService, RedisCache};
use std::sync::Arc;

/// 설정으로 Redis 백엔드와 FMP 제공자를 연결한 서비스를 만듭니다.
pub async fn build_service(config: &AppConfig) -> Result<IntradayCacheService> {
    let backend = RedisCache::connect(&config.redis)
        .await
        .with_context(|| format!("Redis 연결 실패: {}", redact_url(&config.redis.url)))?;
    let provider = FmpProvider::new(&config.provider).context("FMP 제공자 생성 실패")?;

    Ok(IntradayCacheService::new(
        Arc::new(backend),
        Arc::new(provider),
        &config.cache,
    ))
}

/// URL의 비밀번호 부분을 가립니다.
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.find(':') {
                Some(colon) => format!(
                    "{}{}:***{}",
                    &url[..scheme_end + 3],
                    &credentials[..colon],
                    &url[at..]
                ),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

/// 쉼표로 구분된 심볼 목록을 나눕니다.
pub fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
