//! 시스템 상태 확인.

use super::redact_url;
use intraday_core::AppConfig;
use intraday_data::{FmpProvider, IntradayProvider, RedisCache};
use serde::Serialize;
use tracing::{info, warn};

/// 구성 요소별 상태.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub name: &'static str,
    pub healthy: bool,
    pub detail: String,
}

/// 상태 확인 결과.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub components: Vec<ComponentStatus>,
}

/// Redis 연결과 제공자 설정을 확인합니다. 업스트림 API는 호출하지 않습니다.
pub async fn check_health(config: &AppConfig) -> HealthReport {
    info!("Checking system health...");

    let components = vec![check_redis(config).await, check_provider(config)];
    let healthy = components.iter().all(|c| c.healthy);

    HealthReport {
        healthy,
        components,
    }
}

async fn check_redis(config: &AppConfig) -> ComponentStatus {
    let url = redact_url(&config.redis.url);

    let result = match RedisCache::connect(&config.redis).await {
        Ok(cache) => cache.health_check().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => ComponentStatus {
            name: "redis",
            healthy: true,
            detail: url,
        },
        Ok(false) => ComponentStatus {
            name: "redis",
            healthy: false,
            detail: format!("{}: unexpected PING reply", url),
        },
        Err(e) => {
            warn!(error = %e, "Redis health check failed");
            ComponentStatus {
                name: "redis",
                healthy: false,
                detail: format!("{}: {}", url, e),
            }
        }
    }
}

fn check_provider(config: &AppConfig) -> ComponentStatus {
    let result = FmpProvider::new(&config.provider).and_then(|p| p.open_session().map(drop));

    match result {
        Ok(()) => ComponentStatus {
            name: "provider",
            healthy: true,
            detail: config.provider.base_url.clone(),
        },
        Err(e) => ComponentStatus {
            name: "provider",
            healthy: false,
            detail: e.to_string(),
        },
    }
}
