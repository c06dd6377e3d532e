//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 캐시/데이터 제공자 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 캐시 백엔드 오류 (연결 실패, 명령 실패)
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 배치 크기 초과
    #[error("Batch too large: {requested} symbols (max {max})")]
    BatchTooLarge { requested: usize, max: usize },
}

impl DataError {
    /// 캐시 저장소 쪽 오류인지 확인합니다.
    ///
    /// 이 오류들은 요청 경로에서 캐시 미스로 취급됩니다.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            DataError::CacheError(_) | DataError::SerializationError(_)
        )
    }
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        DataError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::InvalidData(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<intraday_core::CoreError> for DataError {
    fn from(err: intraday_core::CoreError) -> Self {
        DataError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
