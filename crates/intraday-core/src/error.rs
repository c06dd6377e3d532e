//! 공통 에러 타입.

use thiserror::Error;

/// 설정 및 입력 검증 에러.
///
/// 요청 처리 중이 아니라 시작 시점 또는 입력 파싱 단계에서 발생합니다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러 (시작 시 치명적)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// 공통 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
