//! # Intraday Core
//!
//! 분봉(intraday) 시세 캐시 시스템의 공통 타입을 제공합니다.
//!
//! - 분봉 데이터 포인트 및 요청 타입 (`IntradayBar`, `DataKind`, `Interval`, `DateRange`)
//! - 설정 관리
//! - 로깅 인프라
//! - 공통 에러 타입

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_from_env, LogConfig, LogFormat};
pub use types::*;
