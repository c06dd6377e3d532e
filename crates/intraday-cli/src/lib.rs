//! 분봉 캐시 CLI 도구.
//!
//! - 단일/배치 조회 명령
//! - 상태 점검 도구

pub mod commands;
