//! 분봉 시세 도메인 타입.

pub mod bar;
pub mod request;

pub use bar::IntradayBar;
pub use request::{DataKind, DateRange, Interval};
