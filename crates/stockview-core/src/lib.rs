//! # Stockview Core
//!
//! 주가 차트 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLCV 가격 봉 (`PriceBar`)
//! - 봉 간격 및 조회 기간 정의
//! - 심볼 정규화
//! - 차트 Figure 구성
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
