//! 가격 데이터 관리 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - SQLite 저장소 (가격 봉, 갱신 마커)
//! - Yahoo Finance 시세 공급자
//! - 신선도 기반 캐시 갱신 (`CachedPriceHistory`)

pub mod cache;
pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use storage::database::Database;
pub use storage::price_bars::{CacheSummary, DateRange, PriceBarRecord, PriceBarRepository};

pub use cache::refresh::{is_refresh_due, CachedPriceHistory};

pub use provider::{PriceHistorySource, YahooHistorySource};
