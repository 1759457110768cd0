//! 캐시 갱신 오케스트레이션.

pub mod refresh;

pub use refresh::{is_refresh_due, CachedPriceHistory};
