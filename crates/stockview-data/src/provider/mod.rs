//! 외부 가격 이력 데이터 제공자.
//!
//! 캐시 오케스트레이터는 `PriceHistorySource` 트레이트에만 의존하므로
//! 테스트에서는 스크립트된 가짜 구현으로 교체할 수 있습니다.

pub mod yahoo;

use async_trait::async_trait;
use stockview_core::{BarInterval, HistoryPeriod, PriceBar};

use crate::error::Result;

pub use yahoo::YahooHistorySource;

/// 가격 이력 제공자 트레이트.
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 정규화된 심볼의 가격 봉을 조회합니다.
    ///
    /// 데이터가 없으면 빈 벡터를 반환할 수 있습니다.
    /// 결과는 날짜 오름차순입니다.
    async fn fetch_series(
        &self,
        symbol: &str,
        period: HistoryPeriod,
        interval: BarInterval,
    ) -> Result<Vec<PriceBar>>;
}
