//! OHLCV 가격 봉.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::BarInterval;

/// 하나의 OHLCV 가격 봉.
///
/// 심볼과 간격은 봉 시퀀스의 문맥(캐시 키)으로 전달되며,
/// 같은 시퀀스 안에서 `date`는 유일합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 봉 시작 시각 (UTC)
    pub date: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: i64,
}

impl PriceBar {
    /// 새 가격 봉을 생성합니다.
    pub fn new(
        date: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: i64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 같은 기간의 뒤따르는 봉을 합칩니다.
    ///
    /// 시가는 유지하고, 고가/저가는 극값, 종가는 나중 값, 거래량은 합산합니다.
    fn absorb(&mut self, later: PriceBar) {
        self.high = self.high.max(later.high);
        self.low = self.low.min(later.low);
        self.close = later.close;
        self.volume = self.volume.saturating_add(later.volume);
    }

    /// ISO-8601 날짜 문자열 (밀리초, `Z` 접미사).
    pub fn iso_date(&self) -> String {
        iso_timestamp(self.date)
    }
}

/// 타임스탬프를 대시보드가 기대하는 ISO-8601 형식으로 변환합니다.
///
/// 예: `2024-01-01T00:00:00.000Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 봉 시퀀스를 날짜 오름차순으로 정렬하고, 같은 날짜는 마지막 값만 남깁니다.
pub fn sort_and_dedup_bars(bars: Vec<PriceBar>) -> Vec<PriceBar> {
    let mut bars = bars;
    // 안정 정렬이므로 같은 날짜끼리는 입력 순서가 유지된다
    bars.sort_by_key(|b| b.date);

    let mut result: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match result.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => result.push(bar),
        }
    }
    result
}

/// 기간 시작일로 맞춰진 봉 시퀀스에서 같은 기간의 행을 하나로 합칩니다.
///
/// Yahoo는 진행 중인 기간의 실시간 행을 따로 돌려주는 경우가 있습니다.
/// 일봉은 나중 행으로 교체하고, 주봉/월봉은 시가 유지, 고가/저가 극값, 종가 교체, 거래량 합산으로 합칩니다.
pub fn fold_period_bars(bars: Vec<PriceBar>, interval: BarInterval) -> Vec<PriceBar> {
    if interval == BarInterval::Daily {
        return sort_and_dedup_bars(bars);
    }

    let mut bars = bars;
    bars.sort_by_key(|b| b.date);

    let mut result: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match result.last_mut() {
            Some(last) if last.date == bar.date => last.absorb(bar),
            _ => result.push(bar),
        }
    }
    result
}
