//! Yahoo Finance 가격 이력 제공자.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use stockview_core::{fold_period_bars, BarInterval, HistoryPeriod, PriceBar};
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use super::PriceHistorySource;
use crate::error::{DataError, Result};

/// Yahoo Finance 가격 이력 제공자.
pub struct YahooHistorySource {
    connector: yahoo::YahooConnector,
}

impl YahooHistorySource {
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl PriceHistorySource for YahooHistorySource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        period: HistoryPeriod,
        interval: BarInterval,
    ) -> Result<Vec<PriceBar>> {
        debug!(
            symbol = symbol,
            interval = interval.as_str(),
            range = period.as_str(),
            "Yahoo Finance API 호출"
        );

        let response = self
            .connector
            .get_quote_range(symbol, interval.as_str(), period.as_str())
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", symbol, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        let tz = exchange_timezone(
            response
                .metadata()
                .ok()
                .map(|m| m.exchange_timezone_name.clone()),
        );

        let total = quotes.len();
        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                quote_to_bar(
                    q.timestamp as i64,
                    interval,
                    tz,
                    q.open,
                    q.high,
                    q.low,
                    q.close,
                    q.volume as i64,
                )
            })
            .collect();

        if bars.len() < total {
            warn!(
                symbol = symbol,
                skipped = total - bars.len(),
                "유효하지 않은 Quote 건너뜀"
            );
        }

        Ok(fold_period_bars(bars, interval))
    }
}

/// 거래소 시간대 이름을 해석합니다. 알 수 없으면 UTC.
fn exchange_timezone(name: Option<String>) -> Tz {
    match name.as_deref().map(str::parse::<Tz>) {
        Some(Ok(tz)) => tz,
        Some(Err(_)) => {
            warn!(timezone = ?name, "알 수 없는 거래소 시간대, UTC 사용");
            Tz::UTC
        }
        None => Tz::UTC,
    }
}

/// 타임스탬프를 봉 기간 시작일(거래소 현지 달력 기준)로 맞춥니다.
///
/// 결과는 현지 날짜의 자정을 UTC로 표기한 값입니다.
/// 진행 중인 기간의 실시간 행도 같은 날짜로 모여 [`fold_period_bars`]에서 합쳐집니다.
pub(crate) fn period_start_date(
    timestamp: i64,
    interval: BarInterval,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    let local = Utc.timestamp_opt(timestamp, 0).single()?.with_timezone(&tz);
    let start = interval.period_start(local.date_naive());
    Some(start.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Yahoo Quote 필드를 가격 봉으로 변환.
///
/// 가격이 유한하지 않거나 타임스탬프가 범위를 벗어나면 `None`.
/// 음수 거래량은 0으로 처리합니다.
#[allow(clippy::too_many_arguments)]
pub(crate) fn quote_to_bar(
    timestamp: i64,
    interval: BarInterval,
    tz: Tz,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
) -> Option<PriceBar> {
    let date = period_start_date(timestamp, interval, tz)?;
    Some(PriceBar::new(
        date,
        to_decimal(open)?,
        to_decimal(high)?,
        to_decimal(low)?,
        to_decimal(close)?,
        volume.max(0),
    ))
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64_retain(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JST: Tz = chrono_tz::Asia::Tokyo;

    #[test]
    fn test_quote_to_bar() {
        // 2024-01-04T00:00:00Z
        let bar = quote_to_bar(
            1_704_326_400,
            BarInterval::Daily,
            Tz::UTC,
            2500.0,
            2550.5,
            2480.0,
            2530.0,
            1_000_000,
        )
        .unwrap();
        assert_eq!(bar.iso_date(), "2024-01-04T00:00:00.000Z");
        assert_eq!(bar.high, Decimal::from_f64_retain(2550.5).unwrap());
        assert_eq!(bar.volume, 1_000_000);
    }

    #[test]
    fn test_quote_to_bar_skips_non_finite_prices() {
        let ts = 1_704_326_400;
        let daily = BarInterval::Daily;
        assert!(quote_to_bar(ts, daily, Tz::UTC, f64::NAN, 1.0, 1.0, 1.0, 1).is_none());
        assert!(quote_to_bar(ts, daily, Tz::UTC, 1.0, f64::INFINITY, 1.0, 1.0, 1).is_none());
    }

    #[test]
    fn test_quote_to_bar_clamps_negative_volume() {
        let bar =
            quote_to_bar(1_704_326_400, BarInterval::Daily, Tz::UTC, 1.0, 1.0, 1.0, 1.0, -5).unwrap();
        assert_eq!(bar.volume, 0);
    }

    #[test]
    fn test_daily_uses_exchange_local_date() {
        // 2024-07-01 00:00 JST == 2024-06-30T15:00:00Z
        let date = period_start_date(1_719_759_600, BarInterval::Daily, JST).unwrap();
        assert_eq!(stockview_core::iso_timestamp(date), "2024-07-01T00:00:00.000Z");
    }

    #[test]
    fn test_monthly_live_row_folds_into_month_start() {
        // 월봉 행 2024-07-01 00:00 JST, 실시간 행 2024-07-10 16:00 JST
        let month = quote_to_bar(
            1_719_759_600,
            BarInterval::Monthly,
            JST,
            100.0,
            110.0,
            95.0,
            105.0,
            1_000,
        )
        .unwrap();
        let live = quote_to_bar(
            1_720_594_800,
            BarInterval::Monthly,
            JST,
            105.0,
            112.0,
            104.0,
            111.0,
            300,
        )
        .unwrap();
        assert_eq!(month.date, live.date);

        let bars = fold_period_bars(vec![month, live], BarInterval::Monthly);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].iso_date(), "2024-07-01T00:00:00.000Z");
        assert_eq!(bars[0].high, Decimal::from_f64_retain(112.0).unwrap());
        assert_eq!(bars[0].close, Decimal::from_f64_retain(111.0).unwrap());
        assert_eq!(bars[0].volume, 1_300);
    }

    #[test]
    fn test_weekly_aligns_to_monday() {
        // 2024-07-10 (수) 16:00 JST → 2024-07-08
        let date = period_start_date(1_720_594_800, BarInterval::Weekly, JST).unwrap();
        assert_eq!(stockview_core::iso_timestamp(date), "2024-07-08T00:00:00.000Z");
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        assert_eq!(exchange_timezone(Some("Mars/Olympus".to_string())), Tz::UTC);
        assert_eq!(exchange_timezone(Some("Asia/Tokyo".to_string())), JST);
        assert_eq!(exchange_timezone(None), Tz::UTC);
    }
}
