//! 가격 봉 캐시 저장소.
//!
//! `price_bars`와 `refresh_markers` 두 테이블을 소유합니다.
//! 다른 컴포넌트는 이 저장소를 통해서만 두 테이블에 접근합니다.
//!
//! # 쓰기 규칙
//!
//! - 봉은 (symbol, interval, bar_date) 기준 upsert: 없으면 삽입, 있으면 OHLCV 덮어쓰기
//! - 한 번의 `upsert_bars` 호출은 갱신 마커와 함께 하나의 트랜잭션으로 적용
//! - 삭제는 하지 않음

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::{FromRow, QueryBuilder};
use stockview_core::{BarInterval, PriceBar};
use tracing::{debug, info, instrument};

use crate::error::{DataError, Result};
use crate::storage::database::Database;

/// 가격 봉 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct PriceBarRecord {
    pub symbol: String,
    pub interval: String,
    pub bar_date: DateTime<Utc>,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: i64,
    pub fetched_at: DateTime<Utc>,
}

impl PriceBarRecord {
    /// PriceBar 도메인 객체로 변환.
    pub fn to_price_bar(&self) -> Result<PriceBar> {
        Ok(PriceBar {
            date: self.bar_date,
            open: parse_price(&self.open)?,
            high: parse_price(&self.high)?,
            low: parse_price(&self.low)?,
            close: parse_price(&self.close)?,
            volume: self.volume,
        })
    }
}

fn parse_price(value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| DataError::ParseError(format!("가격 파싱 오류 ({}): {}", value, e)))
}

/// 조회 날짜 범위 (양 끝 포함).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// 전체 기간.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }
}

/// 캐시 키별 요약.
#[derive(Debug, Clone, FromRow)]
pub struct CacheSummary {
    pub symbol: String,
    pub interval: String,
    pub bar_count: i64,
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// 가격 봉 캐시 저장소.
#[derive(Clone)]
pub struct PriceBarRepository {
    pool: SqlitePool,
}

impl PriceBarRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// 캐시된 봉을 날짜 오름차순으로 조회.
    ///
    /// 일치하는 행이 없으면 빈 벡터를 반환합니다.
    #[instrument(skip(self))]
    pub async fn read_bars(
        &self,
        symbol: &str,
        interval: BarInterval,
        range: DateRange,
    ) -> Result<Vec<PriceBar>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT symbol, interval, bar_date, open, high, low, close, volume, fetched_at \
             FROM price_bars WHERE symbol = ",
        );
        query.push_bind(symbol);
        query.push(" AND interval = ");
        query.push_bind(interval.as_str());
        if let Some(start) = range.start {
            query.push(" AND bar_date >= ");
            query.push_bind(start);
        }
        if let Some(end) = range.end {
            query.push(" AND bar_date <= ");
            query.push_bind(end);
        }
        query.push(" ORDER BY bar_date ASC");

        let records: Vec<PriceBarRecord> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DataError::QueryError(e.to_string()))?;

        let bars = records
            .iter()
            .map(PriceBarRecord::to_price_bar)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            symbol = symbol,
            interval = %interval,
            count = bars.len(),
            "캐시에서 가격 봉 조회"
        );

        Ok(bars)
    }

    /// 봉 배치를 upsert하고 갱신 마커를 같은 트랜잭션에서 기록.
    ///
    /// 중간에 실패하면 트랜잭션이 롤백되어 배치 전체가 적용되지 않습니다.
    /// 같은 날짜가 배치 안에 여러 번 있으면 마지막 값이 남습니다.
    #[instrument(skip(self, bars), fields(count = bars.len()))]
    pub async fn upsert_bars(
        &self,
        symbol: &str,
        interval: BarInterval,
        bars: &[PriceBar],
        refreshed_at: DateTime<Utc>,
    ) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let mut written = 0;
        for bar in bars {
            let result = sqlx::query(
                r#"
                INSERT INTO price_bars
                    (symbol, interval, bar_date, open, high, low, close, volume, fetched_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (symbol, interval, bar_date) DO UPDATE SET
                    open = excluded.open,
                    high = excluded.high,
                    low = excluded.low,
                    close = excluded.close,
                    volume = excluded.volume,
                    fetched_at = excluded.fetched_at
                "#,
            )
            .bind(symbol)
            .bind(interval.as_str())
            .bind(bar.date)
            .bind(bar.open.to_string())
            .bind(bar.high.to_string())
            .bind(bar.low.to_string())
            .bind(bar.close.to_string())
            .bind(bar.volume)
            .bind(refreshed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            written += result.rows_affected() as usize;
        }

        upsert_marker(&mut tx, symbol, interval, refreshed_at).await?;

        tx.commit()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

        info!(
            symbol = symbol,
            interval = %interval,
            written = written,
            "가격 봉 캐시에 저장"
        );

        Ok(written)
    }

    /// 마지막 갱신 시각 조회.
    pub async fn get_refresh_marker(
        &self,
        symbol: &str,
        interval: BarInterval,
    ) -> Result<Option<DateTime<Utc>>> {
        let result: Option<(DateTime<Utc>,)> = sqlx::query_as(
            "SELECT last_refreshed_at FROM refresh_markers WHERE symbol = ? AND interval = ?",
        )
        .bind(symbol)
        .bind(interval.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))?;

        Ok(result.map(|(t,)| t))
    }

    /// 갱신 마커만 단독으로 기록 (없으면 생성, 있으면 덮어쓰기).
    pub async fn touch_refresh_marker(
        &self,
        symbol: &str,
        interval: BarInterval,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;
        upsert_marker(&mut tx, symbol, interval, at).await?;
        tx.commit()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;
        Ok(())
    }

    /// 캐시된 봉 수 조회.
    pub async fn count_bars(&self, symbol: &str, interval: BarInterval) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM price_bars WHERE symbol = ? AND interval = ?")
                .bind(symbol)
                .bind(interval.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DataError::QueryError(e.to_string()))?;

        Ok(count)
    }

    /// 전체 캐시 키 요약 조회.
    pub async fn cache_summaries(&self) -> Result<Vec<CacheSummary>> {
        sqlx::query_as(
            r#"
            SELECT b.symbol AS symbol,
                   b.interval AS interval,
                   COUNT(*) AS bar_count,
                   MIN(b.bar_date) AS first_date,
                   MAX(b.bar_date) AS last_date,
                   m.last_refreshed_at AS last_refreshed_at
            FROM price_bars b
            LEFT JOIN refresh_markers m
                ON m.symbol = b.symbol AND m.interval = b.interval
            GROUP BY b.symbol, b.interval
            ORDER BY b.symbol, b.interval
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))
    }
}

async fn upsert_marker(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    symbol: &str,
    interval: BarInterval,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO refresh_markers (symbol, interval, last_refreshed_at)
        VALUES (?, ?, ?)
        ON CONFLICT (symbol, interval) DO UPDATE SET
            last_refreshed_at = excluded.last_refreshed_at
        "#,
    )
    .bind(symbol)
    .bind(interval.as_str())
    .bind(at)
    .execute(&mut **tx)
    .await
    .map_err(|e| DataError::InsertError(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    async fn repository() -> PriceBarRepository {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        PriceBarRepository::new(&db)
    }

    fn bar(month: u32, close: Decimal, volume: i64) -> PriceBar {
        PriceBar::new(
            Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap(),
            dec!(2500),
            dec!(2700),
            dec!(2400),
            close,
            volume,
        )
    }

    #[tokio::test]
    async fn test_read_empty_cache() {
        let repo = repository().await;
        let bars = repo
            .read_bars("7203.T", BarInterval::Monthly, DateRange::all())
            .await
            .unwrap();
        assert!(bars.is_empty());
        assert!(repo
            .get_refresh_marker("7203.T", BarInterval::Monthly)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_read_in_date_order() {
        let repo = repository().await;
        let now = Utc::now();
        let batch = vec![bar(3, dec!(2650), 30), bar(1, dec!(2550.25), 10), bar(2, dec!(2600), 20)];

        repo.upsert_bars("7203.T", BarInterval::Monthly, &batch, now)
            .await
            .unwrap();

        let bars = repo
            .read_bars("7203.T", BarInterval::Monthly, DateRange::all())
            .await
            .unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, dec!(2550.25));
        assert_eq!(bars[2].volume, 30);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[tokio::test]
    async fn test_duplicate_date_in_batch_keeps_latest_values() {
        let repo = repository().await;
        let batch = vec![bar(1, dec!(2500), 10), bar(1, dec!(2555), 99)];

        repo.upsert_bars("7203.T", BarInterval::Monthly, &batch, Utc::now())
            .await
            .unwrap();

        let bars = repo
            .read_bars("7203.T", BarInterval::Monthly, DateRange::all())
            .await
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, dec!(2555));
        assert_eq!(bars[0].volume, 99);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let repo = repository().await;
        let batch = vec![bar(1, dec!(2500), 10), bar(2, dec!(2600), 20)];
        let now = Utc::now();

        repo.upsert_bars("7203.T", BarInterval::Monthly, &batch, now)
            .await
            .unwrap();
        let once = repo
            .read_bars("7203.T", BarInterval::Monthly, DateRange::all())
            .await
            .unwrap();

        repo.upsert_bars("7203.T", BarInterval::Monthly, &batch, now)
            .await
            .unwrap();
        let twice = repo
            .read_bars("7203.T", BarInterval::Monthly, DateRange::all())
            .await
            .unwrap();

        assert_eq!(once, twice);
        assert_eq!(repo.count_bars("7203.T", BarInterval::Monthly).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_bar() {
        let repo = repository().await;
        repo.upsert_bars("7203.T", BarInterval::Monthly, &[bar(5, dec!(2500), 10)], Utc::now())
            .await
            .unwrap();
        repo.upsert_bars("7203.T", BarInterval::Monthly, &[bar(5, dec!(2612.5), 42)], Utc::now())
            .await
            .unwrap();

        let bars = repo
            .read_bars("7203.T", BarInterval::Monthly, DateRange::all())
            .await
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, dec!(2612.5));
        assert_eq!(bars[0].volume, 42);
    }

    #[tokio::test]
    async fn test_keys_are_separated_by_interval() {
        let repo = repository().await;
        repo.upsert_bars("7203.T", BarInterval::Monthly, &[bar(1, dec!(1), 1)], Utc::now())
            .await
            .unwrap();

        let daily = repo
            .read_bars("7203.T", BarInterval::Daily, DateRange::all())
            .await
            .unwrap();
        assert!(daily.is_empty());
        assert!(repo
            .get_refresh_marker("7203.T", BarInterval::Daily)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_read_with_date_range() {
        let repo = repository().await;
        let batch: Vec<PriceBar> = (1..=6).map(|m| bar(m, dec!(2500), m as i64)).collect();
        repo.upsert_bars("7203.T", BarInterval::Monthly, &batch, Utc::now())
            .await
            .unwrap();

        let range = DateRange::between(
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        );
        let bars = repo
            .read_bars("7203.T", BarInterval::Monthly, range)
            .await
            .unwrap();
        let volumes: Vec<i64> = bars.iter().map(|b| b.volume).collect();
        assert_eq!(volumes, vec![2, 3, 4]);

        let since = DateRange::since(Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap());
        let bars = repo
            .read_bars("7203.T", BarInterval::Monthly, since)
            .await
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 6);
    }

    #[tokio::test]
    async fn test_marker_written_with_batch_and_overwritten() {
        let repo = repository().await;
        let first = Utc::now() - Duration::days(3);
        repo.upsert_bars("7203.T", BarInterval::Monthly, &[bar(1, dec!(1), 1)], first)
            .await
            .unwrap();
        let marker = repo
            .get_refresh_marker("7203.T", BarInterval::Monthly)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(marker, first);

        let second = Utc::now();
        repo.touch_refresh_marker("7203.T", BarInterval::Monthly, second)
            .await
            .unwrap();
        let marker = repo
            .get_refresh_marker("7203.T", BarInterval::Monthly)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(marker, second);
    }

    #[tokio::test]
    async fn test_failed_batch_is_rolled_back() {
        let repo = repository().await;
        sqlx::query("DROP TABLE refresh_markers")
            .execute(&repo.pool)
            .await
            .unwrap();

        let result = repo
            .upsert_bars("7203.T", BarInterval::Monthly, &[bar(1, dec!(1), 1)], Utc::now())
            .await;
        assert!(matches!(result, Err(DataError::InsertError(_))));

        let bars = repo
            .read_bars("7203.T", BarInterval::Monthly, DateRange::all())
            .await
            .unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn test_cache_summaries() {
        let repo = repository().await;
        let now = Utc::now();
        repo.upsert_bars(
            "7203.T",
            BarInterval::Monthly,
            &[bar(1, dec!(1), 1), bar(2, dec!(1), 1)],
            now,
        )
        .await
        .unwrap();
        repo.upsert_bars("AAPL", BarInterval::Daily, &[bar(1, dec!(1), 1)], now)
            .await
            .unwrap();

        let summaries = repo.cache_summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);
        let toyota = summaries.iter().find(|s| s.symbol == "7203.T").unwrap();
        assert_eq!(toyota.interval, "1mo");
        assert_eq!(toyota.bar_count, 2);
        assert_eq!(toyota.last_refreshed_at, Some(now));
        assert_eq!(
            toyota.last_date,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
        );
    }
}
