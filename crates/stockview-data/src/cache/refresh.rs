//! 캐시 기반 가격 이력 제공자.
//!
//! DB 캐시와 외부 제공자를 묶어 24시간(일 단위) TTL로 가격 봉을 제공합니다.
//!
//! # 동작 흐름
//!
//! ```text
//! 요청 (symbol, interval, period)
//!         │
//!         ▼
//! ┌────────────────────┐
//! │ 1. 심볼 정규화       │ ← "7203" → "7203.T"
//! └─────────┬──────────┘
//!           │
//! ┌─────────▼──────────┐
//! │ 2. 키별 Lock 획득    │ ← 같은 심볼+간격은 하나만 처리
//! └─────────┬──────────┘
//!           │
//!     ┌─────┴─────┐
//!     │ 캐시 있음? │
//!     └─────┬─────┘
//!       NO  │  YES
//!       │   │
//!       │   ▼
//!       │ ┌────────────────────┐
//!       │ │ 3. 갱신 마커 확인    │ ← 마지막 갱신 후 하루 이상 경과?
//!       │ └─────────┬──────────┘
//!       │           │ 경과
//!       ▼           ▼
//! ┌──────────────────────────┐
//! │ 4. 제공자 조회 + upsert    │ ← 실패 시 기존 캐시 반환
//! └──────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use stockview_core::{parse_symbol, BarInterval, HistoryPeriod, PriceBar};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::{DataError, Result};
use crate::provider::PriceHistorySource;
use crate::storage::price_bars::{CacheSummary, DateRange, PriceBarRepository};

/// 심볼+간격별 페칭 상태를 추적하는 Lock 맵.
type FetchLockMap = Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>;

/// 기본 갱신 주기 (일).
pub const DEFAULT_REFRESH_AFTER_DAYS: i64 = 1;

/// 갱신 필요 여부 판단.
///
/// 마커가 없거나, 마지막 갱신 이후 경과한 "완전한 일수"가
/// `refresh_after_days` 이상이면 갱신 대상입니다.
/// 23시간 59분은 0일, 24시간 1분은 1일로 계산됩니다.
pub fn is_refresh_due(
    last_refreshed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    refresh_after_days: i64,
) -> bool {
    match last_refreshed_at {
        None => true,
        Some(last) => (now - last).num_days() >= refresh_after_days,
    }
}

/// 캐시 기반 가격 이력 제공자.
pub struct CachedPriceHistory {
    repo: PriceBarRepository,
    source: Arc<dyn PriceHistorySource>,
    refresh_after_days: i64,
    provider_timeout: Option<StdDuration>,
    fetch_locks: FetchLockMap,
}

impl CachedPriceHistory {
    pub fn new(repo: PriceBarRepository, source: Arc<dyn PriceHistorySource>) -> Self {
        Self {
            repo,
            source,
            refresh_after_days: DEFAULT_REFRESH_AFTER_DAYS,
            provider_timeout: None,
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 갱신 주기 설정 (일 단위).
    pub fn with_refresh_after_days(mut self, days: i64) -> Self {
        self.refresh_after_days = days;
        self
    }

    /// 제공자 호출 타임아웃 설정.
    pub fn with_provider_timeout(mut self, timeout: StdDuration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    /// 가격 봉 조회 (캐시 우선, 하루 단위 갱신).
    pub async fn get_or_refresh(
        &self,
        symbol: &str,
        interval: BarInterval,
        period: HistoryPeriod,
    ) -> Result<Vec<PriceBar>> {
        self.get_or_refresh_at(symbol, interval, period, Utc::now())
            .await
    }

    /// 기준 시각을 명시한 가격 봉 조회.
    #[instrument(skip(self))]
    pub async fn get_or_refresh_at(
        &self,
        symbol: &str,
        interval: BarInterval,
        period: HistoryPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let symbol = parse_symbol(symbol)?;
        let lock_key = format!("{}:{}", symbol, interval.as_str());

        let lock = self.get_or_create_lock(&lock_key).await;
        let result = {
            let _guard = lock.write().await;
            self.refresh_locked(&symbol, interval, period, now).await
        };
        drop(lock);
        self.release_lock(&lock_key).await;

        result
    }

    /// 키 Lock을 잡은 상태에서 캐시 확인과 갱신을 수행합니다.
    async fn refresh_locked(
        &self,
        symbol: &str,
        interval: BarInterval,
        period: HistoryPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let cached = self
            .repo
            .read_bars(symbol, interval, DateRange::all())
            .await?;

        if cached.is_empty() {
            return self.fetch_first(symbol, interval, period, now).await;
        }

        let last_refreshed_at = self.repo.get_refresh_marker(symbol, interval).await?;
        if !is_refresh_due(last_refreshed_at, now, self.refresh_after_days) {
            debug!(
                symbol = %symbol,
                interval = %interval,
                cached = cached.len(),
                "캐시 히트"
            );
            return Ok(cached);
        }

        debug!(
            symbol = %symbol,
            interval = %interval,
            last_refreshed_at = ?last_refreshed_at,
            "캐시 갱신 시작"
        );

        let fetched = match self.fetch(symbol, interval, period).await {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) => {
                warn!(
                    symbol = %symbol,
                    interval = %interval,
                    "제공자가 빈 결과 반환, 캐시 데이터 사용"
                );
                return Ok(cached);
            }
            Err(e) => {
                warn!(
                    symbol = %symbol,
                    interval = %interval,
                    error = %e,
                    "데이터 가져오기 실패, 캐시 데이터 사용"
                );
                return Ok(cached);
            }
        };

        let written = self
            .repo
            .upsert_bars(symbol, interval, &fetched, now)
            .await?;

        info!(
            symbol = %symbol,
            interval = %interval,
            written = written,
            "캐시 갱신 완료"
        );

        self.repo
            .read_bars(symbol, interval, DateRange::all())
            .await
    }

    /// 전체 캐시 키 요약.
    pub async fn cache_summaries(&self) -> Result<Vec<CacheSummary>> {
        self.repo.cache_summaries().await
    }

    /// 캐시가 비어 있을 때의 최초 조회.
    async fn fetch_first(
        &self,
        symbol: &str,
        interval: BarInterval,
        period: HistoryPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let fetched = self.fetch(symbol, interval, period).await?;
        if fetched.is_empty() {
            return Err(DataError::NotFound(format!(
                "{} ({}) 데이터 없음",
                symbol, interval
            )));
        }

        self.repo
            .upsert_bars(symbol, interval, &fetched, now)
            .await?;

        info!(
            symbol = symbol,
            interval = %interval,
            fetched = fetched.len(),
            "최초 데이터 캐시 완료"
        );

        Ok(fetched)
    }

    async fn fetch(
        &self,
        symbol: &str,
        interval: BarInterval,
        period: HistoryPeriod,
    ) -> Result<Vec<PriceBar>> {
        let call = async {
            // 제공자 응답 파싱 실패도 "가져오기 실패"로 취급
            self.source
                .fetch_series(symbol, period, interval)
                .await
                .map_err(|e| match e {
                    DataError::ParseError(msg) => DataError::FetchError(msg),
                    other => other,
                })
        };
        match self.provider_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                DataError::Timeout(format!(
                    "{} 응답 시간 초과 ({}ms): {}",
                    self.source.name(),
                    limit.as_millis(),
                    symbol
                ))
            })?,
            None => call.await,
        }
    }

    /// Lock 획득 또는 생성.
    async fn get_or_create_lock(&self, key: &str) -> Arc<RwLock<()>> {
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// 더 이상 아무도 잡고 있지 않은 Lock 항목을 제거합니다.
    ///
    /// 맵 쓰기 Lock 아래에서 확인하므로, 다른 요청이 이미 복제한 Lock은 남겨 둡니다.
    async fn release_lock(&self, key: &str) {
        let mut locks = self.fetch_locks.write().await;
        if locks
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(key);
        }
    }
}
