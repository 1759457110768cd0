//! 선택지 및 캐시 현황 endpoint.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use stockview_core::{iso_timestamp, BarInterval, HistoryPeriod};
use stockview_data::CacheSummary;
use tracing::error;

use crate::error::{data_error, ApiResult};
use crate::state::AppState;

/// 드롭다운 선택지.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
}

impl OptionItem {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// GET /api/intervals
pub async fn list_intervals() -> Json<Vec<OptionItem>> {
    Json(
        BarInterval::ALL
            .iter()
            .map(|i| OptionItem::new(i.as_str(), i.label()))
            .collect(),
    )
}

/// GET /api/periods
pub async fn list_periods() -> Json<Vec<OptionItem>> {
    Json(
        HistoryPeriod::ALL
            .iter()
            .map(|p| OptionItem::new(p.as_str(), p.label()))
            .collect(),
    )
}

/// 캐시 키별 현황.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntryResponse {
    pub symbol: String,
    pub interval: String,
    pub bar_count: i64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub last_refreshed_at: Option<String>,
}

impl From<CacheSummary> for CacheEntryResponse {
    fn from(summary: CacheSummary) -> Self {
        Self {
            symbol: summary.symbol,
            interval: summary.interval,
            bar_count: summary.bar_count,
            first_date: summary.first_date.map(iso_timestamp),
            last_date: summary.last_date.map(iso_timestamp),
            last_refreshed_at: summary.last_refreshed_at.map(iso_timestamp),
        }
    }
}

/// 캐시 현황 조회.
///
/// GET /api/cache
pub async fn list_cache_entries(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CacheEntryResponse>>> {
    let summaries = state.history.cache_summaries().await.map_err(|e| {
        error!(error = %e, "캐시 현황 조회 실패");
        data_error(&e)
    })?;

    Ok(Json(summaries.into_iter().map(CacheEntryResponse::from).collect()))
}

pub fn options_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/intervals", get(list_intervals))
        .route("/periods", get(list_periods))
        .route("/cache", get(list_cache_entries))
}
