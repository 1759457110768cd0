//! 가격 봉 레코드 endpoint.
//!
//! 대시보드가 표 형태로 사용하는 OHLCV 레코드를 반환합니다.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockview_core::{parse_symbol, BarInterval, HistoryPeriod, PriceBar, DEFAULT_SYMBOL};
use tracing::{debug, error};

use crate::error::{data_error, invalid_input, ApiResult};
use crate::state::AppState;

/// 가격 이력 조회 쿼리.
///
/// `/api/stock-data`와 `/api/plot`이 공유합니다.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// 종목 코드 (예: 7203, 7203.T, AAPL)
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// 봉 간격 (1d, 1wk, 1mo)
    #[serde(default = "default_interval")]
    pub interval: String,
    /// 조회 기간 (1mo ~ 10y, max)
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

fn default_interval() -> String {
    BarInterval::default().as_str().to_string()
}

fn default_period() -> String {
    HistoryPeriod::default().as_str().to_string()
}

/// 검증된 조회 파라미터.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryParams {
    pub symbol: String,
    pub interval: BarInterval,
    pub period: HistoryPeriod,
}

impl HistoryQuery {
    /// 쿼리 값을 검증하고 심볼을 정규화합니다.
    pub fn validate(&self) -> ApiResult<HistoryParams> {
        let symbol = parse_symbol(&self.symbol).map_err(|e| invalid_input(&e))?;
        let interval = BarInterval::from_str(&self.interval).map_err(|e| invalid_input(&e))?;
        let period = HistoryPeriod::from_str(&self.period).map_err(|e| invalid_input(&e))?;

        Ok(HistoryParams {
            symbol,
            interval,
            period,
        })
    }
}

/// 캐시를 거쳐 가격 봉을 조회합니다.
pub(crate) async fn load_bars(state: &AppState, params: &HistoryParams) -> ApiResult<Vec<PriceBar>> {
    state
        .history
        .get_or_refresh(&params.symbol, params.interval, params.period)
        .await
        .map_err(|e| {
            error!(
                symbol = %params.symbol,
                interval = %params.interval,
                period = %params.period,
                error = %e,
                "가격 데이터 조회 실패"
            );
            data_error(&e)
        })
}

/// OHLCV 레코드.
///
/// 필드 이름은 대시보드가 기대하는 대문자 키를 사용합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDataRecord {
    /// ISO-8601 날짜
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open", with = "rust_decimal::serde::float")]
    pub open: Decimal,
    #[serde(rename = "High", with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(rename = "Low", with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(rename = "Close", with = "rust_decimal::serde::float")]
    pub close: Decimal,
    #[serde(rename = "Volume")]
    pub volume: i64,
}

impl From<&PriceBar> for StockDataRecord {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.iso_date(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// 가격 봉 레코드 조회.
///
/// GET /api/stock-data?symbol=7203&interval=1mo&period=1y
pub async fn get_stock_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<StockDataRecord>>> {
    let params = query.validate()?;

    debug!(
        symbol = %params.symbol,
        interval = %params.interval,
        period = %params.period,
        "가격 데이터 조회 시작"
    );

    let bars = load_bars(&state, &params).await?;
    Ok(Json(bars.iter().map(StockDataRecord::from).collect()))
}

pub fn stock_data_router() -> Router<Arc<AppState>> {
    Router::new().route("/stock-data", get(get_stock_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_api_router;
    use crate::state::{create_test_state, test_support::{sample_bars, StaticSource}};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(source: Arc<StaticSource>, uri: &str) -> (StatusCode, Value) {
        let state = Arc::new(create_test_state(source).await);
        let app = create_api_router().with_state(state);

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_query_defaults() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        let params = query.validate().unwrap();

        assert_eq!(params.symbol, "7203.T");
        assert_eq!(params.interval, BarInterval::Monthly);
        assert_eq!(params.period, HistoryPeriod::OneYear);
    }

    #[test]
    fn test_query_normalizes_numeric_symbol() {
        let query = HistoryQuery {
            symbol: "6758".to_string(),
            interval: "1d".to_string(),
            period: "5y".to_string(),
        };
        let params = query.validate().unwrap();

        assert_eq!(params.symbol, "6758.T");
        assert_eq!(params.interval, BarInterval::Daily);
        assert_eq!(params.period, HistoryPeriod::FiveYears);
    }

    #[tokio::test]
    async fn test_stock_data_records() {
        let source = Arc::new(StaticSource::with_bars(sample_bars()));
        let (status, body) = get_json(source.clone(), "/api/stock-data?symbol=7203").await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["Date"], "2024-01-01T00:00:00.000Z");
        assert_eq!(records[0]["Open"], 2500.0);
        assert_eq!(records[0]["Close"], 2650.5);
        assert_eq!(records[2]["Volume"], 3_000_000);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_stock_data_not_found() {
        let source = Arc::new(StaticSource::empty());
        let (status, body) = get_json(source, "/api/stock-data?symbol=0000").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "DATA_NOT_FOUND");
        assert_eq!(body["error"], crate::error::DATA_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_stock_data_invalid_interval() {
        let source = Arc::new(StaticSource::with_bars(sample_bars()));
        let (status, body) = get_json(source.clone(), "/api/stock-data?interval=2h").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_stock_data_blank_symbol() {
        let source = Arc::new(StaticSource::with_bars(sample_bars()));
        let (status, _) = get_json(source, "/api/stock-data?symbol=").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
