//! 캔들스틱 차트 endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use stockview_core::ChartFigure;

use super::stock_data::{load_bars, HistoryQuery};
use crate::error::ApiResult;
use crate::state::AppState;

/// 캔들스틱 + 거래량 Figure 조회.
///
/// 브라우저의 Plotly가 그대로 렌더링할 수 있는 JSON을 반환합니다.
///
/// GET /api/plot?symbol=7203&interval=1mo&period=1y
pub async fn get_plot(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ChartFigure>> {
    let params = query.validate()?;
    let bars = load_bars(&state, &params).await?;

    Ok(Json(ChartFigure::candlestick(
        &params.symbol,
        params.interval,
        params.period,
        &bars,
    )))
}

pub fn chart_router() -> Router<Arc<AppState>> {
    Router::new().route("/plot", get(get_plot))
}
