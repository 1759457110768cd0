//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/stock-data` - 가격 봉 레코드
//! - `/api/plot` - 캔들스틱 차트 Figure
//! - `/api/intervals` - 선택 가능한 봉 간격
//! - `/api/periods` - 선택 가능한 조회 기간
//! - `/api/cache` - 캐시 현황

pub mod chart;
pub mod health;
pub mod options;
pub mod stock_data;

pub use chart::chart_router;
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use options::{options_router, CacheEntryResponse, OptionItem};
pub use stock_data::{stock_data_router, HistoryQuery, StockDataRecord};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    let api = Router::new()
        .merge(stock_data_router())
        .merge(chart_router())
        .merge(options_router());

    Router::new()
        .nest("/health", health_router())
        .nest("/api", api)
}
