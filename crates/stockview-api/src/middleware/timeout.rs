//! 요청 타임아웃 응답 변환.
//!
//! 요청 전체 타임아웃은 공급자 조회 실패와 같게 취급되어야 하므로
//! `TimeoutLayer`가 만든 408 응답을 404 `DATA_NOT_FOUND`로 바꿉니다.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use stockview_data::DataError;
use tracing::warn;

use crate::error::data_error;

/// `TimeoutLayer` 바깥에 두어야 하는 미들웨어.
pub async fn timeout_as_unavailable(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    warn!(path = %path, "요청 처리 시간 초과");
    data_error(&DataError::Timeout(format!("request to {} timed out", path))).into_response()
}
