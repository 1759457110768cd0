//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//!
//! # 예시
//!
//! ```json
//! {
//!   "error": "データを取得できませんでした。銘柄コードを確認してください。",
//!   "code": "DATA_NOT_FOUND",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockview_core::CoreError;
use stockview_data::DataError;

/// 데이터를 얻지 못했을 때 대시보드에 표시되는 메시지.
pub const DATA_UNAVAILABLE_MESSAGE: &str =
    "データを取得できませんでした。銘柄コードを確認してください。";

/// 통합 API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub error: String,
    /// 에러 코드 (예: "DATA_NOT_FOUND", "INVALID_INPUT", "DB_ERROR")
    pub code: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 잘못된 요청 파라미터 → 400.
pub fn invalid_input(err: &CoreError) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("INVALID_INPUT", err.to_string())),
    )
}

/// 데이터 계층 오류를 HTTP 응답으로 변환.
///
/// - 입력 오류 → 400
/// - 데이터를 얻을 수 없음 (공급자 실패, 데이터 없음, 저장 실패) → 404
/// - 그 외 저장소 오류 → 500
pub fn data_error(err: &DataError) -> (StatusCode, Json<ApiErrorResponse>) {
    match err {
        DataError::InvalidData(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::new("INVALID_INPUT", msg.clone())),
        ),
        e if e.is_unavailable() => (
            StatusCode::NOT_FOUND,
            Json(ApiErrorResponse::new("DATA_NOT_FOUND", DATA_UNAVAILABLE_MESSAGE)),
        ),
        e => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse::new("DB_ERROR", e.to_string())),
        ),
    }
}
