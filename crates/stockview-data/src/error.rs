//! 데이터 모듈 오류 타입.

use stockview_core::CoreError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 데이터 삽입 오류 (트랜잭션 롤백됨)
    #[error("Insert error: {0}")]
    InsertError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 타임아웃 오류
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 캐시와 공급자 어디에도 데이터 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 잘못된 입력
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl DataError {
    /// "데이터를 얻을 수 없음"으로 응답해야 하는 오류인지 확인합니다.
    ///
    /// 공급자 실패, 데이터 없음, 저장 실패가 해당합니다.
    /// 연결/쿼리/파싱 오류는 예상하지 못한 오류로 취급합니다.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DataError::FetchError(_)
                | DataError::Timeout(_)
                | DataError::NotFound(_)
                | DataError::InsertError(_)
        )
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                DataError::ConnectionError(err.to_string())
            }
            sqlx::Error::Database(db_err) => DataError::QueryError(db_err.message().to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<CoreError> for DataError {
    fn from(err: CoreError) -> Self {
        DataError::InvalidData(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(DataError::FetchError("503".to_string()).is_unavailable());
        assert!(DataError::Timeout("20s".to_string()).is_unavailable());
        assert!(DataError::InsertError("disk full".to_string()).is_unavailable());
        assert!(!DataError::QueryError("corrupt".to_string()).is_unavailable());
        assert!(!DataError::ParseError("bad json".to_string()).is_unavailable());
    }

    #[test]
    fn test_from_core_error() {
        let err: DataError = CoreError::InvalidSymbol(String::new()).into();
        assert!(matches!(err, DataError::InvalidData(_)));
    }
}
