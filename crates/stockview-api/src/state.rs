//! 애플리케이션 상태 관리.
//!
//! 모든 API 핸들러에서 공유되는 상태를 정의합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stockview_data::{CachedPriceHistory, Database};

/// 모든 핸들러에서 공유되는 애플리케이션 상태.
///
/// `Arc<AppState>` 형태로 라우터에 전달됩니다.
pub struct AppState {
    /// 캐시 데이터베이스 (SQLite)
    pub db: Database,

    /// 캐시 기반 가격 이력 제공자
    pub history: Arc<CachedPriceHistory>,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(db: Database, history: CachedPriceHistory) -> Self {
        Self {
            db,
            history: Arc::new(history),
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        self.db.health_check().await.unwrap_or(false)
    }
}


/// 테스트용 AppState 생성.
///
/// 인메모리 SQLite와 주어진 제공자로 상태를 구성합니다.
#[cfg(test)]
pub async fn create_test_state(source: Arc<dyn stockview_data::PriceHistorySource>) -> AppState {
    use stockview_data::PriceBarRepository;

    let db = Database::connect_in_memory()
        .await
        .expect("Failed to open in-memory database for test");
    db.migrate().await.expect("Failed to migrate test database");

    let history = CachedPriceHistory::new(PriceBarRepository::new(&db), source);
    AppState::new(db, history)
}
