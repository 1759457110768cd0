//! API 서버용 HTTP middleware.

mod timeout;

pub use timeout::timeout_as_unavailable;
