//! 차트 서비스를 위한 도메인 모델.

mod chart;
mod price_bar;

pub use chart::*;
pub use price_bar::*;
