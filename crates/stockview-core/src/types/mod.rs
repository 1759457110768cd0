//! 서비스 전반에서 사용되는 공통 타입.

mod interval;
mod period;
mod symbol;

pub use interval::*;
pub use period::*;
pub use symbol::*;
