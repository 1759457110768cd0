//! SQLite 저장소.

pub mod database;
pub mod price_bars;
