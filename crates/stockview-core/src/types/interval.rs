//! 가격 봉의 간격 정의.
//!
//! 대시보드가 지원하는 일봉/주봉/월봉만 다룹니다.
//! 문자열 표현은 Yahoo Finance의 interval 파라미터와 동일합니다.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 가격 봉 간격.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BarInterval {
    /// 일봉
    Daily,
    /// 주봉
    Weekly,
    /// 월봉
    #[default]
    Monthly,
}

impl BarInterval {
    /// 지원하는 모든 간격 (표시 순서).
    pub const ALL: [BarInterval; 3] = [BarInterval::Daily, BarInterval::Weekly, BarInterval::Monthly];

    /// Yahoo Finance interval 문자열로 변환합니다.
    ///
    /// 캐시 키와 API 파라미터 모두 이 값을 사용합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            BarInterval::Daily => "1d",
            BarInterval::Weekly => "1wk",
            BarInterval::Monthly => "1mo",
        }
    }

    /// 대시보드 표시용 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            BarInterval::Daily => "日足",
            BarInterval::Weekly => "週足",
            BarInterval::Monthly => "月足",
        }
    }

    /// 날짜가 속한 봉의 시작일.
    ///
    /// 주봉은 월요일, 월봉은 1일에 시작합니다.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            BarInterval::Daily => date,
            BarInterval::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            BarInterval::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// 문자열에서 파싱합니다. `1d`/`daily` 형식을 모두 허용합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1d" | "daily" => Some(BarInterval::Daily),
            "1wk" | "weekly" => Some(BarInterval::Weekly),
            "1mo" | "monthly" => Some(BarInterval::Monthly),
            _ => None,
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BarInterval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidInterval(s.to_string()))
    }
}

impl TryFrom<String> for BarInterval {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BarInterval> for String {
    fn from(value: BarInterval) -> Self {
        value.as_str().to_string()
    }
}
