//! 조회 기간 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 공급자에 요청하는 과거 데이터 기간.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HistoryPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    /// 상장 이후 전체
    Max,
}

impl HistoryPeriod {
    /// 지원하는 모든 기간 (표시 순서).
    pub const ALL: [HistoryPeriod; 8] = [
        HistoryPeriod::OneMonth,
        HistoryPeriod::ThreeMonths,
        HistoryPeriod::SixMonths,
        HistoryPeriod::OneYear,
        HistoryPeriod::TwoYears,
        HistoryPeriod::FiveYears,
        HistoryPeriod::TenYears,
        HistoryPeriod::Max,
    ];

    /// Yahoo Finance range 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryPeriod::OneMonth => "1mo",
            HistoryPeriod::ThreeMonths => "3mo",
            HistoryPeriod::SixMonths => "6mo",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::FiveYears => "5y",
            HistoryPeriod::TenYears => "10y",
            HistoryPeriod::Max => "max",
        }
    }

    /// 대시보드 표시용 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            HistoryPeriod::OneMonth => "1ヶ月",
            HistoryPeriod::ThreeMonths => "3ヶ月",
            HistoryPeriod::SixMonths => "6ヶ月",
            HistoryPeriod::OneYear => "1年",
            HistoryPeriod::TwoYears => "2年",
            HistoryPeriod::FiveYears => "5年",
            HistoryPeriod::TenYears => "10年",
            HistoryPeriod::Max => "全期間",
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HistoryPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        HistoryPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == trimmed)
            .ok_or_else(|| CoreError::InvalidPeriod(s.to_string()))
    }
}

impl TryFrom<String> for HistoryPeriod {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HistoryPeriod> for String {
    fn from(value: HistoryPeriod) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse() {
        assert_eq!("1y".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::OneYear);
        assert_eq!("max".parse::<HistoryPeriod>().unwrap(), HistoryPeriod::Max);
        assert!("ytd".parse::<HistoryPeriod>().is_err());
        assert!("1d".parse::<HistoryPeriod>().is_err());
    }

    #[test]
    fn test_all_periods_round_trip_through_str() {
        for period in HistoryPeriod::ALL {
            assert_eq!(period.as_str().parse::<HistoryPeriod>().unwrap(), period);
        }
    }
}
