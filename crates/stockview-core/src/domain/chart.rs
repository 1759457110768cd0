//! 캔들스틱 차트 Figure 구성.
//!
//! 브라우저의 Plotly가 그대로 렌더링할 수 있는 JSON 구조를 만듭니다.
//! 캔들스틱 trace와 보조 y축의 거래량 bar trace 두 개로 구성됩니다.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::price_bar::PriceBar;
use crate::types::{BarInterval, HistoryPeriod};

const CANDLESTICK_NAME: &str = "ローソク足";
const VOLUME_NAME: &str = "出来高";
const PRICE_AXIS_TITLE: &str = "価格";
const DATE_AXIS_TITLE: &str = "日付";

/// Plotly Figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartFigure {
    pub data: Vec<ChartTrace>,
    pub layout: ChartLayout,
}

/// Figure를 구성하는 trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartTrace {
    Candlestick {
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        name: String,
    },
    Bar {
        x: Vec<String>,
        y: Vec<i64>,
        name: String,
        yaxis: String,
    },
}

/// 축/제목 텍스트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartTitle {
    pub text: String,
}

impl ChartTitle {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XAxis {
    pub title: ChartTitle,
    pub rangeslider: RangeSlider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YAxis {
    pub title: ChartTitle,
    /// 겹쳐 그릴 축 (보조 축만 사용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

/// Figure 레이아웃.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartLayout {
    pub title: ChartTitle,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
    pub yaxis2: YAxis,
}

impl ChartFigure {
    /// 가격 봉 시퀀스로 캔들스틱 + 거래량 Figure를 생성합니다.
    ///
    /// 제목은 `"{symbol} - {interval} - {period}"` 형식입니다.
    pub fn candlestick(
        symbol: &str,
        interval: BarInterval,
        period: HistoryPeriod,
        bars: &[PriceBar],
    ) -> Self {
        let x: Vec<String> = bars.iter().map(PriceBar::iso_date).collect();
        let price = |f: fn(&PriceBar) -> rust_decimal::Decimal| -> Vec<f64> {
            bars.iter()
                .map(|b| f(b).to_f64().unwrap_or(f64::NAN))
                .collect()
        };

        let candlestick = ChartTrace::Candlestick {
            x: x.clone(),
            open: price(|b| b.open),
            high: price(|b| b.high),
            low: price(|b| b.low),
            close: price(|b| b.close),
            name: CANDLESTICK_NAME.to_string(),
        };

        let volume = ChartTrace::Bar {
            x,
            y: bars.iter().map(|b| b.volume).collect(),
            name: VOLUME_NAME.to_string(),
            yaxis: "y2".to_string(),
        };

        let layout = ChartLayout {
            title: ChartTitle::new(format!("{} - {} - {}", symbol, interval, period)),
            xaxis: XAxis {
                title: ChartTitle::new(DATE_AXIS_TITLE),
                rangeslider: RangeSlider { visible: false },
            },
            yaxis: YAxis {
                title: ChartTitle::new(PRICE_AXIS_TITLE),
                overlaying: None,
                side: None,
            },
            yaxis2: YAxis {
                title: ChartTitle::new(VOLUME_NAME),
                overlaying: Some("y".to_string()),
                side: Some("right".to_string()),
            },
        };

        Self {
            data: vec![candlestick, volume],
            layout,
        }
    }
}
