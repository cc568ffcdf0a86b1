//! Timeframe analyzer: one bar series in, one scored snapshot out.
//!
//! Only the most recent value of each indicator is read. Each indicator
//! votes +1, 0 or -1; the composite score is the vote sum times 25.
//! Confidence is ADX/50 capped at 1.
//!
//! The bar gate only guarantees the EMA and MACD. An RSI or Supertrend that
//! is still warming up votes 0, and a missing ADX counts as 0.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::round_to;
use crate::domain::{Bar, BarSeries};
use crate::indicators::{Adx, Ema, Indicator, Macd, Rsi, Supertrend, Trend};
use crate::settings::IndicatorSettings;

/// RSI strictly above this votes bullish.
pub const RSI_BULLISH: f64 = 60.0;
/// RSI strictly below this votes bearish.
pub const RSI_BEARISH: f64 = 40.0;
/// ADX at which confidence saturates.
pub const ADX_FULL_CONFIDENCE: f64 = 50.0;
/// Points contributed by one indicator vote.
pub const VOTE_WEIGHT: i32 = 25;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("{indicator} has no value at the latest bar")]
    MissingValue { indicator: String },
}

/// One indicator's directional vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Bearish,
    Neutral,
    Bullish,
}

impl Signal {
    /// Sign of `value`, with exact zero (and NaN) neutral.
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Signal::Bullish
        } else if value < 0.0 {
            Signal::Bearish
        } else {
            Signal::Neutral
        }
    }

    pub fn from_rsi(rsi: f64) -> Self {
        if rsi > RSI_BULLISH {
            Signal::Bullish
        } else if rsi < RSI_BEARISH {
            Signal::Bearish
        } else {
            Signal::Neutral
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Signal::Bearish => -1,
            Signal::Neutral => 0,
            Signal::Bullish => 1,
        }
    }
}

impl From<Trend> for Signal {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Bullish => Signal::Bullish,
            Trend::Bearish => Signal::Bearish,
        }
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Bearish),
            0 => Ok(Signal::Neutral),
            1 => Ok(Signal::Bullish),
            other => Err(format!("signal must be -1, 0 or 1, got {other}")),
        }
    }
}

/// Unrounded indicator outputs at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValues {
    pub price: f64,
    pub ema: f64,
    pub rsi: Option<f64>,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub supertrend_upper: Option<f64>,
    pub supertrend_lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeAnalysis {
    /// Vote sum times 25, in [-100, 100].
    pub score: i32,
    /// `min(ADX / 50, 1)`, two decimals.
    pub confidence: f64,
    /// ADX / 100, two decimals.
    pub adx: f64,
    pub ema: Signal,
    pub rsi: Signal,
    pub macd: Signal,
    /// Neutral only while the Supertrend is warming up.
    pub supertrend: Signal,
    pub strong_trend: bool,
    pub raw_values: RawValues,
}

impl TimeframeAnalysis {
    pub fn signals(&self) -> [Signal; 4] {
        [self.ema, self.rsi, self.macd, self.supertrend]
    }
}

/// A [`TimeframeAnalysis`] tagged with the identifier it was requested under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeResult {
    pub timeframe: String,
    #[serde(flatten)]
    pub analysis: TimeframeAnalysis,
}

fn latest<I: Indicator>(indicator: &I, ascending: &[Bar]) -> Option<I::Output> {
    indicator.compute_ascending(ascending).last().copied().flatten()
}

fn latest_or_missing<I: Indicator>(indicator: &I, ascending: &[Bar]) -> Result<I::Output, AnalysisError> {
    latest(indicator, ascending).ok_or_else(|| AnalysisError::MissingValue {
        indicator: indicator.name().to_string(),
    })
}

/// Score one bar series.
///
/// `settings` must already be validated; the indicator constructors assert
/// on zero periods.
pub fn analyze_timeframe(
    series: &BarSeries,
    settings: &IndicatorSettings,
) -> Result<TimeframeAnalysis, AnalysisError> {
    let required = settings.min_bars();
    if series.len() < required {
        return Err(AnalysisError::InsufficientData {
            required,
            available: series.len(),
        });
    }

    let bars = series.to_ascending();
    let price = series.latest().close;

    let ema = latest_or_missing(&Ema::new(settings.ema_length), &bars)?;
    let macd = latest_or_missing(
        &Macd::new(settings.macd_fast, settings.macd_slow, settings.macd_signal),
        &bars,
    )?;
    let rsi = latest(&Rsi::new(settings.rsi_length), &bars);
    let adx = latest(&Adx::new(settings.adx_length), &bars);
    let supertrend = latest(
        &Supertrend::new(settings.supertrend_period, settings.supertrend_multiplier),
        &bars,
    );

    let ema_signal = Signal::from_sign(price - ema);
    let rsi_signal = rsi.map_or(Signal::Neutral, Signal::from_rsi);
    let macd_signal = Signal::from_sign(macd.histogram);
    let supertrend_signal = supertrend.map_or(Signal::Neutral, |p| p.trend.into());
    let adx_value = adx.map_or(0.0, |p| p.adx);

    let votes: i32 = [ema_signal, rsi_signal, macd_signal, supertrend_signal]
        .iter()
        .map(|s| i32::from(s.value()))
        .sum();

    Ok(TimeframeAnalysis {
        score: votes * VOTE_WEIGHT,
        confidence: round_to((adx_value / ADX_FULL_CONFIDENCE).min(1.0), 2),
        adx: round_to(adx_value / 100.0, 2),
        ema: ema_signal,
        rsi: rsi_signal,
        macd: macd_signal,
        supertrend: supertrend_signal,
        strong_trend: adx_value > settings.adx_threshold,
        raw_values: RawValues {
            price,
            ema,
            rsi,
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            adx: adx.map(|p| p.adx),
            plus_di: adx.and_then(|p| p.plus_di),
            minus_di: adx.and_then(|p| p.minus_di),
            supertrend_upper: supertrend.map(|p| p.upper_band),
            supertrend_lower: supertrend.map(|p| p.lower_band),
        },
    })
}
