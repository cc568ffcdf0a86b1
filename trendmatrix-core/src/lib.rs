//! TrendMatrix core: multi-timeframe trend bias engine.
//!
//! This crate contains the whole analysis pipeline:
//! - Domain types (bars, newest-first bar series, timeframes)
//! - Indicator library (EMA, RSI, MACD, ADX, Supertrend) over a shared Wilder smoother
//! - Resampler deriving weekly and synthetic sub-daily series from daily bars
//! - Timeframe analyzer voting each indicator into a score and confidence
//! - Matrix aggregator producing the aggregate score, bias, grade and alert
//! - Settings, bar file loading and the JSON report envelope

pub mod analysis;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod report;
pub mod resample;
pub mod rng;
pub mod settings;

pub use analysis::{
    AggregateResult, Alert, Bias, Grade, MatrixError, MatrixResult, Signal, TimeframeAnalysis,
    TimeframeResult, TrendMatrix,
};
pub use domain::{Bar, BarError, BarSeries, Timeframe};
pub use report::TrendMatrixReport;
pub use rng::JitterSource;
pub use settings::{IndicatorSettings, MatrixConfig};
