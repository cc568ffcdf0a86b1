//! Signal scoring: per-timeframe analysis and the cross-timeframe matrix.

pub mod aggregate;
pub mod matrix;
pub mod timeframe;

pub use aggregate::{AggregateResult, Alert, Bias, Grade, GradeLetter, GradeModifier};
pub use matrix::{MatrixError, MatrixResult, TrendMatrix};
pub use timeframe::{
    analyze_timeframe, AnalysisError, RawValues, Signal, TimeframeAnalysis, TimeframeResult,
};

/// Round to `decimals` places, halves away from zero.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round to the nearest integer, halves toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
