//! Indicator library.
//!
//! Indicators are pure functions: bar history in, one value per bar out.
//! The math runs oldest-first; [`Indicator::compute`] takes the newest-first
//! [`BarSeries`] the rest of the engine uses, reverses on the way in and on
//! the way out, and returns a series aligned with its input. Entries that
//! fall inside an indicator's warm-up window are `None`.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod supertrend;
pub mod wilder;

pub use adx::{Adx, AdxPoint};
pub use atr::{true_range, Atr};
pub use ema::{ema_of_series, Ema};
pub use macd::{Macd, MacdPoint};
pub use rsi::Rsi;
pub use supertrend::{Supertrend, SupertrendPoint, Trend};
pub use wilder::wilder_smooth;

use crate::domain::{Bar, BarSeries};

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    type Output: Copy;

    /// Human-readable name (e.g., "ema_50", "adx_14").
    fn name(&self) -> &str;

    /// Fewest bars for which the indicator yields any value. Shorter inputs
    /// produce an all-`None` series.
    fn min_bars(&self) -> usize;

    /// Compute over bars sorted oldest-first. Same length as `bars`.
    fn compute_ascending(&self, bars: &[Bar]) -> Vec<Option<Self::Output>>;

    /// Compute over a newest-first series. Same length and order as `series`.
    fn compute(&self, series: &BarSeries) -> Vec<Option<Self::Output>> {
        let mut values = self.compute_ascending(&series.to_ascending());
        values.reverse();
        values
    }

    /// Value at the most recent bar.
    fn latest(&self, series: &BarSeries) -> Option<Self::Output> {
        self.compute_ascending(&series.to_ascending())
            .last()
            .copied()
            .flatten()
    }
}

/// `None` for the first `period - 1` slots, then `seed`, then `tail`.
pub(crate) fn seeded_series(
    period: usize,
    seed: f64,
    tail: impl Iterator<Item = Option<f64>>,
) -> Vec<Option<f64>> {
    std::iter::repeat(None)
        .take(period.saturating_sub(1))
        .chain(std::iter::once(Some(seed)))
        .chain(tail)
        .collect()
}

/// Create synthetic oldest-first bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Oldest-first OHLC tuples to bars, one day apart.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
