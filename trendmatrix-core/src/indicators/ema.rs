//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = close[t] * m + EMA[t-1] * (1 - m), m = 2 / (period + 1)
//! Seed: EMA[period-1] = SMA of first `period` close values.

use super::{seeded_series, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn min_bars(&self) -> usize {
        self.period
    }

    fn compute_ascending(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.period)
    }
}

/// Compute EMA values from a pre-extracted oldest-first slice.
/// Used by composed indicators (MACD signal line, ADX) that smooth derived series.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if period == 0 || n < period {
        return vec![None; n];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let tail = values[period..].iter().scan(seed, move |prev, &v| {
        *prev = v * multiplier + *prev * (1.0 - multiplier);
        Some(Some(*prev))
    });

    seeded_series(period, seed, tail)
}
