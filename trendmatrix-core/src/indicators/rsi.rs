//! Relative Strength Index (RSI).
//!
//! Seed: plain means of gains and losses over the first `period` deltas.
//! Then Wilder smoothing: avg = (avg * (period - 1) + new) / period.
//! RS = avg_gain / avg_loss, with RS = 100 when avg_loss is 0.
//! RSI = 100 - 100 / (1 + RS).

use super::Indicator;
use crate::domain::Bar;

/// Relative strength used when the average loss is zero.
pub const RS_NO_LOSS: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn min_bars(&self) -> usize {
        self.period + 1
    }

    fn compute_ascending(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = vec![None; n];

        if n < self.min_bars() {
            return result;
        }

        let p = self.period as f64;
        let deltas: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        let (gains, losses) = deltas[..self.period]
            .iter()
            .fold((0.0, 0.0), |(g, l), &d| if d > 0.0 { (g + d, l) } else { (g, l - d) });
        let mut avg_gain = gains / p;
        let mut avg_loss = losses / p;

        result[self.period] = Some(rsi_from_averages(avg_gain, avg_loss));

        for (i, &delta) in deltas.iter().enumerate().skip(self.period) {
            avg_gain = (avg_gain * (p - 1.0) + delta.max(0.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) + (-delta).max(0.0)) / p;
            result[i + 1] = Some(rsi_from_averages(avg_gain, avg_loss));
        }

        result
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = if avg_loss == 0.0 {
        RS_NO_LOSS
    } else {
        avg_gain / avg_loss
    };
    100.0 - 100.0 / (1.0 + rs)
}
