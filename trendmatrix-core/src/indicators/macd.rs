//! MACD: Moving Average Convergence/Divergence.
//!
//! macd      = EMA(fast) - EMA(slow), missing while either side is warming up
//! signal    = EMA(signal) of the macd line, warm-up gaps fed in as 0
//! histogram = macd - signal
//!
//! Needs at least `slow + signal` bars.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must exceed fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl Indicator for Macd {
    type Output = MacdPoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn min_bars(&self) -> usize {
        self.slow + self.signal
    }

    fn compute_ascending(&self, bars: &[Bar]) -> Vec<Option<MacdPoint>> {
        let n = bars.len();
        if n < self.min_bars() {
            return vec![None; n];
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);

        let macd_line: Vec<Option<f64>> = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();

        let padded: Vec<f64> = macd_line.iter().map(|v| v.unwrap_or(0.0)).collect();
        let signal_line = ema_of_series(&padded, self.signal);

        macd_line
            .iter()
            .zip(&signal_line)
            .map(|(m, s)| {
                let (macd, signal) = ((*m)?, (*s)?);
                Some(MacdPoint {
                    macd,
                    signal,
                    histogram: macd - signal,
                })
            })
            .collect()
    }
}
