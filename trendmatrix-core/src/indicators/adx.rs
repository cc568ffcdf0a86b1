//! ADX: Average Directional Index.
//!
//! Steps:
//! 1. Compute TR, +DM and -DM from consecutive bars
//! 2. Smooth TR, +DM and -DM with Wilder smoothing
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI), 0 when the sum is 0
//! 5. ADX = EMA(period) of DX, warm-up gaps fed in as 0
//!
//! Needs at least 2 * period bars.

use super::atr::true_range;
use super::ema::ema_of_series;
use super::wilder::wilder_smooth;
use super::Indicator;
use crate::domain::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxPoint {
    pub adx: f64,
    /// Missing where the smoothed true range is zero.
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Default for Adx {
    fn default() -> Self {
        Self::new(14)
    }
}

/// +DM and -DM series. Index 0 is `None` (no previous bar).
///
/// +DM = up-move when it exceeds the down-move and is positive, else 0.
/// -DM is symmetric on the lows.
pub fn directional_movement(bars: &[Bar]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    std::iter::once((None, None))
        .chain(bars.windows(2).map(|w| {
            let (prev, bar) = (&w[0], &w[1]);
            let up = bar.high - prev.high;
            let down = prev.low - bar.low;
            let plus = if up > down && up > 0.0 { up } else { 0.0 };
            let minus = if down > up && down > 0.0 { down } else { 0.0 };
            (Some(plus), Some(minus))
        }))
        .take(bars.len())
        .unzip()
}

impl Indicator for Adx {
    type Output = AdxPoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn min_bars(&self) -> usize {
        2 * self.period
    }

    fn compute_ascending(&self, bars: &[Bar]) -> Vec<Option<AdxPoint>> {
        let n = bars.len();
        if n < self.min_bars() {
            return vec![None; n];
        }

        let (plus_dm, minus_dm) = directional_movement(bars);
        let smooth_tr = wilder_smooth(&true_range(bars), self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let di: Vec<Option<(f64, f64)>> = (0..n)
            .map(|i| match (smooth_tr[i], smooth_plus[i], smooth_minus[i]) {
                (Some(tr), Some(plus), Some(minus)) if tr != 0.0 => {
                    Some((100.0 * plus / tr, 100.0 * minus / tr))
                }
                _ => None,
            })
            .collect();

        let dx: Vec<f64> = di
            .iter()
            .map(|d| match d {
                Some((plus, minus)) if plus + minus != 0.0 => {
                    100.0 * (plus - minus).abs() / (plus + minus)
                }
                _ => 0.0,
            })
            .collect();

        ema_of_series(&dx, self.period)
            .into_iter()
            .zip(di)
            .map(|(adx, di)| {
                adx.map(|adx| AdxPoint {
                    adx,
                    plus_di: di.map(|(plus, _)| plus),
                    minus_di: di.map(|(_, minus)| minus),
                })
            })
            .collect()
    }
}
