//! Supertrend: ATR band-following trend state.
//!
//! Inherently sequential: each bar's bands and trend depend on the previous
//! bar's. Basic bands are hl2 ± multiplier * ATR. The final upper band only
//! moves down unless the previous close broke above it; the final lower band
//! only moves up unless the previous close broke below it.
//!
//! Trend starts Bullish at the first bar with an ATR value. Bullish flips to
//! Bearish when close <= lower band; Bearish flips to Bullish when
//! close >= upper band.

use super::atr::Atr;
use super::Indicator;
use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Binary trend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// +1 for Bullish, -1 for Bearish.
    pub fn signal(self) -> i8 {
        match self {
            Trend::Bullish => 1,
            Trend::Bearish => -1,
        }
    }
}

impl From<Trend> for i8 {
    fn from(trend: Trend) -> Self {
        trend.signal()
    }
}

impl TryFrom<i8> for Trend {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Trend::Bullish),
            -1 => Ok(Trend::Bearish),
            other => Err(format!("trend must be 1 or -1, got {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupertrendPoint {
    pub trend: Trend,
    pub upper_band: f64,
    pub lower_band: f64,
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Supertrend period must be >= 1");
        assert!(
            multiplier.is_finite() && multiplier > 0.0,
            "Supertrend multiplier must be positive"
        );
        Self {
            period,
            multiplier,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }

    fn step(&self, prev: Option<(SupertrendPoint, f64)>, bar: &Bar, atr: f64) -> SupertrendPoint {
        let basic_upper = bar.hl2() + self.multiplier * atr;
        let basic_lower = bar.hl2() - self.multiplier * atr;

        let Some((prev, prev_close)) = prev else {
            return SupertrendPoint {
                trend: Trend::Bullish,
                upper_band: basic_upper,
                lower_band: basic_lower,
            };
        };

        let upper_band = if basic_upper < prev.upper_band || prev_close > prev.upper_band {
            basic_upper
        } else {
            prev.upper_band
        };
        let lower_band = if basic_lower > prev.lower_band || prev_close < prev.lower_band {
            basic_lower
        } else {
            prev.lower_band
        };

        let trend = match prev.trend {
            Trend::Bullish if bar.close <= lower_band => Trend::Bearish,
            Trend::Bearish if bar.close >= upper_band => Trend::Bullish,
            unchanged => unchanged,
        };

        SupertrendPoint {
            trend,
            upper_band,
            lower_band,
        }
    }
}

impl Default for Supertrend {
    fn default() -> Self {
        Self::new(10, 3.0)
    }
}

impl Indicator for Supertrend {
    type Output = SupertrendPoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn min_bars(&self) -> usize {
        self.period
    }

    fn compute_ascending(&self, bars: &[Bar]) -> Vec<Option<SupertrendPoint>> {
        let n = bars.len();
        if n < self.min_bars() {
            return vec![None; n];
        }

        let atr = Atr::new(self.period).compute_ascending(bars);

        bars.iter()
            .zip(atr)
            .scan(None, |prev: &mut Option<(SupertrendPoint, f64)>, (bar, atr)| {
                let point = atr.map(|atr| self.step(*prev, bar, atr));
                if let Some(point) = point {
                    *prev = Some((point, bar.close));
                }
                Some(point)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn trending_bars(n: usize, start: f64, step: f64) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let base = start + i as f64 * step;
                (base, base + 3.0, base - 3.0, base + step.signum())
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn supertrend_uptrend_stays_bullish() {
        let bars = trending_bars(15, 100.0, 2.0);
        let result = Supertrend::new(3, 2.0).compute_ascending(&bars);

        for (i, point) in result.iter().enumerate().skip(2) {
            let p = point.unwrap();
            assert_eq!(p.trend, Trend::Bullish, "bar {i}");
            assert!(p.lower_band < bars[i].close);
        }
    }

    #[test]
    fn supertrend_downtrend_flips_bearish() {
        let bars = trending_bars(15, 200.0, -6.0);
        let result = Supertrend::new(3, 1.0).compute_ascending(&bars);

        assert_eq!(result[2].unwrap().trend, Trend::Bullish);
        assert_eq!(result[14].unwrap().trend, Trend::Bearish);
    }

    #[test]
    fn supertrend_zero_atr_collapses_bands_to_hl2() {
        let bars = make_ohlc_bars(&[(50.0, 50.0, 50.0, 50.0); 20]);
        let result = Supertrend::default().compute_ascending(&bars);
        assert!(result[..9].iter().all(Option::is_none));
        for p in result.iter().flatten() {
            assert!(p.upper_band.is_finite() && p.lower_band.is_finite());
            assert_eq!(p.upper_band, 50.0);
            assert_eq!(p.lower_band, 50.0);
        }
        assert!(result[19].is_some());
    }

    #[test]
    fn supertrend_first_computable_bar() {
        let bars = trending_bars(5, 100.0, 1.0);
        let result = Supertrend::new(3, 2.0).compute_ascending(&bars);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert_eq!(result[2].unwrap().trend, Trend::Bullish);
    }

    #[test]
    fn supertrend_upper_band_ratchets_down() {
        let bars = trending_bars(20, 200.0, -2.0);
        let result = Supertrend::new(3, 3.0).compute_ascending(&bars);
        for w in result.windows(2).skip(2) {
            let (prev, cur) = (w[0].unwrap(), w[1].unwrap());
            if cur.trend == Trend::Bearish && prev.trend == Trend::Bearish {
                assert!(cur.upper_band <= prev.upper_band);
            }
        }
    }

    #[test]
    fn supertrend_too_few_bars() {
        let bars = make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]);
        let result = Supertrend::new(3, 2.0).compute_ascending(&bars);
        assert_eq!(result, vec![None]);
    }

    #[test]
    fn trend_serializes_as_signal() {
        assert_eq!(serde_json::to_string(&Trend::Bearish).unwrap(), "-1");
        let t: Trend = serde_json::from_str("1").unwrap();
        assert_eq!(t, Trend::Bullish);
        assert!(serde_json::from_str::<Trend>("0").is_err());
    }
}
