//! The OHLCV bar and the newest-first series the engine consumes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single period.
///
/// Bars are created once by the data source (or derived by the resampler)
/// and never mutated afterwards. `volume` is fractional because synthetic
/// sub-daily bars split the parent day's volume evenly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Malformed bar data. Surfaced to the caller before any computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar at {timestamp}: {field} is not a finite number")]
    NonFinite {
        timestamp: DateTime<Utc>,
        field: &'static str,
    },

    #[error("bar at {timestamp}: low {low} is above high {high}")]
    InvertedRange {
        timestamp: DateTime<Utc>,
        low: f64,
        high: f64,
    },

    #[error("bar at {timestamp}: {field} {value} lies outside [{low}, {high}]")]
    OutsideRange {
        timestamp: DateTime<Utc>,
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("bar at {timestamp}: negative volume {volume}")]
    NegativeVolume {
        timestamp: DateTime<Utc>,
        volume: f64,
    },

    #[error("bar series is empty")]
    EmptySeries,

    #[error("duplicate bar timestamp {0}")]
    DuplicateTimestamp(DateTime<Utc>),

    #[error("bars are not newest-first at index {index}: {previous} is followed by {current}")]
    OutOfOrder {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

impl Bar {
    /// Calendar date of the bar (UTC).
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// High-low range of the bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Midpoint of the bar, `(high + low) / 2`.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Check the OHLCV invariants: finite prices, `low <= {open, close} <= high`,
    /// non-negative volume.
    pub fn validate(&self) -> Result<(), BarError> {
        let timestamp = self.timestamp;
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ] {
            if !value.is_finite() {
                return Err(BarError::NonFinite { timestamp, field });
            }
        }

        if self.low > self.high {
            return Err(BarError::InvertedRange {
                timestamp,
                low: self.low,
                high: self.high,
            });
        }

        for (field, value) in [("open", self.open), ("close", self.close)] {
            if value < self.low || value > self.high {
                return Err(BarError::OutsideRange {
                    timestamp,
                    field,
                    value,
                    low: self.low,
                    high: self.high,
                });
            }
        }

        if self.volume < 0.0 {
            return Err(BarError::NegativeVolume {
                timestamp,
                volume: self.volume,
            });
        }

        Ok(())
    }

    pub fn is_sane(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Ordered bar sequence, newest first, with strictly decreasing timestamps.
///
/// This is the external ordering convention. Recursive indicator math runs
/// oldest-first and goes through [`BarSeries::to_ascending`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from bars already sorted newest-first.
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarError> {
        if bars.is_empty() {
            return Err(BarError::EmptySeries);
        }
        for bar in &bars {
            bar.validate()?;
        }
        for (i, pair) in bars.windows(2).enumerate() {
            let (previous, current) = (pair[0].timestamp, pair[1].timestamp);
            if previous == current {
                return Err(BarError::DuplicateTimestamp(current));
            }
            if previous < current {
                return Err(BarError::OutOfOrder {
                    index: i + 1,
                    previous,
                    current,
                });
            }
        }
        Ok(Self { bars })
    }

    /// Sort arbitrary-order bars newest-first, then validate.
    pub fn from_unordered(mut bars: Vec<Bar>) -> Result<Self, BarError> {
        bars.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self::new(bars)
    }

    /// Wrap bars the resampler produced in newest-first order from a valid
    /// parent series.
    pub(crate) fn from_sorted(bars: Vec<Bar>) -> Self {
        debug_assert!(!bars.is_empty());
        debug_assert!(bars.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn latest(&self) -> &Bar {
        &self.bars[0]
    }

    /// Bars in newest-first order.
    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Copy of the bars in oldest-first order.
    pub fn to_ascending(&self) -> Vec<Bar> {
        self.bars.iter().rev().copied().collect()
    }

    /// First `n` bars (the `n` most recent).
    pub fn most_recent(&self, n: usize) -> &[Bar] {
        &self.bars[..n.min(self.bars.len())]
    }
}

impl TryFrom<Vec<Bar>> for BarSeries {
    type Error = BarError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<BarSeries> for Vec<Bar> {
    fn from(series: BarSeries) -> Self {
        series.bars
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
