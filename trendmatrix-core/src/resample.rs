//! Bar resampler: derive other timeframes from one newest-first daily series.
//!
//! - `1day` is the input unchanged.
//! - `1week` aggregates real daily bars into Friday-terminated candles.
//! - `4hours`, `1hour`, `15min` are synthetic: each day is split into evenly
//!   spaced sub-bars whose prices are jittered around the parent bar. There is
//!   no intraday data upstream, so these series only approximate intraday
//!   behavior, and they are reproducible only when the RNG is seeded.

use chrono::{Datelike, Duration, NaiveTime, Weekday};
use rand::Rng;

use crate::domain::{Bar, BarSeries, Timeframe};

/// How a daily bar is split into synthetic sub-bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subdivision {
    /// Sub-bars per day.
    pub pieces: u32,
    /// Open/close perturbation, as a fraction of the day's high-low range.
    pub jitter: f64,
    /// Maximum relative shrink applied to the day's high and low.
    pub scale: f64,
    /// Only the most recent `max_days` days are expanded.
    pub max_days: Option<usize>,
}

impl Subdivision {
    pub const FOUR_HOURS: Subdivision = Subdivision {
        pieces: 6,
        jitter: 0.10,
        scale: 0.05,
        max_days: None,
    };

    pub const ONE_HOUR: Subdivision = Subdivision {
        pieces: 24,
        jitter: 0.05,
        scale: 0.03,
        max_days: None,
    };

    pub const FIFTEEN_MINUTES: Subdivision = Subdivision {
        pieces: 96,
        jitter: 0.02,
        scale: 0.01,
        max_days: Some(5),
    };

    pub fn for_timeframe(timeframe: Timeframe) -> Option<Subdivision> {
        match timeframe {
            Timeframe::FourHours => Some(Self::FOUR_HOURS),
            Timeframe::OneHour => Some(Self::ONE_HOUR),
            Timeframe::FifteenMinutes => Some(Self::FIFTEEN_MINUTES),
            Timeframe::OneDay | Timeframe::OneWeek => None,
        }
    }

    fn step(&self) -> Duration {
        Duration::seconds(86_400 / i64::from(self.pieces))
    }
}

/// Resample a newest-first daily series to `timeframe`. Output is newest-first.
pub fn resample<R: Rng + ?Sized>(daily: &BarSeries, timeframe: Timeframe, rng: &mut R) -> BarSeries {
    match Subdivision::for_timeframe(timeframe) {
        Some(subdivision) => subdivide(daily, &subdivision, rng),
        None if timeframe == Timeframe::OneWeek => resample_weekly(daily),
        None => daily.clone(),
    }
}

/// Aggregate daily bars into weekly candles.
///
/// Runs oldest-first, carrying one open candle: open of its first day, max
/// high, min low, close and timestamp of its latest day, summed volume. The
/// candle is emitted on a Friday or when the input runs out, so a trailing
/// partial week is kept. A week with no Friday bar rolls into the next one.
pub fn resample_weekly(daily: &BarSeries) -> BarSeries {
    let ascending = daily.to_ascending();
    let last = ascending.len().saturating_sub(1);

    let (mut weeks, _) = ascending.iter().enumerate().fold(
        (Vec::new(), None::<Bar>),
        |(mut weeks, open_week), (i, day)| {
            let week = match open_week {
                None => *day,
                Some(week) => Bar {
                    timestamp: day.timestamp,
                    open: week.open,
                    high: week.high.max(day.high),
                    low: week.low.min(day.low),
                    close: day.close,
                    volume: week.volume + day.volume,
                },
            };
            if day.date().weekday() == Weekday::Fri || i == last {
                weeks.push(week);
                (weeks, None)
            } else {
                (weeks, Some(week))
            }
        },
    );

    weeks.reverse();
    BarSeries::from_sorted(weeks)
}

/// Split each daily bar into `subdivision.pieces` synthetic sub-bars.
///
/// Sub-bar k of a day starts at that day's UTC midnight + k * (24h / pieces).
/// Volume is split evenly. Open and close are perturbed by up to
/// ±range * jitter / 2; high and low shrink by up to `scale`, then widen as
/// needed so that `low <= {open, close} <= high` still holds.
pub fn subdivide<R: Rng + ?Sized>(
    daily: &BarSeries,
    subdivision: &Subdivision,
    rng: &mut R,
) -> BarSeries {
    let days = match subdivision.max_days {
        Some(n) => daily.most_recent(n),
        None => daily.as_slice(),
    };
    let step = subdivision.step();

    let mut bars = Vec::with_capacity(days.len() * subdivision.pieces as usize);
    for day in days {
        let midnight = day.date().and_time(NaiveTime::MIN).and_utc();
        for k in (0..subdivision.pieces).rev() {
            let timestamp = midnight + step * k as i32;
            bars.push(synthetic_bar(day, timestamp, subdivision, rng));
        }
    }

    // Two input bars on the same calendar date would produce colliding slots.
    bars.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    bars.dedup_by_key(|b| b.timestamp);

    BarSeries::from_sorted(bars)
}

fn synthetic_bar<R: Rng + ?Sized>(
    day: &Bar,
    timestamp: chrono::DateTime<chrono::Utc>,
    subdivision: &Subdivision,
    rng: &mut R,
) -> Bar {
    let range = day.range();
    let open = day.open + (rng.gen::<f64>() - 0.5) * range * subdivision.jitter;
    let high = day.high * (1.0 - subdivision.scale + rng.gen::<f64>() * subdivision.scale);
    let low = day.low * (1.0 - rng.gen::<f64>() * subdivision.scale);
    let close = day.close + (rng.gen::<f64>() - 0.5) * range * subdivision.jitter;

    Bar {
        timestamp,
        open,
        high: high.max(open).max(close),
        low: low.min(open).min(close),
        close,
        volume: day.volume / f64::from(subdivision.pieces),
    }
}
