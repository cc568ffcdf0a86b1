//! Bar fixtures shared by the integration tests.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use trendmatrix_core::domain::{Bar, BarSeries};

/// Oldest-first daily bars from closes: open = previous close,
/// high/low one point outside the body.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> BarSeries {
    BarSeries::from_unordered(bars_from_closes(closes)).unwrap()
}

/// `n` closes rising in equal steps from `start` to `end`.
pub fn linear_closes(n: usize, start: f64, end: f64) -> Vec<f64> {
    let step = (end - start) / (n as f64 - 1.0);
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Deterministic pseudo-random walk, oldest-first.
pub fn random_walk(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64)
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let change = ((seed >> 33) % 200) as f64 * 0.05 - 5.0;
            price = (price + change).max(10.0);

            let open = price - 0.5;
            let close = price + 0.3;
            Bar {
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 2.0,
                low: open.min(close) - 2.0,
                close,
                volume: 1000.0 + i as f64 * 100.0,
            }
        })
        .collect()
}

pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, epsilon={epsilon}"
    );
}
