//! Wilder smoothing.
//!
//! Seed: at index period-1, the plain mean of the first `period` inputs, with
//! missing inputs counted as 0 (leading warm-up gaps only; not gap handling).
//! Then: smoothed[i] = (smoothed[i-1] * (period - 1) + value[i]) / period.
//!
//! Shared by ADX (TR, +DM, -DM) and Supertrend (ATR).

use super::seeded_series;

/// Apply Wilder smoothing to an oldest-first series.
///
/// A missing input after the seed yields `None` at that index and leaves the
/// running value untouched.
pub fn wilder_smooth(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if period == 0 || n < period {
        return vec![None; n];
    }

    let p = period as f64;
    let seed = values[..period].iter().map(|v| v.unwrap_or(0.0)).sum::<f64>() / p;

    let tail = values[period..].iter().scan(seed, move |prev, value| {
        Some(value.map(|v| {
            *prev = (*prev * (p - 1.0) + v) / p;
            *prev
        }))
    });

    seeded_series(period, seed, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn seed_is_mean_of_first_period() {
        let out = wilder_smooth(&[Some(2.0), Some(4.0), Some(6.0), Some(8.0)], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_approx(out[2].unwrap(), 4.0, DEFAULT_EPSILON);
        // (4 * 2 + 8) / 3
        assert_approx(out[3].unwrap(), 16.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_gap_counts_as_zero_in_seed() {
        // True-range style input: nothing at index 0.
        let out = wilder_smooth(&[None, Some(9.0), Some(3.0), Some(6.0)], 3);
        assert_approx(out[2].unwrap(), 4.0, DEFAULT_EPSILON);
        assert_approx(out[3].unwrap(), (4.0 * 2.0 + 6.0) / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn gap_after_seed_skips_without_resetting() {
        let out = wilder_smooth(&[Some(3.0), Some(3.0), None, Some(6.0)], 2);
        assert_approx(out[1].unwrap(), 3.0, DEFAULT_EPSILON);
        assert_eq!(out[2], None);
        assert_approx(out[3].unwrap(), 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn too_short_is_all_none() {
        let out = wilder_smooth(&[Some(1.0), Some(2.0)], 3);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn constant_input_stays_constant() {
        let values = vec![Some(7.5); 20];
        let out = wilder_smooth(&values, 5);
        for v in out.iter().skip(4) {
            assert_approx(v.unwrap(), 7.5, DEFAULT_EPSILON);
        }
    }
}
