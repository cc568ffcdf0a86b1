//! Nominal bar granularities the matrix can be evaluated over.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    FifteenMinutes,
    OneHour,
    FourHours,
    OneDay,
    OneWeek,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeframeError {
    #[error("unsupported timeframe '{0}' (expected one of 15min, 1hour, 4hours, 1day, 1week)")]
    Unsupported(String),
}

impl Timeframe {
    /// Timeframes analyzed when the caller does not ask for specific ones.
    pub const DEFAULT_SET: [Timeframe; 5] = [
        Timeframe::FifteenMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
    ];

    /// Canonical identifier.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::FifteenMinutes => "15min",
            Timeframe::OneHour => "1hour",
            Timeframe::FourHours => "4hours",
            Timeframe::OneDay => "1day",
            Timeframe::OneWeek => "1week",
        }
    }

    /// True for the timeframes synthesized by subdividing daily bars.
    pub fn is_sub_daily(&self) -> bool {
        matches!(
            self,
            Timeframe::FifteenMinutes | Timeframe::OneHour | Timeframe::FourHours
        )
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "15min" | "15m" => Ok(Timeframe::FifteenMinutes),
            "1hour" | "1h" => Ok(Timeframe::OneHour),
            "4hours" | "4h" => Ok(Timeframe::FourHours),
            "1day" | "1d" => Ok(Timeframe::OneDay),
            "1week" | "1w" => Ok(Timeframe::OneWeek),
            _ => Err(TimeframeError::Unsupported(s.trim().to_string())),
        }
    }
}

/// Split a comma-separated identifier list, trimming entries and dropping
/// empty ones. Identifiers are kept as written; parsing happens later.
pub fn split_timeframe_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical labels of [`Timeframe::DEFAULT_SET`].
pub fn default_timeframe_labels() -> Vec<String> {
    Timeframe::DEFAULT_SET
        .iter()
        .map(|tf| tf.label().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_aliases_case_insensitively() {
        let cases = [
            ("15min", Timeframe::FifteenMinutes),
            ("15M", Timeframe::FifteenMinutes),
            ("1Hour", Timeframe::OneHour),
            ("1h", Timeframe::OneHour),
            ("4HOURS", Timeframe::FourHours),
            ("4h", Timeframe::FourHours),
            ("1day", Timeframe::OneDay),
            ("1D", Timeframe::OneDay),
            ("1week", Timeframe::OneWeek),
            (" 1w ", Timeframe::OneWeek),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<Timeframe>().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn rejects_unknown() {
        assert_eq!(
            "2h".parse::<Timeframe>(),
            Err(TimeframeError::Unsupported("2h".into()))
        );
    }

    #[test]
    fn labels_round_trip() {
        for tf in Timeframe::DEFAULT_SET {
            assert_eq!(tf.label().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn split_list_trims_and_skips_empty() {
        assert_eq!(
            split_timeframe_list(" 1h, 1day ,,1w"),
            vec!["1h".to_string(), "1day".into(), "1w".into()]
        );
    }

    #[test]
    fn sub_daily_classification() {
        assert!(Timeframe::FourHours.is_sub_daily());
        assert!(!Timeframe::OneDay.is_sub_daily());
        assert!(!Timeframe::OneWeek.is_sub_daily());
    }
}
