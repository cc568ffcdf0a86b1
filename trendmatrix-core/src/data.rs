//! Daily bar files: CSV or JSON in, validated newest-first series out.
//!
//! Records carry `date,open,high,low,close,volume` plus an optional
//! `timestamp` in epoch milliseconds, which wins over `date` when present.
//! `date` accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (UTC) or RFC 3339.
//!
//! Every timestamp is kept as a UTC instant, and the bar's trading day is its
//! UTC calendar date. Weekly candles close on the UTC Friday, so an RFC 3339
//! date with a negative offset late in the day (e.g. `T20:00:00-05:00` on a
//! Friday) belongs to Saturday. Write daily files as plain `YYYY-MM-DD` dates
//! or UTC instants to keep trading days intact.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{Bar, BarError, BarSeries};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record {index}: unparseable date '{value}'")]
    InvalidDate { index: usize, value: String },

    #[error("record {index}: timestamp {value} is out of range")]
    InvalidTimestamp { index: usize, value: i64 },

    #[error("invalid bar data: {0}")]
    InvalidBar(#[from] BarError),

    #[error("unsupported bar file '{0}' (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
}

/// One bar as it appears in a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    pub date: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl BarRecord {
    fn into_bar(self, index: usize) -> Result<Bar, DataError> {
        let timestamp = match self.timestamp {
            Some(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or(DataError::InvalidTimestamp { index, value: ms })?,
            None => parse_date(&self.date).ok_or_else(|| DataError::InvalidDate {
                index,
                value: self.date.clone(),
            })?,
        };
        Ok(Bar {
            timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

impl From<&Bar> for BarRecord {
    fn from(bar: &Bar) -> Self {
        Self {
            date: bar.timestamp.to_rfc3339(),
            timestamp: Some(bar.timestamp_millis()),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Validate records into a newest-first series, whatever order they came in.
pub fn bars_from_records(records: Vec<BarRecord>) -> Result<BarSeries, DataError> {
    let bars = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_bar(i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BarSeries::from_unordered(bars)?)
}

pub fn read_csv<R: Read>(reader: R) -> Result<BarSeries, DataError> {
    let records = csv::Reader::from_reader(reader)
        .deserialize::<BarRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    bars_from_records(records)
}

pub fn read_json<R: Read>(reader: R) -> Result<BarSeries, DataError> {
    let records: Vec<BarRecord> = serde_json::from_reader(reader)?;
    bars_from_records(records)
}

/// Load a bar file, picking the format from its extension.
pub fn load_bars(path: &Path) -> Result<BarSeries, DataError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let open = || {
        File::open(path)
            .map(BufReader::new)
            .map_err(|source| DataError::Io {
                path: path.to_path_buf(),
                source,
            })
    };

    let series = match extension.as_deref() {
        Some("csv") => read_csv(open()?)?,
        Some("json") => read_json(open()?)?,
        _ => return Err(DataError::UnsupportedFormat(path.to_path_buf())),
    };
    tracing::debug!(path = %path.display(), bars = series.len(), "loaded bars");
    Ok(series)
}

/// Write a series as CSV, newest first.
pub fn write_csv<W: Write>(series: &BarSeries, writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in series {
        wtr.serialize(BarRecord::from(bar))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const CSV: &str = "\
date,open,high,low,close,volume
2024-03-04,100,102,99,101,1000
2024-03-06,102,104,101,103,1200
2024-03-05,101,103,100,102,1100
";

    #[test]
    fn offset_dates_use_the_utc_trading_day() {
        use crate::resample::resample_weekly;
        use chrono::Weekday;

        // Friday 20:00 in UTC-5 is Saturday 01:00 UTC.
        let late_friday = parse_date("2024-03-08T20:00:00-05:00").unwrap();
        assert_eq!(late_friday.weekday(), Weekday::Sat);

        let csv = "\
date,open,high,low,close,volume
2024-03-07,100,102,99,101,1000
2024-03-08T20:00:00-05:00,101,103,100,102,1000
2024-03-11,102,104,101,103,1000
";
        let weekly = resample_weekly(&read_csv(csv.as_bytes()).unwrap());
        // No UTC Friday, so all three days roll into one trailing candle.
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly.latest().volume, 3000.0);

        let plain = "\
date,open,high,low,close,volume
2024-03-07,100,102,99,101,1000
2024-03-08,101,103,100,102,1000
2024-03-11,102,104,101,103,1000
";
        assert_eq!(resample_weekly(&read_csv(plain.as_bytes()).unwrap()).len(), 2);
    }

    #[test]
    fn parse_date_formats() {
        let d = parse_date("2024-03-04").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 3, 4));
        assert_eq!(d.timestamp() % 86_400, 0);

        let rfc = parse_date("2024-03-04T15:30:00-05:00").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 3, 4, 20, 30, 0).unwrap());

        let spaced = parse_date("2024-03-04 09:30:00").unwrap();
        assert_eq!(spaced, Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap());

        assert!(parse_date("03/04/2024").is_none());
    }

    #[test]
    fn read_csv_sorts_newest_first() {
        let series = read_csv(CSV.as_bytes()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.latest().close, 103.0);
        assert_eq!(series.as_slice()[2].close, 101.0);
    }

    #[test]
    fn timestamp_column_wins_over_date() {
        let csv = "date,timestamp,open,high,low,close,volume\n\
                   ignored,1709510400000,100,102,99,101,1000\n";
        let series = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            series.latest().timestamp,
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn read_json_records() {
        let json = r#"[
            {"date": "2024-03-05", "open": 1, "high": 2, "low": 0.5, "close": 1.5, "volume": 10},
            {"date": "2024-03-04", "open": 1, "high": 2, "low": 0.5, "close": 1.2, "volume": 10}
        ]"#;
        let series = read_json(json.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().close, 1.5);
    }

    #[test]
    fn invalid_records_fail_fast() {
        let bad_date = "date,open,high,low,close,volume\nyesterday,1,2,0.5,1.5,10\n";
        assert!(matches!(
            read_csv(bad_date.as_bytes()),
            Err(DataError::InvalidDate { index: 0, .. })
        ));

        let inverted = "date,open,high,low,close,volume\n2024-03-04,1,0.5,2,1.5,10\n";
        assert!(matches!(
            read_csv(inverted.as_bytes()),
            Err(DataError::InvalidBar(_))
        ));

        let duplicate = "date,open,high,low,close,volume\n\
                         2024-03-04,1,2,0.5,1.5,10\n\
                         2024-03-04,1,2,0.5,1.5,10\n";
        assert!(matches!(
            read_csv(duplicate.as_bytes()),
            Err(DataError::InvalidBar(BarError::DuplicateTimestamp(_)))
        ));

        let empty = "date,open,high,low,close,volume\n";
        assert!(matches!(
            read_csv(empty.as_bytes()),
            Err(DataError::InvalidBar(BarError::EmptySeries))
        ));
    }

    #[test]
    fn load_bars_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spy.CSV");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(CSV.as_bytes())
            .unwrap();
        assert_eq!(load_bars(&path).unwrap().len(), 3);

        let txt = dir.path().join("spy.txt");
        std::fs::write(&txt, CSV).unwrap();
        assert!(matches!(load_bars(&txt), Err(DataError::UnsupportedFormat(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_bars(&missing), Err(DataError::Io { .. })));
    }

    #[test]
    fn write_csv_reads_back() {
        let series = read_csv(CSV.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_csv(&series, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("date,timestamp,open,high,low,close,volume\n"));
        assert_eq!(read_csv(text.as_bytes()).unwrap(), series);
    }
}
