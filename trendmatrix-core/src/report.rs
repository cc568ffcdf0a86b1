//! JSON envelope for one matrix run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AggregateResult, Alert, MatrixResult, TimeframeResult};
use crate::domain::BarSeries;
use crate::settings::IndicatorSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMatrixReport {
    pub symbol: String,
    pub last_updated: DateTime<Utc>,
    /// Number of daily bars the matrix was computed from.
    pub data_points: usize,
    pub settings: IndicatorSettings,
    pub timeframes: Vec<TimeframeResult>,
    pub aggregate: AggregateResult,
    pub alert: Alert,
}

impl TrendMatrixReport {
    pub fn new(
        symbol: &str,
        daily: &BarSeries,
        settings: IndicatorSettings,
        result: MatrixResult,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let alert = result.aggregate.alert;
        Self {
            symbol: symbol.trim().to_uppercase(),
            last_updated,
            data_points: daily.len(),
            settings,
            timeframes: result.timeframes,
            aggregate: result.aggregate,
            alert,
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
