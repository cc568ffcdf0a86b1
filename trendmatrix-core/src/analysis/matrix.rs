//! Trend matrix: resample the daily series per timeframe, analyze each one,
//! and fold the survivors into an aggregate.
//!
//! Timeframes are independent. Each gets its own RNG and its own arrays, so
//! they fan out over the rayon pool and fan back in, in request order, before
//! aggregation. A timeframe that cannot be analyzed is logged and left out;
//! it never aborts the others.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::aggregate::{AggregateResult, Alert};
use super::timeframe::{analyze_timeframe, AnalysisError, TimeframeResult};
use crate::domain::{Bar, BarError, BarSeries, Timeframe, TimeframeError};
use crate::resample::resample;
use crate::rng::JitterSource;
use crate::settings::{IndicatorSettings, MatrixConfig, SettingsError};

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("invalid indicator settings: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Timeframe(#[from] TimeframeError),

    #[error("invalid input bars: {0}")]
    InvalidInput(#[from] BarError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixResult {
    /// Valid timeframes only, in request order.
    pub timeframes: Vec<TimeframeResult>,
    pub aggregate: AggregateResult,
}

impl MatrixResult {
    pub fn alert(&self) -> &Alert {
        &self.aggregate.alert
    }
}

#[derive(Debug, Clone)]
pub struct TrendMatrix {
    settings: IndicatorSettings,
    jitter: JitterSource,
    strict_timeframes: bool,
    parallel: bool,
}

impl TrendMatrix {
    /// Validates `settings` up front. Defaults to entropy jitter, lenient
    /// timeframe parsing and parallel evaluation.
    pub fn new(settings: IndicatorSettings) -> Result<Self, MatrixError> {
        settings.validate()?;
        Ok(Self {
            settings,
            jitter: JitterSource::Entropy,
            strict_timeframes: false,
            parallel: true,
        })
    }

    pub fn from_config(config: &MatrixConfig) -> Result<Self, MatrixError> {
        Ok(Self::new(config.indicators)?
            .with_jitter(JitterSource::from_seed(config.seed))
            .with_strict_timeframes(config.strict_timeframes)
            .with_parallelism(config.parallel))
    }

    pub fn with_jitter(mut self, jitter: JitterSource) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_strict_timeframes(mut self, strict: bool) -> Self {
        self.strict_timeframes = strict;
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn jitter(&self) -> &JitterSource {
        &self.jitter
    }

    /// Map an identifier to the timeframe whose bars it is analyzed on.
    ///
    /// Unknown identifiers are an error in strict mode; otherwise they run on
    /// the daily series.
    pub fn resolve(&self, label: &str) -> Result<Timeframe, TimeframeError> {
        match label.parse::<Timeframe>() {
            Ok(timeframe) => Ok(timeframe),
            Err(err) if self.strict_timeframes => Err(err),
            Err(_) => {
                warn!(timeframe = label, "unknown timeframe, using daily bars");
                Ok(Timeframe::OneDay)
            }
        }
    }

    /// Resample and analyze a single timeframe.
    pub fn analyze_one(
        &self,
        symbol: &str,
        daily: &BarSeries,
        label: &str,
        timeframe: Timeframe,
    ) -> Result<TimeframeResult, AnalysisError> {
        let mut rng = self.jitter.rng_for(symbol, timeframe.label());
        let series = resample(daily, timeframe, &mut rng);
        let analysis = analyze_timeframe(&series, &self.settings)?;
        Ok(TimeframeResult {
            timeframe: label.to_string(),
            analysis,
        })
    }

    /// Run every requested timeframe and aggregate the valid ones.
    pub fn analyze<S>(
        &self,
        symbol: &str,
        daily: &BarSeries,
        timeframes: &[S],
    ) -> Result<MatrixResult, MatrixError>
    where
        S: AsRef<str> + Sync,
    {
        let requested: Vec<(&str, Timeframe)> = timeframes
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.resolve(label).map(|tf| (label, tf))
            })
            .collect::<Result<_, _>>()?;

        let evaluate = |&(label, timeframe): &(&str, Timeframe)| -> Option<TimeframeResult> {
            match self.analyze_one(symbol, daily, label, timeframe) {
                Ok(result) => Some(result),
                Err(AnalysisError::InsufficientData {
                    required,
                    available,
                }) => {
                    debug!(symbol, timeframe = label, required, available, "skipping timeframe");
                    None
                }
                Err(err) => {
                    warn!(symbol, timeframe = label, error = %err, "timeframe analysis failed");
                    None
                }
            }
        };

        let outcomes: Vec<Option<TimeframeResult>> = if self.parallel {
            requested.par_iter().map(evaluate).collect()
        } else {
            requested.iter().map(evaluate).collect()
        };
        let results: Vec<TimeframeResult> = outcomes.into_iter().flatten().collect();

        let aggregate = AggregateResult::from_results(&results);
        info!(
            symbol,
            requested = requested.len(),
            valid = results.len(),
            score = aggregate.score,
            confidence = aggregate.confidence,
            bias = %aggregate.bias,
            grade = %aggregate.grade,
            "trend matrix computed"
        );

        Ok(MatrixResult {
            timeframes: results,
            aggregate,
        })
    }

    /// Validate raw bars (any order) and analyze them.
    pub fn analyze_bars<S>(
        &self,
        symbol: &str,
        bars: Vec<Bar>,
        timeframes: &[S],
    ) -> Result<MatrixResult, MatrixError>
    where
        S: AsRef<str> + Sync,
    {
        let daily = BarSeries::from_unordered(bars)?;
        self.analyze(symbol, &daily, timeframes)
    }
}
