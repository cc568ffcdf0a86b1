//! Indicator settings and matrix configuration.
//!
//! Defaults are consolidated here and validated once, before any timeframe
//! is computed. Field names are camelCase on the wire (TOML, JSON, query
//! parameters) and snake_case in Rust.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::default_timeframe_labels;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} must be a positive integer")]
    ZeroPeriod { field: &'static str },

    #[error("macdFast ({fast}) must be smaller than macdSlow ({slow})")]
    MacdOrder { fast: usize, slow: usize },

    #[error("supertrendMultiplier must be a positive finite number, got {0}")]
    InvalidMultiplier(f64),

    #[error("adxThreshold must lie within 0..=100, got {0}")]
    InvalidThreshold(f64),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Periods and thresholds for every indicator the analyzer runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicatorSettings {
    pub ema_length: usize,
    pub rsi_length: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub adx_length: usize,
    /// Strong-trend cutoff on the raw 0–100 ADX scale.
    pub adx_threshold: f64,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ema_length: 50,
            rsi_length: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            adx_length: 14,
            adx_threshold: 25.0,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
        }
    }
}

impl IndicatorSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("emaLength", self.ema_length),
            ("rsiLength", self.rsi_length),
            ("macdFast", self.macd_fast),
            ("macdSlow", self.macd_slow),
            ("macdSignal", self.macd_signal),
            ("adxLength", self.adx_length),
            ("supertrendPeriod", self.supertrend_period),
        ] {
            if value == 0 {
                return Err(SettingsError::ZeroPeriod { field });
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(SettingsError::MacdOrder {
                fast: self.macd_fast,
                slow: self.macd_slow,
            });
        }
        if !(self.supertrend_multiplier.is_finite() && self.supertrend_multiplier > 0.0) {
            return Err(SettingsError::InvalidMultiplier(self.supertrend_multiplier));
        }
        if !(0.0..=100.0).contains(&self.adx_threshold) {
            return Err(SettingsError::InvalidThreshold(self.adx_threshold));
        }
        Ok(())
    }

    /// Fewest bars a timeframe needs to be scored: enough for the EMA and the
    /// MACD signal line. RSI, ADX and Supertrend may still be warming up.
    pub fn min_bars(&self) -> usize {
        self.ema_length.max(self.macd_slow + self.macd_signal)
    }

    /// Build settings from loosely typed key/value pairs, e.g. query parameters.
    ///
    /// Keys may be camelCase or snake_case. Missing, unparsable, zero or
    /// negative values fall back to the default for that field; unknown keys
    /// are ignored.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::default().with_params(params)
    }

    /// Overlay key/value pairs on these settings, with the same leniency as
    /// [`IndicatorSettings::from_params`]: unusable values keep the current field.
    pub fn with_params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = self;
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some(setting) = SettingKey::parse(key) else {
                tracing::debug!(key, "ignoring unknown setting");
                continue;
            };
            if !settings.apply(setting, value) {
                tracing::debug!(key, value, "ignoring unusable setting");
            }
        }
        settings
    }

    /// Set one field from its raw value. Returns false, leaving the field
    /// alone, when the value is not a positive number or truncates to a zero
    /// period.
    fn apply(&mut self, setting: SettingKey, value: &str) -> bool {
        let Some(parsed) = parse_positive(value) else {
            return false;
        };
        let period = parsed.trunc() as usize;
        let slot = match setting {
            SettingKey::AdxThreshold => {
                self.adx_threshold = parsed;
                return true;
            }
            SettingKey::SupertrendMultiplier => {
                self.supertrend_multiplier = parsed;
                return true;
            }
            SettingKey::EmaLength => &mut self.ema_length,
            SettingKey::RsiLength => &mut self.rsi_length,
            SettingKey::MacdFast => &mut self.macd_fast,
            SettingKey::MacdSlow => &mut self.macd_slow,
            SettingKey::MacdSignal => &mut self.macd_signal,
            SettingKey::AdxLength => &mut self.adx_length,
            SettingKey::SupertrendPeriod => &mut self.supertrend_period,
        };
        if period == 0 {
            return false;
        }
        *slot = period;
        true
    }
}

/// A recognized indicator setting, named in camelCase or snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    EmaLength,
    RsiLength,
    MacdFast,
    MacdSlow,
    MacdSignal,
    AdxLength,
    AdxThreshold,
    SupertrendPeriod,
    SupertrendMultiplier,
}

impl SettingKey {
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key.trim() {
            "emaLength" | "ema_length" => SettingKey::EmaLength,
            "rsiLength" | "rsi_length" => SettingKey::RsiLength,
            "macdFast" | "macd_fast" => SettingKey::MacdFast,
            "macdSlow" | "macd_slow" => SettingKey::MacdSlow,
            "macdSignal" | "macd_signal" => SettingKey::MacdSignal,
            "adxLength" | "adx_length" => SettingKey::AdxLength,
            "adxThreshold" | "adx_threshold" => SettingKey::AdxThreshold,
            "supertrendPeriod" | "supertrend_period" => SettingKey::SupertrendPeriod,
            "supertrendMultiplier" | "supertrend_multiplier" => SettingKey::SupertrendMultiplier,
            _ => return None,
        })
    }
}

fn parse_positive(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Everything needed to run the matrix besides the bars themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatrixConfig {
    /// Timeframe identifiers, kept as written.
    pub timeframes: Vec<String>,
    /// Master seed for the synthetic sub-daily jitter. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Reject unknown timeframe identifiers instead of falling back to daily bars.
    pub strict_timeframes: bool,
    /// Evaluate timeframes on the rayon pool.
    pub parallel: bool,
    pub indicators: IndicatorSettings,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            timeframes: default_timeframe_labels(),
            seed: None,
            strict_timeframes: false,
            parallel: true,
            indicators: IndicatorSettings::default(),
        }
    }
}

impl MatrixConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let config: Self = toml::from_str(content)?;
        config.indicators.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
