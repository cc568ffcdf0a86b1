//! Cross-timeframe fan-in: aggregate score, bias label, letter grade, alert.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::timeframe::TimeframeResult;
use super::{round_half_up, round_to};

/// A timeframe agrees with the trend when its score magnitude exceeds this.
pub const AGREEMENT_THRESHOLD: i32 = 25;
pub const ALERT_SCORE: i32 = 60;
pub const ALERT_CONFIDENCE: f64 = 0.7;

/// Directional label for an aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bias {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    #[serde(rename = "Strong Bearish")]
    StrongBearish,
}

impl Bias {
    /// Strict thresholds: 40 itself is Bullish, 20 itself is Neutral.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 40 => Bias::StrongBullish,
            s if s > 20 => Bias::Bullish,
            s if s < -40 => Bias::StrongBearish,
            s if s < -20 => Bias::Bearish,
            _ => Bias::Neutral,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bias::StrongBullish => "Strong Bullish",
            Bias::Bullish => "Bullish",
            Bias::Neutral => "Neutral",
            Bias::Bearish => "Bearish",
            Bias::StrongBearish => "Strong Bearish",
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GradeLetter {
    F,
    D,
    C,
    B,
    A,
}

impl GradeLetter {
    pub fn from_score(score: i32) -> Self {
        match score.abs() {
            s if s >= 80 => GradeLetter::A,
            s if s >= 60 => GradeLetter::B,
            s if s >= 40 => GradeLetter::C,
            s if s >= 20 => GradeLetter::D,
            _ => GradeLetter::F,
        }
    }

    fn as_char(self) -> char {
        match self {
            GradeLetter::A => 'A',
            GradeLetter::B => 'B',
            GradeLetter::C => 'C',
            GradeLetter::D => 'D',
            GradeLetter::F => 'F',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeModifier {
    Plus,
    Plain,
    Minus,
}

/// Letter grade such as `"B+"`, serialized as its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Grade {
    pub letter: GradeLetter,
    pub modifier: GradeModifier,
}

impl Grade {
    /// Letter from `|score|`, refined by confidence. Confidence below 0.45
    /// fails the grade outright.
    pub fn from_score(score: i32, confidence: f64) -> Self {
        let letter = GradeLetter::from_score(score);
        let (letter, modifier) = if confidence >= 0.85 {
            (letter, GradeModifier::Plus)
        } else if confidence >= 0.65 {
            (letter, GradeModifier::Plain)
        } else if confidence >= 0.45 {
            (letter, GradeModifier::Minus)
        } else {
            (GradeLetter::F, GradeModifier::Plain)
        };
        Self { letter, modifier }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        match self.modifier {
            GradeModifier::Plus => f.write_str("+"),
            GradeModifier::Minus => f.write_str("-"),
            GradeModifier::Plain => Ok(()),
        }
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = match chars.next() {
            Some('A') => GradeLetter::A,
            Some('B') => GradeLetter::B,
            Some('C') => GradeLetter::C,
            Some('D') => GradeLetter::D,
            Some('F') => GradeLetter::F,
            _ => return Err(format!("invalid grade '{s}'")),
        };
        let modifier = match chars.as_str() {
            "+" => GradeModifier::Plus,
            "" => GradeModifier::Plain,
            "-" => GradeModifier::Minus,
            _ => return Err(format!("invalid grade '{s}'")),
        };
        Ok(Self { letter, modifier })
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.to_string()
    }
}

impl TryFrom<String> for Grade {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Alert {
    pub triggered: bool,
    /// Set whenever the score is past the alert level, even if confidence
    /// keeps the alert from triggering.
    #[serde(rename = "type")]
    pub kind: Option<Bias>,
}

impl Alert {
    pub fn evaluate(score: i32, confidence: f64) -> Self {
        let kind = if score > ALERT_SCORE {
            Some(Bias::StrongBullish)
        } else if score < -ALERT_SCORE {
            Some(Bias::StrongBearish)
        } else {
            None
        };
        Self {
            triggered: score.abs() > ALERT_SCORE && confidence > ALERT_CONFIDENCE,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub score: i32,
    pub confidence: f64,
    pub bias: Bias,
    pub grade: Grade,
    pub timeframes_in_agreement: Vec<String>,
    /// Reported at the top level of the report envelope.
    #[serde(skip)]
    pub alert: Alert,
}

impl AggregateResult {
    /// Derive labels from an already-aggregated score and confidence.
    pub fn summarize(score: i32, confidence: f64, timeframes_in_agreement: Vec<String>) -> Self {
        Self {
            score,
            confidence,
            bias: Bias::from_score(score),
            grade: Grade::from_score(score, confidence),
            timeframes_in_agreement,
            alert: Alert::evaluate(score, confidence),
        }
    }

    /// Fold the valid per-timeframe results. No results gives score 0 and
    /// confidence 0.
    pub fn from_results(results: &[TimeframeResult]) -> Self {
        let agreement = results
            .iter()
            .filter(|r| r.analysis.score.abs() > AGREEMENT_THRESHOLD)
            .map(|r| r.timeframe.clone())
            .collect();

        if results.is_empty() {
            return Self::summarize(0, 0.0, agreement);
        }

        let count = results.len() as f64;
        let (score_sum, confidence_sum) = results.iter().fold((0i64, 0.0), |(s, c), r| {
            (s + i64::from(r.analysis.score), c + r.analysis.confidence)
        });

        Self::summarize(
            round_half_up(score_sum as f64 / count),
            round_to(confidence_sum / count, 2),
            agreement,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::timeframe::{RawValues, Signal, TimeframeAnalysis};

    fn result(timeframe: &str, score: i32, confidence: f64) -> TimeframeResult {
        TimeframeResult {
            timeframe: timeframe.into(),
            analysis: TimeframeAnalysis {
                score,
                confidence,
                adx: confidence / 2.0,
                ema: Signal::Neutral,
                rsi: Signal::Neutral,
                macd: Signal::Neutral,
                supertrend: Signal::Bullish,
                strong_trend: false,
                raw_values: RawValues {
                    price: 100.0,
                    ema: 100.0,
                    rsi: Some(50.0),
                    macd: 0.0,
                    macd_signal: 0.0,
                    macd_histogram: 0.0,
                    adx: Some(confidence * 50.0),
                    plus_di: None,
                    minus_di: None,
                    supertrend_upper: Some(110.0),
                    supertrend_lower: Some(90.0),
                },
            },
        }
    }

    #[test]
    fn bias_thresholds_are_strict() {
        assert_eq!(Bias::from_score(41), Bias::StrongBullish);
        assert_eq!(Bias::from_score(40), Bias::Bullish);
        assert_eq!(Bias::from_score(21), Bias::Bullish);
        assert_eq!(Bias::from_score(20), Bias::Neutral);
        assert_eq!(Bias::from_score(0), Bias::Neutral);
        assert_eq!(Bias::from_score(-20), Bias::Neutral);
        assert_eq!(Bias::from_score(-21), Bias::Bearish);
        assert_eq!(Bias::from_score(-40), Bias::Bearish);
        assert_eq!(Bias::from_score(-41), Bias::StrongBearish);
    }

    #[test]
    fn grade_letters_by_bucket() {
        assert_eq!(Grade::from_score(80, 0.7).to_string(), "A");
        assert_eq!(Grade::from_score(-79, 0.7).to_string(), "B");
        assert_eq!(Grade::from_score(40, 0.9).to_string(), "C+");
        assert_eq!(Grade::from_score(20, 0.5).to_string(), "D-");
        assert_eq!(Grade::from_score(19, 0.9).to_string(), "F+");
    }

    #[test]
    fn low_confidence_fails_grade() {
        assert_eq!(Grade::from_score(100, 0.44).to_string(), "F");
        assert_eq!(Grade::from_score(30, 0.40).to_string(), "F");
    }

    #[test]
    fn grade_confidence_boundaries() {
        assert_eq!(Grade::from_score(90, 0.85).modifier, GradeModifier::Plus);
        assert_eq!(Grade::from_score(90, 0.65).modifier, GradeModifier::Plain);
        assert_eq!(Grade::from_score(90, 0.45).modifier, GradeModifier::Minus);
    }

    #[test]
    fn grade_string_round_trip() {
        for s in ["A+", "B", "C-", "F"] {
            assert_eq!(s.parse::<Grade>().unwrap().to_string(), s);
        }
        assert!("E".parse::<Grade>().is_err());
        assert!("A++".parse::<Grade>().is_err());
    }

    #[test]
    fn alert_requires_score_and_confidence() {
        assert_eq!(
            Alert::evaluate(72, 0.88),
            Alert {
                triggered: true,
                kind: Some(Bias::StrongBullish)
            }
        );
        assert_eq!(
            Alert::evaluate(-61, 0.71),
            Alert {
                triggered: true,
                kind: Some(Bias::StrongBearish)
            }
        );
        let quiet = Alert::evaluate(61, 0.7);
        assert!(!quiet.triggered);
        assert_eq!(quiet.kind, Some(Bias::StrongBullish));
        assert_eq!(Alert::evaluate(60, 0.99), Alert::default());
    }

    #[test]
    fn from_results_averages_and_rounds() {
        let results = [
            result("1day", 100, 1.0),
            result("1week", 50, 0.8),
            result("4hours", -25, 0.35),
        ];
        let aggregate = AggregateResult::from_results(&results);
        // 125 / 3 = 41.67; 2.15 / 3 = 0.7167
        assert_eq!(aggregate.score, 42);
        assert_eq!(aggregate.confidence, 0.72);
        assert_eq!(aggregate.bias, Bias::StrongBullish);
        assert_eq!(aggregate.grade.to_string(), "C");
        assert_eq!(aggregate.timeframes_in_agreement, vec!["1day", "1week"]);
        assert!(!aggregate.alert.triggered);
    }

    #[test]
    fn from_results_rounds_negative_halves_up() {
        let results = [result("1h", -50, 0.5), result("4h", -25, 0.5)];
        assert_eq!(AggregateResult::from_results(&results).score, -37);
    }

    #[test]
    fn empty_results_are_neutral() {
        let aggregate = AggregateResult::from_results(&[]);
        assert_eq!(aggregate.score, 0);
        assert_eq!(aggregate.confidence, 0.0);
        assert_eq!(aggregate.bias, Bias::Neutral);
        assert_eq!(aggregate.grade.to_string(), "F");
        assert!(aggregate.timeframes_in_agreement.is_empty());
        assert_eq!(aggregate.alert, Alert::default());
    }

    #[test]
    fn aggregate_serializes_labels() {
        let aggregate = AggregateResult::summarize(-72, 0.9, vec!["1day".into()]);
        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["bias"], "Strong Bearish");
        assert_eq!(json["grade"], "B+");
        assert_eq!(json["timeframesInAgreement"][0], "1day");
        assert!(json.get("alert").is_none());

        let alert = serde_json::to_value(aggregate.alert).unwrap();
        assert_eq!(alert["triggered"], true);
        assert_eq!(alert["type"], "Strong Bearish");
    }
}
