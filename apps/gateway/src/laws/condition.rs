//! Law conditions.
//!
//! Declarative condition maps (`intent.primary: harm`, `risk: ">0.8"`, ...) are
//! parsed once, at load time, into a list of typed clauses. Evaluation never
//! parses strings. All clauses of a condition must hold.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::analysis::{AnalysisReport, IntentCategory, PatternScanner, VerdictHint};
use crate::error::{GatewayError, Result};

const KEY_INTENT: &str = "intent.primary";
const KEY_PATTERN: &str = "patterns.name";
const KEY_RISK: &str = "risk";
const KEY_MAX_LENGTH: &str = "max_length";
const KEY_HINT: &str = "verdict_hint";
const CONTEXT_PREFIX: &str = "context.";

/// Risk comparison operator. Only strict inequalities exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::GreaterThan => f.write_str(">"),
            Comparison::LessThan => f.write_str("<"),
        }
    }
}

/// A single typed test over an analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// Primary intent equals
    IntentIs { intent: IntentCategory },
    /// A catalog pattern with this name matched
    PatternPresent { pattern: String },
    /// Risk compared against a literal threshold
    Risk { op: Comparison, threshold: f64 },
    /// Prompt is longer than `max_length` characters
    LengthExceeds { max_length: usize },
    /// Coarse verdict hint equals
    HintIs { hint: VerdictHint },
    /// Top-level context field equals
    ContextEquals { key: String, value: Value },
}

impl Clause {
    pub fn holds(&self, report: &AnalysisReport) -> bool {
        match self {
            Clause::IntentIs { intent } => report.primary == *intent,
            Clause::PatternPresent { pattern } => report.has_pattern(pattern),
            Clause::Risk { op, threshold } => match op {
                Comparison::GreaterThan => report.risk > *threshold,
                Comparison::LessThan => report.risk < *threshold,
            },
            Clause::LengthExceeds { max_length } => report.prompt_features.length > *max_length,
            Clause::HintIs { hint } => report.verdict_hint == *hint,
            Clause::ContextEquals { key, value } => report.context_field(key) == Some(value),
        }
    }

    /// Parse one `key: value` entry of a declarative condition map.
    pub fn parse(key: &str, value: &Value) -> Result<Self> {
        match key {
            KEY_INTENT => {
                let raw = expect_str(key, value)?;
                let intent = raw.parse::<IntentCategory>().map_err(GatewayError::Config)?;
                Ok(Clause::IntentIs { intent })
            }
            KEY_PATTERN => {
                let pattern = expect_str(key, value)?;
                if !PatternScanner::is_known(pattern) {
                    return Err(GatewayError::Config(format!(
                        "unknown pattern '{}' (known: {})",
                        pattern,
                        PatternScanner::catalog_names().join(", ")
                    )));
                }
                Ok(Clause::PatternPresent {
                    pattern: pattern.to_string(),
                })
            }
            KEY_RISK => parse_risk(expect_str(key, value)?),
            KEY_MAX_LENGTH => {
                let max_length = value.as_u64().ok_or_else(|| {
                    GatewayError::Config(format!(
                        "'{}' must be a non-negative integer, got {}",
                        key, value
                    ))
                })?;
                let max_length = usize::try_from(max_length).map_err(|_| {
                    GatewayError::Config(format!("'{}' is too large: {}", key, max_length))
                })?;
                Ok(Clause::LengthExceeds { max_length })
            }
            KEY_HINT => {
                let hint = expect_str(key, value)?
                    .parse::<VerdictHint>()
                    .map_err(GatewayError::Config)?;
                Ok(Clause::HintIs { hint })
            }
            _ => match key.strip_prefix(CONTEXT_PREFIX) {
                Some(field) if !field.is_empty() => Ok(Clause::ContextEquals {
                    key: field.to_string(),
                    value: value.clone(),
                }),
                _ => Err(GatewayError::Config(format!(
                    "unknown condition key '{}'",
                    key
                ))),
            },
        }
    }
}

fn expect_str<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        GatewayError::Config(format!("'{}' must be a string, got {}", key, value))
    })
}

/// Parse `">0.8"` / `"< 0.3"`. Anything else, `>=` and `<=` included, is rejected.
fn parse_risk(raw: &str) -> Result<Clause> {
    let raw = raw.trim();
    let invalid = || GatewayError::Config(format!("unparseable risk threshold '{}'", raw));

    let (op, rest) = if let Some(rest) = raw.strip_prefix('>') {
        (Comparison::GreaterThan, rest)
    } else if let Some(rest) = raw.strip_prefix('<') {
        (Comparison::LessThan, rest)
    } else {
        return Err(invalid());
    };

    if rest.starts_with('=') {
        return Err(GatewayError::Config(format!(
            "risk threshold '{}': only '>' and '<' are supported",
            raw
        )));
    }

    let threshold: f64 = rest.trim().parse().map_err(|_| invalid())?;
    if !threshold.is_finite() {
        return Err(invalid());
    }

    Ok(Clause::Risk { op, threshold })
}

/// Conjunction of clauses. An empty condition matches every report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition {
    clauses: Vec<Clause>,
}

impl Condition {
    /// A condition that always holds.
    pub fn always() -> Self {
        Self::default()
    }

    /// Builder-style: add one more clause.
    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, report: &AnalysisReport) -> bool {
        self.clauses.iter().all(|clause| clause.holds(report))
    }

    /// Parse a declarative condition map.
    pub fn parse(raw: &BTreeMap<String, Value>) -> Result<Self> {
        let clauses = raw
            .iter()
            .map(|(key, value)| Clause::parse(key, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clauses })
    }
}
