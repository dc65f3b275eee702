//! Risk scoring.
//!
//! Risk = intent risk + sum of matched pattern weights + length penalty,
//! capped to [0, 1]. The cap saturates: many distinct profiles collapse
//! to 1.0, and that coarse behavior is kept on purpose.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::intent::{IntentCategory, IntentResult};
use super::patterns::PatternMatch;

const LONG_PROMPT_CHARS: usize = 1000;
const VERY_LONG_PROMPT_CHARS: usize = 5000;
const LONG_PROMPT_PENALTY: f64 = 0.1;
const VERY_LONG_PROMPT_PENALTY: f64 = 0.2;

/// Coarse verdict derived from risk alone, before any law is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictHint {
    Allow,
    Simulate,
    Quarantine,
    Deny,
}

impl VerdictHint {
    /// risk > 0.8 deny, > 0.5 quarantine, > 0.3 simulate, else allow
    pub fn from_risk(risk: f64) -> Self {
        if risk > 0.8 {
            VerdictHint::Deny
        } else if risk > 0.5 {
            VerdictHint::Quarantine
        } else if risk > 0.3 {
            VerdictHint::Simulate
        } else {
            VerdictHint::Allow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerdictHint::Allow => "allow",
            VerdictHint::Simulate => "simulate",
            VerdictHint::Quarantine => "quarantine",
            VerdictHint::Deny => "deny",
        }
    }
}

impl fmt::Display for VerdictHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for VerdictHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(VerdictHint::Allow),
            "simulate" => Ok(VerdictHint::Simulate),
            "quarantine" => Ok(VerdictHint::Quarantine),
            "deny" => Ok(VerdictHint::Deny),
            other => Err(format!("unknown verdict hint '{}'", other)),
        }
    }
}

/// Base risk carried by each intent category
pub fn intent_risk(category: IntentCategory) -> f64 {
    match category {
        IntentCategory::Harm => 0.8,
        IntentCategory::Manipulation => 0.7,
        IntentCategory::Code => 0.4,
        IntentCategory::Info => 0.1,
        IntentCategory::Greeting => 0.0,
        IntentCategory::Unknown => 0.3,
    }
}

/// Combines intent and pattern findings into a single risk value
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    /// Compute the risk for a prompt of `prompt_length` characters.
    ///
    /// The result is clamped to [0, 1] and rounded to two decimals.
    pub fn score(&self, intent: &IntentResult, patterns: &[PatternMatch], prompt_length: usize) -> f64 {
        Self::round(self.raw_score(intent, patterns, prompt_length))
    }

    /// Clamped but unrounded risk. The verdict hint is derived from this value.
    pub fn raw_score(&self, intent: &IntentResult, patterns: &[PatternMatch], prompt_length: usize) -> f64 {
        let mut risk = intent_risk(intent.primary);

        risk += patterns
            .iter()
            .filter(|p| p.matched)
            .map(|p| p.risk_weight)
            .sum::<f64>();

        risk += Self::length_penalty(prompt_length);

        risk.clamp(0.0, 1.0)
    }

    /// Two-decimal rounding of a reported risk value.
    pub fn round(risk: f64) -> f64 {
        (risk * 100.0).round() / 100.0
    }

    fn length_penalty(prompt_length: usize) -> f64 {
        if prompt_length > VERY_LONG_PROMPT_CHARS {
            VERY_LONG_PROMPT_PENALTY
        } else if prompt_length > LONG_PROMPT_CHARS {
            LONG_PROMPT_PENALTY
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn intent(primary: IntentCategory) -> IntentResult {
        IntentResult {
            primary,
            confidence: 0.0,
            category_scores: BTreeMap::new(),
        }
    }

    fn pattern(name: &str, weight: f64) -> PatternMatch {
        PatternMatch {
            name: name.to_string(),
            risk_weight: weight,
            matched: true,
        }
    }

    #[test]
    fn test_intent_only() {
        let scorer = RiskScorer::new();
        assert_eq!(scorer.score(&intent(IntentCategory::Greeting), &[], 10), 0.0);
        assert_eq!(scorer.score(&intent(IntentCategory::Info), &[], 10), 0.1);
        assert_eq!(scorer.score(&intent(IntentCategory::Unknown), &[], 10), 0.3);
    }

    #[test]
    fn test_patterns_add_up() {
        let scorer = RiskScorer::new();
        let risk = scorer.score(
            &intent(IntentCategory::Info),
            &[pattern("social_engineering", 0.3)],
            10,
        );
        assert_eq!(risk, 0.4);
    }

    #[test]
    fn test_saturates_at_one() {
        let scorer = RiskScorer::new();
        let risk = scorer.score(
            &intent(IntentCategory::Unknown),
            &[pattern("jailbreak_attempt", 0.8), pattern("escalation", 0.6)],
            10,
        );
        assert_eq!(risk, 1.0);
    }

    #[test]
    fn test_length_penalty_tiers() {
        let scorer = RiskScorer::new();
        let greeting = intent(IntentCategory::Greeting);
        assert_eq!(scorer.score(&greeting, &[], 1000), 0.0);
        assert_eq!(scorer.score(&greeting, &[], 1001), 0.1);
        assert_eq!(scorer.score(&greeting, &[], 5000), 0.1);
        assert_eq!(scorer.score(&greeting, &[], 5001), 0.2);
    }

    #[test]
    fn test_hint_thresholds_are_strict() {
        assert_eq!(VerdictHint::from_risk(0.81), VerdictHint::Deny);
        assert_eq!(VerdictHint::from_risk(0.8), VerdictHint::Quarantine);
        assert_eq!(VerdictHint::from_risk(0.5), VerdictHint::Simulate);
        assert_eq!(VerdictHint::from_risk(0.3), VerdictHint::Allow);
        assert_eq!(VerdictHint::from_risk(0.0), VerdictHint::Allow);
    }
}
