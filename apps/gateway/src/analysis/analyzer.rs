//! Intent Analyzer - orchestrator for the analysis stage.
//!
//! Runs, in order: intent classification, pattern scanning, risk scoring and
//! verdict hint derivation. The report itself is built from pure functions;
//! the only side effect is the shared counter update.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::intent::IntentClassifier;
use super::patterns::PatternScanner;
use super::report::{AnalysisReport, PromptFeatures};
use super::risk::{RiskScorer, VerdictHint};

/// Counters of the analysis stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerStats {
    pub total_analyzed: u64,
    pub average_risk: f64,
}

impl AnalyzerStats {
    /// Incremental mean: `avg += (risk - avg) / n`
    fn record(&mut self, risk: f64) {
        self.total_analyzed += 1;
        self.average_risk += (risk - self.average_risk) / self.total_analyzed as f64;
    }
}

/// Main analyzer that composes the three analysis components
#[derive(Debug, Default)]
pub struct IntentAnalyzer {
    intent_classifier: IntentClassifier,
    pattern_scanner: PatternScanner,
    risk_scorer: RiskScorer,
    stats: Mutex<AnalyzerStats>,
}

impl IntentAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a prompt and produce an immutable report.
    ///
    /// `context` is copied into the report untouched; only context conditions
    /// of laws ever look at it.
    pub fn analyze(&self, prompt: &str, context: Option<&Value>) -> AnalysisReport {
        // 1. Classify intent
        let intent = self.intent_classifier.classify(prompt);

        // 2. Scan patterns
        let matched_patterns = self.pattern_scanner.scan(prompt);

        // 3. Score risk
        let prompt_features = PromptFeatures::extract(prompt);
        let raw_risk = self
            .risk_scorer
            .raw_score(&intent, &matched_patterns, prompt_features.length);
        let risk = RiskScorer::round(raw_risk);

        // 4. Derive the coarse verdict (before rounding)
        let verdict_hint = VerdictHint::from_risk(raw_risk);

        let report = AnalysisReport {
            primary: intent.primary,
            confidence: intent.confidence,
            category_scores: intent.category_scores,
            prompt_features,
            matched_patterns,
            risk,
            verdict_hint,
            context: context.cloned(),
        };

        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(report.risk);

        debug!(summary = %report.summary(), "prompt analyzed");

        report
    }

    /// Snapshot of the stage counters.
    pub fn stats(&self) -> AnalyzerStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
