//! Analysis Report - output structure of the intent analysis stage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::intent::IntentCategory;
use super::patterns::PatternMatch;
use super::risk::VerdictHint;

static CODE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```|def |class |import ").expect("Invalid regex: code markers")
});

static COMMAND_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(rm|del|format|shutdown)").expect("Invalid regex: command tokens")
});

/// Surface features of the raw prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFeatures {
    /// Length in characters (not bytes)
    pub length: usize,
    pub has_code: bool,
    pub has_question: bool,
    pub has_command_tokens: bool,
}

impl PromptFeatures {
    pub fn extract(prompt: &str) -> Self {
        Self {
            length: prompt.chars().count(),
            has_code: CODE_MARKERS.is_match(prompt),
            has_question: prompt.contains('?'),
            has_command_tokens: COMMAND_TOKENS.is_match(&prompt.to_lowercase()),
        }
    }
}

/// Immutable result of one analysis run.
///
/// Built once by [`IntentAnalyzer::analyze`](super::IntentAnalyzer::analyze) and
/// handed by reference to the law engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Primary intent
    pub primary: IntentCategory,

    /// Intent confidence (0.0 - 1.0)
    pub confidence: f32,

    /// Cue count per category, in declaration order
    pub category_scores: BTreeMap<IntentCategory, u32>,

    /// Surface features of the prompt
    pub prompt_features: PromptFeatures,

    /// Matched risk patterns, in catalog order
    pub matched_patterns: Vec<PatternMatch>,

    /// Combined risk (0.0 - 1.0)
    pub risk: f64,

    /// Coarse verdict suggested by risk alone
    pub verdict_hint: VerdictHint,

    /// Caller-supplied context, opaque except to context conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl AnalysisReport {
    /// True if a pattern with this catalog name matched.
    pub fn has_pattern(&self, name: &str) -> bool {
        self.matched_patterns.iter().any(|p| p.name == name)
    }

    /// Look up a top-level field of the request context.
    pub fn context_field(&self, key: &str) -> Option<&Value> {
        self.context.as_ref()?.as_object()?.get(key)
    }

    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Intent: {} ({:.0}%), Patterns: {}, Risk: {:.2}, Hint: {}",
            self.primary,
            self.confidence * 100.0,
            self.matched_patterns.len(),
            self.risk,
            self.verdict_hint
        )
    }
}
