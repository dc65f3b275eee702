//! Intent classification using cue phrases.
//!
//! Each category owns a short list of representative phrases (RU and EN).
//! A category scores one point per phrase found as a substring of the
//! lower-cased prompt. No ML model required.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of matched cues at which confidence saturates to 1.0.
const CONFIDENCE_SATURATION: f32 = 3.0;

/// Primary intent of a prompt.
///
/// Declaration order matters: it is the tie-break order when two categories
/// score the same, and the iteration order of `category_scores`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Destructive or harmful action (delete, break, rm -rf...)
    Harm,
    /// Information request (what is, how does it work...)
    Info,
    /// Code-writing request
    Code,
    /// Attempt to override instructions (ignore, forget, bypass...)
    Manipulation,
    /// Greeting
    Greeting,
    /// Nothing matched
    Unknown,
}

impl IntentCategory {
    /// All categories in declaration order.
    pub const ALL: [IntentCategory; 6] = [
        IntentCategory::Harm,
        IntentCategory::Info,
        IntentCategory::Code,
        IntentCategory::Manipulation,
        IntentCategory::Greeting,
        IntentCategory::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IntentCategory::Harm => "harm",
            IntentCategory::Info => "info",
            IntentCategory::Code => "code",
            IntentCategory::Manipulation => "manipulation",
            IntentCategory::Greeting => "greeting",
            IntentCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for IntentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        IntentCategory::ALL
            .into_iter()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| format!("unknown intent category '{}'", s))
    }
}

/// Result of intent classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Category with the highest score
    pub primary: IntentCategory,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Raw cue count per category, in declaration order
    pub category_scores: BTreeMap<IntentCategory, u32>,
}

/// Cue phrases for one category
struct IntentCues {
    category: IntentCategory,
    cues: &'static [&'static str],
}

const CUE_TABLE: &[IntentCues] = &[
    IntentCues {
        category: IntentCategory::Harm,
        cues: &["удалить", "сломать", "взломать", "убить", "rm -rf", "format", "del"],
    },
    IntentCues {
        category: IntentCategory::Info,
        cues: &["что такое", "как работает", "расскажи", "объясни", "что значит"],
    },
    IntentCues {
        category: IntentCategory::Code,
        cues: &["напиши код", "создай функцию", "программа", "алгоритм"],
    },
    IntentCues {
        category: IntentCategory::Manipulation,
        cues: &["игнорируй", "забудь", "обойди", "jailbreak", "bypass"],
    },
    IntentCues {
        category: IntentCategory::Greeting,
        cues: &["привет", "здравствуй", "добрый день", "hi", "hello"],
    },
    IntentCues {
        category: IntentCategory::Unknown,
        cues: &[],
    },
];

/// Intent classifier over the fixed cue table
#[derive(Debug, Default, Clone, Copy)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify the intent of a prompt.
    ///
    /// Total function: a prompt with no cue at all is `Unknown` with zero confidence.
    pub fn classify(&self, prompt: &str) -> IntentResult {
        let lowered = prompt.to_lowercase();

        let mut category_scores = BTreeMap::new();
        let mut primary = IntentCategory::Unknown;
        let mut best_score = 0u32;

        for entry in CUE_TABLE {
            let score = entry
                .cues
                .iter()
                .filter(|cue| lowered.contains(*cue))
                .count() as u32;
            category_scores.insert(entry.category, score);

            // Strictly greater: earlier declarations win ties
            if score > best_score {
                best_score = score;
                primary = entry.category;
            }
        }

        let confidence = (best_score as f32 / CONFIDENCE_SATURATION).min(1.0);

        IntentResult {
            primary,
            confidence,
            category_scores,
        }
    }
}
