//! # Analysis Module
//!
//! Fast, rule-free analysis of a prompt, run BEFORE any law is applied.
//!
//! ## Components
//! - `intent`: Intent classification using cue phrases
//! - `patterns`: Risk pattern catalog scanning
//! - `risk`: Risk scoring and verdict hint
//! - `report`: Output data structure
//! - `analyzer`: Stage orchestrator

pub mod analyzer;
pub mod intent;
pub mod patterns;
pub mod report;
pub mod risk;

pub use analyzer::{AnalyzerStats, IntentAnalyzer};
pub use intent::{IntentCategory, IntentClassifier, IntentResult};
pub use patterns::{PatternMatch, PatternScanner};
pub use report::{AnalysisReport, PromptFeatures};
pub use risk::{RiskScorer, VerdictHint};
