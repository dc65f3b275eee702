//! # Judge Module
//!
//! The decision pipeline: analysis, then adjudication, then bookkeeping.
//!
//! ## Components
//! - `orchestrator`: `DecisionOrchestrator`, the single public entry point
//! - `inspector`: Optional extra stages between analysis and adjudication
//! - `stats`: Process-wide decision counters

pub mod inspector;
pub mod orchestrator;
pub mod stats;

pub use inspector::ReportInspector;
pub use orchestrator::{preview, DecisionOrchestrator, EvaluationStage, JudgeResult, DEFAULT_PREVIEW_CHARS};
pub use stats::{PipelineStats, StatsRecorder, StatsReport};
