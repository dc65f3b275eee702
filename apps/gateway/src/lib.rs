//! AURORA Gateway
//!
//! Request-moderation pipeline placed in front of a language model: every
//! prompt is analyzed, then judged against a priority-ordered set of
//! declarative laws, and an auditable decision is returned.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use aurora_gateway::{DecisionOrchestrator, LawEngine};
//!
//! let engine = LawEngine::from_path(Path::new("laws.yaml"))?;
//! let judge = DecisionOrchestrator::new(Arc::new(engine));
//! let result = judge.judge("hello", None)?;
//! println!("{} ({})", result.final_decision, result.final_reason);
//! # Ok::<(), aurora_gateway::GatewayError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod judge;
pub mod laws;
pub mod logging;

#[cfg(test)]
mod tests;

pub use analysis::{AnalysisReport, IntentAnalyzer, IntentCategory, VerdictHint};
pub use config::{GatewayConfig, LogFormat};
pub use error::{GatewayError, Result};
pub use judge::{DecisionOrchestrator, JudgeResult, ReportInspector};
pub use laws::{Decision, Law, LawBook, LawEngine, LawWatcher, Verdict};
