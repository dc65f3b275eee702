//! Decision Orchestrator - the single entry point of the pipeline.
//!
//! Runs analysis, then adjudication, strictly in that order, and records
//! the outcome. It owns no decision logic of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::inspector::ReportInspector;
use super::stats::{PipelineStats, StatsRecorder, StatsReport};
use crate::analysis::{AnalysisReport, IntentAnalyzer};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::laws::{Decision, Law, LawEngine, Verdict};

/// Default length of the echoed prompt
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Life cycle of one evaluation. No state is ever skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStage {
    Received,
    Analyzed,
    Adjudicated,
    Reported,
}

impl fmt::Display for EvaluationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvaluationStage::Received => "received",
            EvaluationStage::Analyzed => "analyzed",
            EvaluationStage::Adjudicated => "adjudicated",
            EvaluationStage::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// Everything the caller gets back from one evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeResult {
    /// Fresh id per evaluation
    pub evaluation_id: Uuid,
    /// Truncated prompt, for display only
    pub prompt_preview: String,
    pub final_decision: Decision,
    pub final_reason: String,
    pub risk_score: f64,
    pub analysis_report: AnalysisReport,
    pub verdict: Verdict,
    pub evaluated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

/// Composes [`IntentAnalyzer`] and [`LawEngine`] and keeps the pipeline counters.
///
/// Construct once at startup and share it (`Arc<DecisionOrchestrator>`)
/// between request handlers; `judge` takes `&self`.
pub struct DecisionOrchestrator {
    analyzer: IntentAnalyzer,
    inspectors: Vec<Box<dyn ReportInspector>>,
    engine: Arc<LawEngine>,
    stats: StatsRecorder,
    preview_chars: usize,
}

impl DecisionOrchestrator {
    pub fn new(engine: Arc<LawEngine>) -> Self {
        Self {
            analyzer: IntentAnalyzer::new(),
            inspectors: Vec::new(),
            engine,
            stats: StatsRecorder::new(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Add a stage that runs on every report before the law engine.
    pub fn with_inspector(mut self, inspector: Box<dyn ReportInspector>) -> Self {
        self.inspectors.push(inspector);
        self
    }

    /// Load the law file named by `config` and build the pipeline.
    ///
    /// Fails fast on any malformed law: no partial law set is ever served.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let engine = LawEngine::from_path(&config.laws_path)?;
        info!(
            "Pipeline ready with {} laws from {}",
            engine.snapshot().len(),
            config.laws_path.display()
        );
        Ok(Self::new(Arc::new(engine)).with_preview_chars(config.preview_chars))
    }

    /// Judge one prompt.
    ///
    /// A returned error means the evaluation itself failed; it is never a
    /// decision and must not be treated as ALLOW.
    #[instrument(skip(self, prompt, context), fields(prompt_bytes = prompt.len()))]
    pub fn judge(&self, prompt: &str, context: Option<&Value>) -> Result<JudgeResult> {
        let start = Instant::now();
        let evaluation_id = Uuid::new_v4();
        debug!(%evaluation_id, stage = %EvaluationStage::Received);

        // 1. Analysis
        let report = self.analyzer.analyze(prompt, context);
        debug!(%evaluation_id, stage = %EvaluationStage::Analyzed, risk = report.risk);

        for inspector in &self.inspectors {
            if let Err(e) = inspector.inspect(&report) {
                warn!(%evaluation_id, inspector = inspector.name(), "Inspector rejected report");
                return Err(self.fail(evaluation_id, EvaluationStage::Analyzed, e));
            }
        }

        // 2. Adjudication (always on a completed report)
        let verdict = self
            .engine
            .evaluate(&report)
            .map_err(|e| self.fail(evaluation_id, EvaluationStage::Analyzed, e))?;
        debug!(%evaluation_id, stage = %EvaluationStage::Adjudicated, decision = %verdict.decision);

        // 3. Report
        self.stats.record(&verdict);
        info!(
            %evaluation_id,
            decision = %verdict.decision,
            law = %verdict.matched_law_id,
            risk = verdict.risk,
            stage = %EvaluationStage::Reported,
            "Prompt judged"
        );

        Ok(JudgeResult {
            evaluation_id,
            prompt_preview: preview(prompt, self.preview_chars),
            final_decision: verdict.decision,
            final_reason: verdict.reason.clone(),
            risk_score: report.risk,
            analysis_report: report,
            verdict,
            evaluated_at: Utc::now(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Count a failed evaluation and tag the error with where it stopped.
    fn fail(&self, evaluation_id: Uuid, reached: EvaluationStage, err: GatewayError) -> GatewayError {
        self.stats.record_failure();
        error!(%evaluation_id, stage = %reached, "Evaluation failed: {}", err);
        let detail = match err {
            GatewayError::Internal(msg) => msg,
            other => other.to_string(),
        };
        GatewayError::Internal(format!(
            "evaluation {} failed after {} stage: {}",
            evaluation_id, reached, detail
        ))
    }

    /// Pipeline counters.
    pub fn get_stats(&self) -> PipelineStats {
        self.stats.snapshot()
    }

    /// Pipeline counters together with the per-stage counters.
    pub fn stats_report(&self) -> StatsReport {
        StatsReport {
            pipeline: self.stats.snapshot(),
            analyzer: self.analyzer.stats(),
            engine: self.engine.stats(),
        }
    }

    /// Laws in evaluation order.
    pub fn list_laws(&self) -> Vec<Law> {
        self.engine.list_laws()
    }

    pub fn engine(&self) -> &Arc<LawEngine> {
        &self.engine
    }
}

/// First `max_chars` characters, with `...` when something was cut.
pub fn preview(prompt: &str, max_chars: usize) -> String {
    match prompt.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &prompt[..cut]),
        None => prompt.to_string(),
    }
}
