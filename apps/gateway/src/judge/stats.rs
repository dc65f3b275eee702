use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::analysis::AnalyzerStats;
use crate::laws::{Decision, EngineStats, Verdict};

/// Process-wide decision counters.
///
/// Every field is updated under one lock per evaluation, so any snapshot
/// satisfies `sum(decisions) == total_evaluations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub total_evaluations: u64,
    /// Evaluations that ended in an internal error (not part of the totals)
    pub failed_evaluations: u64,
    pub decisions: BTreeMap<Decision, u64>,
    pub law_applications: BTreeMap<String, u64>,
    pub average_risk: f64,
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self {
            total_evaluations: 0,
            failed_evaluations: 0,
            decisions: Decision::ALL.into_iter().map(|d| (d, 0)).collect(),
            law_applications: BTreeMap::new(),
            average_risk: 0.0,
        }
    }
}

/// Pipeline counters plus the per-stage views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub pipeline: PipelineStats,
    pub analyzer: AnalyzerStats,
    pub engine: EngineStats,
}

/// Mutex-guarded owner of [`PipelineStats`]
#[derive(Debug, Default)]
pub struct StatsRecorder {
    inner: Mutex<PipelineStats>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, verdict: &Verdict) {
        let mut stats = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        stats.total_evaluations += 1;
        *stats.decisions.entry(verdict.decision).or_insert(0) += 1;
        if !verdict.is_default() {
            *stats
                .law_applications
                .entry(verdict.matched_law_id.clone())
                .or_insert(0) += 1;
        }
        let n = stats.total_evaluations as f64;
        stats.average_risk += (verdict.risk - stats.average_risk) / n;
    }

    pub fn record_failure(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failed_evaluations += 1;
    }

    pub fn snapshot(&self) -> PipelineStats {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
