//! Law Engine - applies the law book to analysis reports.
//!
//! The law book is an immutable snapshot behind a reader/writer lock. An
//! evaluation clones the `Arc` and releases the lock at once, so a reload
//! never exposes a half-updated book to an in-flight evaluation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

use super::law::{Law, LawBook};
use super::verdict::{Decision, Verdict};
use crate::analysis::AnalysisReport;
use crate::error::{GatewayError, Result};

/// Counters of the adjudication stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_evaluations: u64,
    pub decisions: BTreeMap<Decision, u64>,
    pub law_applications: BTreeMap<String, u64>,
}

impl Default for EngineStats {
    fn default() -> Self {
        Self {
            total_evaluations: 0,
            decisions: Decision::ALL.into_iter().map(|d| (d, 0)).collect(),
            law_applications: BTreeMap::new(),
        }
    }
}

impl EngineStats {
    fn record(&mut self, verdict: &Verdict) {
        self.total_evaluations += 1;
        *self.decisions.entry(verdict.decision).or_insert(0) += 1;
        if !verdict.is_default() {
            *self
                .law_applications
                .entry(verdict.matched_law_id.clone())
                .or_insert(0) += 1;
        }
    }
}

/// Priority-ordered rule engine
#[derive(Debug)]
pub struct LawEngine {
    book: RwLock<Arc<LawBook>>,
    stats: Mutex<EngineStats>,
}

impl Default for LawEngine {
    fn default() -> Self {
        Self::new(LawBook::empty())
    }
}

impl LawEngine {
    pub fn new(book: LawBook) -> Self {
        Self {
            book: RwLock::new(Arc::new(book)),
            stats: Mutex::new(EngineStats::default()),
        }
    }

    /// Load the law file at `path`. Any malformed law aborts the load.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(LawBook::load(path)?))
    }

    /// Current law book snapshot.
    pub fn snapshot(&self) -> Arc<LawBook> {
        Arc::clone(&self.book.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Atomically replace the whole law book.
    pub fn reload(&self, book: LawBook) {
        let count = book.len();
        *self.book.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(book);
        info!("Law book replaced ({} laws)", count);
    }

    /// Parse `path` completely, then swap it in. On error the current book stays.
    ///
    /// A file with no laws never replaces a non-empty book: a truncated or
    /// half-written file would otherwise turn every decision into ALLOW.
    pub fn reload_from_path(&self, path: &Path) -> Result<usize> {
        let book = LawBook::load(path)?;
        let current = self.snapshot().len();
        if book.is_empty() && current > 0 {
            return Err(GatewayError::Config(format!(
                "{}: refusing to replace {} laws with an empty law set",
                path.display(),
                current
            )));
        }
        let count = book.len();
        self.reload(book);
        Ok(count)
    }

    /// Laws in evaluation order.
    pub fn list_laws(&self) -> Vec<Law> {
        self.snapshot().laws().to_vec()
    }

    /// Apply the first matching law to `report`, or the default verdict.
    ///
    /// Fails only when the report itself is inconsistent (risk outside [0, 1]);
    /// such a failure is never turned into a decision.
    pub fn evaluate(&self, report: &AnalysisReport) -> Result<Verdict> {
        if !report.risk.is_finite() || !(0.0..=1.0).contains(&report.risk) {
            return Err(GatewayError::Internal(format!(
                "analysis report carries invalid risk {}",
                report.risk
            )));
        }

        let book = self.snapshot();

        let verdict = match book.first_match(report) {
            Some(law) => {
                debug!(law = %law.id, decision = %law.action, "law matched");
                Verdict {
                    decision: law.action,
                    matched_law_id: law.id.clone(),
                    law_name: Some(law.name.clone()),
                    reason: law.description.clone(),
                    risk: report.risk,
                }
            }
            None => {
                debug!("no law matched, applying default");
                Verdict::default_allow(report.risk)
            }
        };

        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(&verdict);

        Ok(verdict)
    }

    /// Snapshot of the stage counters.
    pub fn stats(&self) -> EngineStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
