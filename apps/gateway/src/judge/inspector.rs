use crate::analysis::AnalysisReport;
use crate::error::Result;

/// An extra pipeline stage run between analysis and adjudication.
///
/// Inspectors see the finished, immutable report. They cannot change the
/// decision; an `Err` fails the whole evaluation (an external classifier that
/// is unreachable, for instance), which the caller must not treat as ALLOW.
pub trait ReportInspector: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    fn inspect(&self, report: &AnalysisReport) -> Result<()>;
}
