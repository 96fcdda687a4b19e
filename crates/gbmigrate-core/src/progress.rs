use crate::report::{BatchReport, FileOutcome};

/// Trait for observing a batch run.
///
/// The CLI renders outcomes with colour and a spinner; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_file_outcome(&self, _outcome: &FileOutcome) {}
    fn on_batch_complete(&self, _report: &BatchReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
