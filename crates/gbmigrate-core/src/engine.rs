use crate::config::{self, AppConfig};
use crate::convert::{ConversionOutcome, Converter};
use crate::detect::{CharsetDetector, Classifier};
use crate::platform::WritePermission;
use crate::progress::ProgressReporter;
use crate::report::{BatchReport, FileOutcome, OutcomeStatus};
use crate::scanner;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Walks the configured roots and converts every legacy Chinese file found.
pub struct BatchEngine {
    config: AppConfig,
    classifier: Classifier,
    converter: Converter,
    dry_run: bool,
}

impl BatchEngine {
    pub fn new(config: AppConfig) -> Self {
        let classifier = Classifier::new(config.confidence_threshold);
        let converter = Converter::new(config.source_encoding);
        Self {
            config,
            classifier,
            converter,
            dry_run: false,
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn CharsetDetector>) -> Self {
        self.classifier = Classifier::with_detector(detector, self.config.confidence_threshold);
        self
    }

    pub fn with_permissions(mut self, permissions: Box<dyn WritePermission>) -> Self {
        self.converter = Converter::with_permissions(self.config.source_encoding, permissions);
        self
    }

    /// Classify only; nothing is written.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the batch:
    /// 1. Collect candidate files under every non-overlapping root
    /// 2. Classify each file and convert the legacy Chinese ones
    ///
    /// A failing file is recorded and the walk carries on.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> BatchReport {
        let start = Instant::now();
        let roots = config::non_overlapping_directories(self.config.root_paths.clone());
        info!("Processing directories: {:?}", roots);

        let root_slices: Vec<&str> = roots.iter().map(|s| s.as_str()).collect();
        let ignore_slices: Vec<&str> =
            self.config.ignore_patterns.iter().map(|s| s.as_str()).collect();
        let extensions = self.config.normalized_extensions();

        reporter.on_scan_start();
        let files = scanner::collect_candidate_files(&root_slices, &extensions, &ignore_slices);
        let scan_duration = start.elapsed();
        debug!(
            "Scan completed in {:.2}s, {} candidate files",
            scan_duration.as_secs_f64(),
            files.len()
        );
        reporter.on_scan_complete(files.len(), scan_duration.as_secs_f64());

        let mut report = BatchReport::default();
        for path in files {
            let outcome = self.process_file(path);
            reporter.on_file_outcome(&outcome);
            report.outcomes.push(outcome);
        }

        report.elapsed = start.elapsed();
        info!(
            "Batch finished in {:.2}s: {} converted, {} failed, {} skipped",
            report.elapsed.as_secs_f64(),
            report.count(OutcomeStatus::Converted),
            report.count(OutcomeStatus::Failed),
            report.count(OutcomeStatus::Skipped),
        );
        reporter.on_batch_complete(&report);
        report
    }

    /// Classify one file and, if it is legacy Chinese, convert it.
    pub fn process_file(&self, path: PathBuf) -> FileOutcome {
        let verdict = self.classifier.classify_file(&path);

        if !verdict.is_legacy_chinese {
            let message = skip_message(
                &path,
                verdict.label(),
                verdict.confidence,
                verdict.diagnostic.as_deref(),
            );
            return FileOutcome {
                path,
                status: OutcomeStatus::Skipped,
                message,
                verdict,
            };
        }

        if self.dry_run {
            let message = format!(
                "path {}: would convert from {} (confidence {:.2})",
                path.display(),
                verdict.label(),
                verdict.confidence
            );
            return FileOutcome {
                path,
                status: OutcomeStatus::WouldConvert,
                message,
                verdict,
            };
        }

        let outcome = self.converter.convert(&path, &verdict);
        FileOutcome {
            path,
            status: if outcome.success {
                OutcomeStatus::Converted
            } else {
                OutcomeStatus::Failed
            },
            message: outcome.message,
            verdict,
        }
    }
}

fn skip_message(path: &Path, label: &str, confidence: f32, diagnostic: Option<&str>) -> String {
    match diagnostic {
        Some(reason) => format!("path {}: not converted, {}", path.display(), reason),
        None => format!(
            "path {}: not GB2312-encoded (detected {}, confidence {:.2}), skipped",
            path.display(),
            label,
            confidence
        ),
    }
}

/// Single-file path used by the HTTP endpoint and `convert-file`: validate
/// the path, classify, then convert. Always answers with an outcome.
pub fn convert_path(
    classifier: &Classifier,
    converter: &Converter,
    file_path: &str,
) -> ConversionOutcome {
    if file_path.trim().is_empty() {
        return ConversionOutcome::failed("no file path provided".to_string());
    }

    let path = Path::new(file_path);
    if !path.exists() {
        return ConversionOutcome::failed(format!("file does not exist: {}", file_path));
    }
    if !path.is_file() {
        return ConversionOutcome::failed(format!("not a regular file: {}", file_path));
    }

    let verdict = classifier.classify_file(path);
    if !verdict.is_legacy_chinese {
        return ConversionOutcome::failed(format!("file is not GB2312-encoded: {}", file_path));
    }

    converter.convert(path, &verdict)
}
