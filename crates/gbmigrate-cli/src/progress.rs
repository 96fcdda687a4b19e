use colored::*;
use gbmigrate_core::{BatchReport, FileOutcome, OutcomeStatus, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (candidate count unknown upfront)
/// - Convert phase: progress bar, one coloured line per file printed above it
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar().take() {
            pb.finish_and_clear();
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .progress_chars("━╸─")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}

/// Skip is informational, success (planned or done) positive, failure an alert.
pub fn outcome_color(status: OutcomeStatus) -> Color {
    match status {
        OutcomeStatus::Skipped => Color::Yellow,
        OutcomeStatus::Converted | OutcomeStatus::WouldConvert => Color::Green,
        OutcomeStatus::Failed => Color::Red,
    }
}

pub fn render_outcome(outcome: &FileOutcome) -> String {
    let color = outcome_color(outcome.status);
    let tag = match outcome.status {
        OutcomeStatus::Skipped => "skip".color(color),
        OutcomeStatus::Converted => "done".color(color),
        OutcomeStatus::WouldConvert => "plan".color(color),
        OutcomeStatus::Failed => "fail".color(color).bold(),
    };
    format!("{} {}", tag, outcome.message.color(color))
}

pub fn render_summary(report: &BatchReport) -> String {
    let mut summary = format!(
        "{} converted, {} failed, {} skipped",
        format!("{}", report.count(OutcomeStatus::Converted)).green(),
        format!("{}", report.count(OutcomeStatus::Failed)).red(),
        format!("{}", report.count(OutcomeStatus::Skipped)).yellow(),
    );
    let planned = report.count(OutcomeStatus::WouldConvert);
    if planned > 0 {
        summary.push_str(&format!(", {} would convert", format!("{}", planned).green()));
    }
    summary.push_str(&format!(
        " in {}",
        format!("{:.2}s", report.elapsed.as_secs_f64()).green()
    ));
    summary
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(style("{spinner:.cyan} {msg}"));
        pb.set_message("Scanning files...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Scan complete: {} candidate files in {:.2}s",
            "✓".green(),
            total_files,
            duration_secs
        );

        let pb = ProgressBar::new(total_files as u64);
        pb.set_style(style(
            "  {spinner:.cyan} Converting [{bar:30.cyan/dim}] {pos}/{len} files",
        ));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_outcome(&self, outcome: &FileOutcome) {
        let line = render_outcome(outcome);
        match self.bar().as_ref() {
            Some(pb) => {
                pb.println(line);
                pb.inc(1);
            }
            None => println!("{}", line),
        }
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        self.finish_bar();
        println!("{}", render_summary(report));
    }
}
