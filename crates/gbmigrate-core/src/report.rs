use crate::detect::EncodingVerdict;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Not legacy Chinese (or not classifiable); left alone.
    Skipped,
    Converted,
    Failed,
    /// Dry run: would have been converted.
    WouldConvert,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: OutcomeStatus,
    pub message: String,
    pub verdict: EncodingVerdict,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl BatchReport {
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn outcome_for(&self, path: &std::path::Path) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.path == path)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
