pub mod config;
pub mod convert;
pub mod detect;
pub mod engine;
pub mod error;
pub mod format;
pub mod guard;
pub mod platform;
pub mod progress;
pub mod report;
pub mod scanner;
#[cfg(feature = "server")]
pub mod server;

pub use config::{AppConfig, SourceEncoding};
pub use convert::{ConversionOutcome, Converter};
pub use detect::{Classifier, EncodingVerdict};
pub use engine::{convert_path, BatchEngine};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use report::{BatchReport, FileOutcome, OutcomeStatus};
