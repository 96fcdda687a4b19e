//! Statistical charset classification of whole files.

mod chardet;

pub use chardet::{gb2312_pair_ratio, is_gb2312_pair, ChardetngDetector};

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Labels treated as legacy Chinese, compared ASCII case-insensitively.
pub const LEGACY_CHINESE_LABELS: [&str; 4] = ["gb2312", "gbk", "hz-gb-2312", "chinese"];

/// Raw detector output: best-guess label and confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: Option<String>,
    pub confidence: f32,
}

impl Detection {
    pub fn unknown() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }
}

pub trait CharsetDetector: Send + Sync {
    fn detect(&self, bytes: &[u8]) -> Detection;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingVerdict {
    /// `None` when the encoding could not be determined.
    pub detected_encoding: Option<String>,
    pub confidence: f32,
    pub is_legacy_chinese: bool,
    /// Why classification could not run (unreadable or empty file).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl EncodingVerdict {
    fn unknown(diagnostic: String) -> Self {
        Self {
            detected_encoding: None,
            confidence: 0.0,
            is_legacy_chinese: false,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn label(&self) -> &str {
        self.detected_encoding.as_deref().unwrap_or("unknown")
    }
}

pub fn is_legacy_chinese_label(label: &str) -> bool {
    LEGACY_CHINESE_LABELS
        .iter()
        .any(|legacy| legacy.eq_ignore_ascii_case(label))
}

pub struct Classifier {
    detector: Box<dyn CharsetDetector>,
    threshold: f32,
}

impl Classifier {
    pub fn new(threshold: f32) -> Self {
        Self::with_detector(Box::new(ChardetngDetector), threshold)
    }

    pub fn with_detector(detector: Box<dyn CharsetDetector>, threshold: f32) -> Self {
        Self {
            detector,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Legacy Chinese iff the label is in [`LEGACY_CHINESE_LABELS`] and the
    /// confidence is strictly above the threshold.
    pub fn classify(&self, bytes: &[u8]) -> EncodingVerdict {
        if bytes.is_empty() {
            return EncodingVerdict::unknown("file is empty".to_string());
        }

        let detection = self.detector.detect(bytes);
        let is_legacy_chinese = match detection.label.as_deref() {
            Some(label) => is_legacy_chinese_label(label) && detection.confidence > self.threshold,
            None => false,
        };

        EncodingVerdict {
            detected_encoding: detection.label,
            confidence: detection.confidence,
            is_legacy_chinese,
            diagnostic: None,
        }
    }

    /// Reads the whole file and classifies it. I/O failures yield an
    /// unknown verdict instead of an error.
    pub fn classify_file(&self, path: &Path) -> EncodingVerdict {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Could not read {} for classification: {}", path.display(), err);
                return EncodingVerdict::unknown(format!("could not read file: {}", err));
            }
        };

        let verdict = self.classify(&bytes);
        debug!(
            "{}: detected {} (confidence {:.2}), legacy chinese: {}",
            path.display(),
            verdict.label(),
            verdict.confidence,
            verdict.is_legacy_chinese
        );
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct FixedDetector(&'static str, f32);

    impl CharsetDetector for FixedDetector {
        fn detect(&self, _bytes: &[u8]) -> Detection {
            Detection {
                label: Some(self.0.to_string()),
                confidence: self.1,
            }
        }
    }

    fn classifier(label: &'static str, confidence: f32) -> Classifier {
        Classifier::with_detector(Box::new(FixedDetector(label, confidence)), 0.8)
    }

    #[test]
    fn test_confidence_at_threshold_is_rejected() {
        let verdict = classifier("GB2312", 0.8).classify(b"\xc4\xe3\xba\xc3");
        assert!(!verdict.is_legacy_chinese);
        assert_eq!(verdict.detected_encoding.as_deref(), Some("GB2312"));
    }

    #[test]
    fn test_confidence_above_threshold_is_accepted() {
        let verdict = classifier("GB2312", 0.81).classify(b"\xc4\xe3\xba\xc3");
        assert!(verdict.is_legacy_chinese);
    }

    #[test]
    fn test_label_set_is_case_insensitive() {
        for label in ["gb2312", "GBK", "HZ-GB-2312", "Chinese"] {
            assert!(classifier(label, 0.99).classify(b"x").is_legacy_chinese, "{}", label);
        }
    }

    #[test]
    fn test_other_labels_rejected_even_when_confident() {
        for label in ["UTF-8", "Big5", "Shift_JIS", "gb18030", "windows-1252"] {
            assert!(!classifier(label, 1.0).classify(b"x").is_legacy_chinese, "{}", label);
        }
    }

    #[test]
    fn test_empty_input_is_unknown() {
        let verdict = classifier("GB2312", 1.0).classify(b"");
        assert!(!verdict.is_legacy_chinese);
        assert_eq!(verdict.detected_encoding, None);
        assert_eq!(verdict.label(), "unknown");
        assert!(verdict.diagnostic.is_some());
    }

    #[test]
    fn test_unreadable_file_is_unknown() {
        let dir = tempdir().unwrap();
        let verdict = classifier("GB2312", 1.0).classify_file(&dir.path().join("nope.cpp"));
        assert!(!verdict.is_legacy_chinese);
        assert_eq!(verdict.detected_encoding, None);
        assert!(verdict.diagnostic.unwrap().starts_with("could not read file"));
    }
}
