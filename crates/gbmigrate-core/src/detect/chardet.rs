use super::{CharsetDetector, Detection};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, GBK};

const MAX_CONFIDENCE: f32 = 0.99;
const UNASSESSED_FACTOR: f32 = 0.85;
const UNASSESSED_CONFIDENCE: f32 = 0.5;

/// An assigned GB2312 (EUC-CN) character. Rows 10-15 are empty and rows
/// 2, 4-9 and 55 are only partly filled.
pub fn is_gb2312_pair(lead: u8, trail: u8) -> bool {
    let cells: &[(u8, u8)] = match lead {
        0xA1 | 0xA3 => &[(0xA1, 0xFE)],
        0xA2 => &[(0xB1, 0xE2), (0xE5, 0xEE), (0xF1, 0xFC)],
        0xA4 => &[(0xA1, 0xF3)],
        0xA5 => &[(0xA1, 0xF6)],
        0xA6 => &[(0xA1, 0xB8), (0xC1, 0xD8)],
        0xA7 => &[(0xA1, 0xC1), (0xD1, 0xF1)],
        0xA8 => &[(0xA1, 0xBA), (0xC5, 0xE9)],
        0xA9 => &[(0xA4, 0xEF)],
        0xB0..=0xD6 | 0xD8..=0xF7 => &[(0xA1, 0xFE)],
        0xD7 => &[(0xA1, 0xF9)],
        _ => &[],
    };
    cells
        .iter()
        .any(|&(first, last)| (first..=last).contains(&trail))
}

/// Share of non-ASCII sequences that are GB2312 double-byte characters.
/// Returns `None` for pure ASCII input.
pub fn gb2312_pair_ratio(bytes: &[u8]) -> Option<f32> {
    let mut total = 0usize;
    let mut hits = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] < 0x80 {
            i += 1;
            continue;
        }
        total += 1;
        match bytes.get(i + 1) {
            Some(&trail) => {
                if is_gb2312_pair(bytes[i], trail) {
                    hits += 1;
                }
                i += 2;
            }
            None => i += 1,
        }
    }

    if total == 0 {
        None
    } else {
        Some(hits as f32 / total as f32)
    }
}

/// `chardetng` picks the label; confidence comes from its own assessment
/// and, for GBK guesses, from how much of the text stays inside GB2312.
pub struct ChardetngDetector;

impl CharsetDetector for ChardetngDetector {
    fn detect(&self, bytes: &[u8]) -> Detection {
        if bytes.is_empty() {
            return Detection::unknown();
        }

        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return Detection {
                label: Some(encoding.name().to_string()),
                confidence: 1.0,
            };
        }

        let ratio = match gb2312_pair_ratio(bytes) {
            Some(ratio) => ratio,
            None => {
                return Detection {
                    label: Some("ascii".to_string()),
                    confidence: 1.0,
                }
            }
        };

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let (encoding, confident) = detector.guess_assess(None, true);

        if encoding == GBK {
            let label = if ratio >= 1.0 { "GB2312" } else { "GBK" };
            let factor = if confident { MAX_CONFIDENCE } else { UNASSESSED_FACTOR };
            return Detection {
                label: Some(label.to_string()),
                confidence: ratio * factor,
            };
        }

        Detection {
            label: Some(encoding.name().to_string()),
            confidence: if confident {
                MAX_CONFIDENCE
            } else {
                UNASSESSED_CONFIDENCE
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHINESE_SOURCE: &str = "// 这是一个用于测试编码转换的源文件，其中包含大量中文注释。\n\
        // 程序会读取配置文件，然后初始化日志系统并启动服务。\n\
        int main() { return 0; } // 主函数入口，返回零表示程序正常结束。\n";

    fn gb2312_bytes(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = GBK.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_pair_ratio() {
        assert_eq!(gb2312_pair_ratio(b"plain ascii"), None);
        assert_eq!(gb2312_pair_ratio(&[b'a', 0xC4, 0xE3, 0xBA, 0xC3]), Some(1.0));
        // 0x81 0x40 is GBK-only
        assert_eq!(gb2312_pair_ratio(&[0xC4, 0xE3, 0x81, 0x40]), Some(0.5));
        // dangling lead byte counts against the ratio
        assert_eq!(gb2312_pair_ratio(&[0xC4, 0xE3, 0xC4]), Some(0.5));
        // unassigned cells count against it too
        assert_eq!(gb2312_pair_ratio(&[0xC4, 0xE3, 0xAA, 0xA1]), Some(0.5));
    }

    #[test]
    fn test_gb2312_pair_table() {
        assert!(is_gb2312_pair(0xB0, 0xA1));
        assert!(is_gb2312_pair(0xF7, 0xFE));
        assert!(is_gb2312_pair(0xA2, 0xB1));
        assert!(!is_gb2312_pair(0xA2, 0xA1));
        assert!(!is_gb2312_pair(0xA2, 0xE3));
        assert!(!is_gb2312_pair(0xAF, 0xA1));
        assert!(!is_gb2312_pair(0xD7, 0xFA));
        assert!(!is_gb2312_pair(0xF8, 0xA1));
        assert!(!is_gb2312_pair(0xB0, 0x40));
    }

    #[test]
    fn test_detects_gb2312_source() {
        let detection = ChardetngDetector.detect(&gb2312_bytes(&CHINESE_SOURCE.repeat(4)));
        assert_eq!(detection.label.as_deref(), Some("GB2312"));
        assert!(detection.confidence > 0.8, "{}", detection.confidence);
    }

    #[test]
    fn test_ascii_is_not_chinese() {
        let detection = ChardetngDetector.detect(b"#include <stdio.h>\nint main() { return 0; }\n");
        assert_eq!(detection.label.as_deref(), Some("ascii"));
        assert_eq!(detection.confidence, 1.0);
    }

    #[test]
    fn test_utf8_signature_wins() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(CHINESE_SOURCE.as_bytes());
        let detection = ChardetngDetector.detect(&bytes);
        assert_eq!(detection.label.as_deref(), Some("UTF-8"));
        assert_eq!(detection.confidence, 1.0);
    }

    #[test]
    fn test_plain_utf8_chinese_is_utf8() {
        let detection = ChardetngDetector.detect(CHINESE_SOURCE.repeat(4).as_bytes());
        assert_eq!(detection.label.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(ChardetngDetector.detect(b""), Detection::unknown());
    }
}
