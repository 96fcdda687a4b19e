use crate::config::SourceEncoding;
use crate::detect::{is_gb2312_pair, EncodingVerdict};
use crate::error::Error;
use crate::guard;
use crate::platform::{self, WritePermission};
use encoding_rs::{DecoderResult, Encoding, GBK, REPLACEMENT};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const UTF8_SIGNATURE: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub success: bool,
    pub message: String,
}

impl ConversionOutcome {
    pub fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Rewrites legacy Chinese files in place as UTF-8 with a signature.
pub struct Converter {
    source_encoding: SourceEncoding,
    permissions: Box<dyn WritePermission>,
}

impl Converter {
    pub fn new(source_encoding: SourceEncoding) -> Self {
        Self::with_permissions(source_encoding, platform::host_permissions())
    }

    pub fn with_permissions(
        source_encoding: SourceEncoding,
        permissions: Box<dyn WritePermission>,
    ) -> Self {
        Self {
            source_encoding,
            permissions,
        }
    }

    pub fn source_encoding(&self) -> SourceEncoding {
        self.source_encoding
    }

    /// One-shot conversion; every failure is folded into the outcome.
    pub fn convert(&self, path: &Path, verdict: &EncodingVerdict) -> ConversionOutcome {
        guard::ensure_writable(path, self.permissions.as_ref());

        let source_label = match self.source_encoding {
            SourceEncoding::Gb2312 => "GB2312",
            SourceEncoding::Detected => verdict.label(),
        };

        match self.rewrite(path, source_label) {
            Ok(()) => {
                info!("Converted {} from {} to UTF-8", path.display(), source_label);
                ConversionOutcome::ok(format!(
                    "path {}: encoding converted from {} to UTF-8 (signature)",
                    path.display(),
                    source_label
                ))
            }
            Err(err) => {
                debug!("Conversion of {} failed: {}", path.display(), err);
                ConversionOutcome::failed(format!(
                    "path {}: conversion failed: {}",
                    path.display(),
                    err
                ))
            }
        }
    }

    fn rewrite(&self, path: &Path, source_label: &str) -> Result<(), Error> {
        let bytes = fs::read(path)?;
        let text = match self.source_encoding {
            SourceEncoding::Gb2312 => decode_gb2312(&bytes)?,
            SourceEncoding::Detected => decode_as(&bytes, source_label)?,
        };
        write_replacing(path, &encode_utf8_signature(&text))
    }
}

/// Strict GB2312 (EUC-CN): every non-ASCII byte must start a GB2312 pair.
/// GBK decodes that subset identically.
pub fn decode_gb2312(bytes: &[u8]) -> Result<String, Error> {
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] < 0x80 {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(&trail) if is_gb2312_pair(bytes[i], trail) => i += 2,
            _ => {
                return Err(Error::Decode {
                    encoding: "GB2312".to_string(),
                    offset: i,
                })
            }
        }
    }

    decode_strict(GBK, bytes).map_err(|err| match err {
        Error::Decode { offset, .. } => Error::Decode {
            encoding: "GB2312".to_string(),
            offset,
        },
        other => other,
    })
}

/// Decode under a legacy label known to `encoding_rs`.
pub fn decode_as(bytes: &[u8], label: &str) -> Result<String, Error> {
    let encoding = Encoding::for_label(label.as_bytes())
        .filter(|encoding| *encoding != REPLACEMENT)
        .ok_or_else(|| Error::UnsupportedEncoding(label.to_string()))?;
    decode_strict(encoding, bytes)
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, Error> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .ok_or_else(|| Error::Other("input too large to decode".to_string()))?;
    let mut text = String::with_capacity(capacity);

    let (result, read) = decoder.decode_to_string_without_replacement(bytes, &mut text, true);
    match result {
        DecoderResult::InputEmpty => Ok(text),
        DecoderResult::Malformed(bad, after) => Err(Error::Decode {
            encoding: encoding.name().to_string(),
            offset: read - bad as usize - after as usize,
        }),
        DecoderResult::OutputFull => Err(Error::Other(
            "decoder ran out of output space".to_string(),
        )),
    }
}

pub fn encode_utf8_signature(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(UTF8_SIGNATURE.len() + text.len());
    out.extend_from_slice(&UTF8_SIGNATURE);
    out.extend_from_slice(text.as_bytes());
    out
}

/// Write to a temp file beside the real target, then rename it over the
/// target. Symlinks are resolved first so the link survives and its target
/// is rewritten. A failure before the rename leaves the target untouched.
fn write_replacing(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let target = fs::canonicalize(path)?;
    let permissions = fs::metadata(&target)?.permissions();
    let dir = target.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(&target).map_err(|err| Error::Io(err.error))?;
    Ok(())
}
