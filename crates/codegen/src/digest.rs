//! SHA-256 trailers on generated artifacts.

use crate::OutputFormat;
use sha2::{Digest, Sha256};
use std::path::Path;

const MARKER: &str = "SHA-256: ";

/// Lower-case hex SHA-256 of `text`.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Appends the trailer line for `format`, hashing exactly `body`.
pub fn append_digest(body: &str, format: OutputFormat) -> String {
    let hash = sha256_hex(body);
    let (open, close) = format.comment_delimiters();
    let mut out = String::with_capacity(body.len() + hash.len() + 24);
    out.push_str(body);
    out.push('\n');
    out.push_str(open);
    out.push_str(MARKER);
    out.push_str(&hash);
    out.push_str(close);
    out
}

/// Outcome of checking a generated artifact against its trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestStatus {
    Valid,
    Mismatch { expected: String, actual: String },
    Missing,
    FileMissing,
}

impl DigestStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, DigestStatus::Valid)
    }
}

/// Re-hashes everything before the last newline and compares it with the digest on the
/// final line.
pub fn verify_digest(text: &str) -> DigestStatus {
    let Some((body, last_line)) = text.rsplit_once('\n') else {
        return DigestStatus::Missing;
    };
    let Some(expected) = find_digest(last_line) else {
        return DigestStatus::Missing;
    };

    let actual = sha256_hex(body);
    if actual == expected {
        DigestStatus::Valid
    } else {
        DigestStatus::Mismatch {
            expected: expected.to_string(),
            actual,
        }
    }
}

/// [`verify_digest`] on a file. A missing file is a status, other read failures are errors.
pub fn verify_file(path: &Path) -> std::io::Result<DigestStatus> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(verify_digest(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DigestStatus::FileMissing),
        Err(e) => Err(e),
    }
}

fn find_digest(line: &str) -> Option<&str> {
    let start = line.find(MARKER)? + MARKER.len();
    let rest = &line[start..];
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}
