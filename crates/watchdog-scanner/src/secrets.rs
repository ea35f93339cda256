//! Credential / secrets detection.
//!
//! The known-detector path shells out to an external credential scanner
//! (API-key and token signatures it maintains); anything that scanner
//! doesn't recognize but still looks opaque is caught by the entropy
//! fallback in [`crate::entropy`]. Every detection here is NEVER_SHARE —
//! there is no classification lookup for secrets the way there is for
//! structural PII.

use std::io::Write as _;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::entropy::{self, DEFAULT_ENTROPY_THRESHOLD};
use crate::error::ScanStageError;

/// Confidence assigned to a known-format credential match.
pub const KNOWN_DETECTOR_CONFIDENCE: f64 = 0.80;
/// Confidence assigned to a high-entropy fallback match.
pub const ENTROPY_FALLBACK_CONFIDENCE: f64 = 0.50;

/// One detection from the external credential scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialDetection {
    pub detector: String,
    pub offset: usize,
    pub length: usize,
}

/// A secrets-stage finding, after the entropy fallback has been folded
/// in alongside the scanner's own detections.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretFinding {
    pub detector: String,
    pub offset_start: usize,
    pub offset_end: usize,
    pub confidence: f64,
}

/// Runs the external credential scanner over content. Implemented over
/// a subprocess in production; an in-memory fake backs pipeline tests.
#[async_trait]
pub trait CredentialScanner: Send + Sync {
    async fn scan(&self, content: &str) -> Result<Vec<CredentialDetection>, ScanStageError>;
}

/// Invokes a credential-scanning subprocess that reads a temporary file
/// and writes a JSON detection list to stdout.
pub struct SubprocessCredentialScanner {
    program: String,
    timeout: Duration,
}

impl SubprocessCredentialScanner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        SubprocessCredentialScanner {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CredentialScanner for SubprocessCredentialScanner {
    async fn scan(&self, content: &str) -> Result<Vec<CredentialDetection>, ScanStageError> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        let path = file.path().to_path_buf();
        let run = Command::new(&self.program)
            .arg(&path)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| ScanStageError::Timeout(self.timeout.as_millis() as u64))??;

        // Dropping `file` after this point removes the temporary file on
        // every exit path, success or failure.
        if !output.status.success() {
            return Err(ScanStageError::SubprocessFailed(
                output.status.code().unwrap_or(-1),
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ScanStageError::InvalidResponse(e.to_string()))
    }
}

/// Runs the known-detector scan and the entropy fallback, returning a
/// combined finding list. The entropy fallback only considers the
/// substrings the known-detector path didn't already flag, so the same
/// secret never appears twice with different confidences.
pub async fn run_secrets_stage(
    scanner: &dyn CredentialScanner,
    content: &str,
) -> Result<Vec<SecretFinding>, ScanStageError> {
    let detections = scanner.scan(content).await?;

    let mut findings: Vec<SecretFinding> = detections
        .into_iter()
        .map(|d| SecretFinding {
            detector: d.detector,
            offset_start: d.offset,
            offset_end: d.offset + d.length,
            confidence: KNOWN_DETECTOR_CONFIDENCE,
        })
        .collect();

    findings.extend(entropy_fallback(content, &findings));
    Ok(findings)
}

/// Slides a fixed window over `content`, flagging high-entropy segments
/// not already covered by a known-detector finding.
fn entropy_fallback(content: &str, known: &[SecretFinding]) -> Vec<SecretFinding> {
    const WINDOW: usize = 24;
    let chars: Vec<char> = content.chars().collect();
    if chars.len() < WINDOW {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut cursor = 0;
    while cursor + WINDOW <= chars.len() {
        let window: String = chars[cursor..cursor + WINDOW].iter().collect();
        if entropy::is_high_entropy(&window, DEFAULT_ENTROPY_THRESHOLD)
            && !overlaps_any(cursor, cursor + WINDOW, known)
        {
            out.push(SecretFinding {
                detector: "entropy_fallback".to_string(),
                offset_start: cursor,
                offset_end: cursor + WINDOW,
                confidence: ENTROPY_FALLBACK_CONFIDENCE,
            });
            cursor += WINDOW;
        } else {
            cursor += 1;
        }
    }
    out
}

fn overlaps_any(start: usize, end: usize, findings: &[SecretFinding]) -> bool {
    findings
        .iter()
        .any(|f| start < f.offset_end && f.offset_start < end)
}
