//! Result artifact: the serialized form of a verdict.
//!
//! The orchestrator reads this artifact back to drive feedback
//! reconciliation and the commit status, so its field names are a wire
//! contract (camelCase envelope, snake_case error codes). The artifact also
//! carries a SHA-256 digest of the report, which the reconciler embeds in
//! comment markers to recognize its own output and skip no-op updates.

use crate::core::error::PortcullisError;
use crate::core::verdict::{ErrorCode, Severity, ValidationResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactError {
    pub code: ErrorCode,
    pub message: String,
    pub file: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultArtifact {
    pub is_valid: bool,
    pub errors: Vec<ArtifactError>,
    pub report: String,
    pub report_digest: String,
}

pub fn report_digest(report: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(report.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl ResultArtifact {
    pub fn from_result(result: &ValidationResult) -> Self {
        Self {
            is_valid: result.is_valid,
            errors: result
                .errors
                .iter()
                .map(|e| ArtifactError {
                    code: e.code,
                    message: e.message.clone(),
                    file: e.file.clone(),
                    severity: e.severity,
                })
                .collect(),
            report: result.report.clone(),
            report_digest: report_digest(&result.report),
        }
    }
}

pub fn write_artifact(path: &Path, artifact: &ResultArtifact) -> Result<(), PortcullisError> {
    let mut body = serde_json::to_string_pretty(artifact)?;
    body.push('\n');
    fs::write(path, body).map_err(PortcullisError::IoError)
}

/// Read an artifact back. Unreadable or undecodable artifacts are hard
/// errors: a missing verdict must fail the run, never be skipped.
pub fn read_artifact(path: &Path) -> Result<ResultArtifact, PortcullisError> {
    let content = fs::read_to_string(path).map_err(|e| {
        PortcullisError::NotFound(format!("result artifact {}: {}", path.display(), e))
    })?;
    let artifact: ResultArtifact = serde_json::from_str(&content)?;
    Ok(artifact)
}

/// Wire contract description for orchestrator authors.
pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "artifact",
        "version": "1.0.0",
        "description": "Serialized verdict of one validation run",
        "fields": {
            "isValid": "bool; false iff any error-severity entry exists",
            "errors": [{ "code": "closed taxonomy", "message": "human text", "file": "registry-relative path", "severity": "error|warning" }],
            "report": "deterministic markdown report",
            "reportDigest": "sha256 hex of report"
        }
    })
}
