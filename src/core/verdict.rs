//! Verdict types and result aggregation.
//!
//! All per-file outcomes funnel into one `ValidationResult`. Ordering is
//! stable (file path, then discovery order within the file), the report is a
//! pure function of the ordered error list, and nothing here is mutated
//! after construction, so identical input always produces a byte-identical
//! verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed error taxonomy. Codes are wire-stable identifiers, not messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ParseError,
    MissingField,
    InvalidFormat,
    DuplicateKey,
    ReservedKey,
    UnauthorizedCreate,
    UnauthorizedModify,
    UnauthorizedDelete,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ParseError => "parse_error",
            Self::MissingField => "missing_field",
            Self::InvalidFormat => "invalid_format",
            Self::DuplicateKey => "duplicate_key",
            Self::ReservedKey => "reserved_key",
            Self::UnauthorizedCreate => "unauthorized_create",
            Self::UnauthorizedModify => "unauthorized_modify",
            Self::UnauthorizedDelete => "unauthorized_delete",
            Self::InternalError => "internal_error",
        };
        write!(f, "{}", s)
    }
}

/// Only `Error` severity fails the run; warnings surface in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub file: String,
    pub code: ErrorCode,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(file: &str, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            code,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(file: &str, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            code,
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// The single verdict of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub report: String,
}

impl ValidationResult {
    /// Merge accumulated errors into the final ordered verdict.
    ///
    /// The sort is stable and keyed on file path only, so discovery order
    /// within a file is preserved.
    pub fn aggregate(mut errors: Vec<ValidationError>) -> Self {
        errors.sort_by(|a, b| a.file.cmp(&b.file));
        let is_valid = !errors.iter().any(|e| e.severity == Severity::Error);
        let report = render_report(is_valid, &errors, false);
        Self {
            is_valid,
            errors,
            report,
        }
    }

    /// Passing verdict for a proposal that touches no registry files.
    pub fn no_changes() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            report: render_report(true, &[], true),
        }
    }

    /// Conservative failing verdict for an engine-level failure.
    ///
    /// An engine failure must never read as a pass, so this carries one
    /// `internal_error` and a generic report.
    pub fn internal_failure(message: &str) -> Self {
        let errors = vec![ValidationError::new("", ErrorCode::InternalError, message)];
        let report = format!(
            "# Registry gate report\n\n**FAILED** - the validation engine could not complete \
             this run. This is not a problem with your records; a maintainer should look at \
             the run logs.\n\n- `internal_error`: {}\n",
            message
        );
        Self {
            is_valid: false,
            errors,
            report,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count()
    }
}

/// Render the fixed-format markdown report. Deterministic: depends only on
/// the ordered error list and the verdict flag.
fn render_report(is_valid: bool, errors: &[ValidationError], empty_diff: bool) -> String {
    let mut out = String::from("# Registry gate report\n\n");

    if empty_diff {
        out.push_str("**PASSED** - no registry changes in this proposal.\n");
        return out;
    }

    let error_count = errors.iter().filter(|e| e.severity == Severity::Error).count();
    let warning_count = errors.len() - error_count;
    let mut files: Vec<&str> = errors.iter().map(|e| e.file.as_str()).collect();
    files.dedup();
    let file_count = files.len();

    if is_valid && errors.is_empty() {
        out.push_str("**PASSED** - no violations.\n");
        return out;
    }

    if is_valid {
        out.push_str(&format!(
            "**PASSED** - 0 error(s), {} warning(s) across {} file(s).\n",
            warning_count, file_count
        ));
    } else {
        out.push_str(&format!(
            "**FAILED** - {} error(s), {} warning(s) across {} file(s).\n",
            error_count, warning_count, file_count
        ));
    }

    let mut current_file: Option<&str> = None;
    for error in errors {
        if current_file != Some(error.file.as_str()) {
            out.push_str(&format!("\n### {}\n", error.file));
            current_file = Some(error.file.as_str());
        }
        let tag = match error.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        out.push_str(&format!("- `{}` ({}): {}\n", error.code, tag, error.message));
    }

    out
}
