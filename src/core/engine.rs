//! The record validation engine: one pure pipeline per proposal.
//!
//! Diff filter → record loader → rule validator + authorization checker
//! (per file, in parallel) → cross-record rules → result aggregation. The
//! engine performs no I/O; the proposal and the registry snapshot arrive
//! fully resolved, and the verdict leaves as one immutable value. Per-file
//! checks run under rayon after the snapshot index is built, so parallelism
//! never touches shared mutable state and the verdict stays deterministic.

use crate::core::authz;
use crate::core::config::EngineConfig;
use crate::core::proposal::{ChangeKind, ChangedFile, ProposalContext};
use crate::core::record::{self, Record};
use crate::core::rules::{self, ParsedChange};
use crate::core::snapshot::RegistrySnapshot;
use crate::core::verdict::{ErrorCode, ValidationError, ValidationResult};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

/// A record parsed from this run, owned, for the cross-record pass.
struct ParsedFile {
    path: String,
    key: String,
    record: Record,
    is_addition: bool,
}

struct FileOutcome {
    errors: Vec<ValidationError>,
    parsed: Option<ParsedFile>,
}

/// True if `path` is a registry record file: under the record directory
/// with the record extension.
pub fn in_scope(path: &str, config: &EngineConfig) -> bool {
    let prefix = config.record_prefix();
    let Some(rest) = path.strip_prefix(&prefix) else {
        return false;
    };
    let suffix = format!(".{}", config.record_ext);
    rest.ends_with(&suffix)
        && rest
            .rsplit('/')
            .next()
            .is_some_and(|file| file.len() > suffix.len())
}

/// Select the changed files the engine cares about. Everything else in the
/// proposal is ignored entirely; unrelated content is never an error.
pub fn filter_in_scope<'a>(
    files: &'a [ChangedFile],
    config: &EngineConfig,
) -> Vec<&'a ChangedFile> {
    files
        .iter()
        .filter(|f| {
            in_scope(&f.path, config)
                || (f.kind == ChangeKind::Renamed
                    && f.prior_path.as_deref().is_some_and(|p| in_scope(p, config)))
        })
        .collect()
}

/// Run the full validation pipeline for one proposal.
pub fn run_check(
    proposal: &ProposalContext,
    snapshot: &RegistrySnapshot,
    config: &EngineConfig,
) -> ValidationResult {
    let in_scope_files = filter_in_scope(&proposal.changed_files, config);
    if in_scope_files.is_empty() {
        return ValidationResult::no_changes();
    }

    // Keys freed by this run; an addition may take over a vacated key.
    let mut vacated_keys: FxHashSet<String> = FxHashSet::default();
    for file in &in_scope_files {
        let freed_path = match file.kind {
            ChangeKind::Removed => Some(file.path.as_str()),
            ChangeKind::Renamed => file.prior_path.as_deref(),
            _ => None,
        };
        if let Some(path) = freed_path
            && in_scope(path, config)
            && let Some(key) = record::key_from_path(path)
        {
            vacated_keys.insert(key);
        }
    }

    // Per-file phase. The snapshot and config are read-only from here on.
    let outcomes: Vec<FileOutcome> = in_scope_files
        .par_iter()
        .map(|file| check_file(file, &proposal.submitter, snapshot, config))
        .collect();

    let mut errors: Vec<ValidationError> = Vec::new();
    let mut parsed: Vec<&ParsedFile> = Vec::new();
    for outcome in &outcomes {
        errors.extend(outcome.errors.iter().cloned());
        if let Some(p) = &outcome.parsed {
            parsed.push(p);
        }
    }

    // Cross-record phase, over path-ordered parsed records.
    parsed.sort_by(|a, b| a.path.cmp(&b.path));
    let changes: Vec<ParsedChange<'_>> = parsed
        .iter()
        .map(|p| ParsedChange {
            path: &p.path,
            key: &p.key,
            record: &p.record,
            is_addition: p.is_addition,
        })
        .collect();
    errors.extend(rules::validate_cross_record(&changes, snapshot, &vacated_keys));

    ValidationResult::aggregate(errors)
}

fn check_file(
    file: &ChangedFile,
    submitter: &str,
    snapshot: &RegistrySnapshot,
    config: &EngineConfig,
) -> FileOutcome {
    let mut errors = Vec::new();
    let mut parsed = None;

    // Remove side: plain removals and the vacating half of a rename.
    match file.kind {
        ChangeKind::Removed => {
            check_prior_side(&file.path, submitter, snapshot, &mut errors);
            return FileOutcome { errors, parsed };
        }
        ChangeKind::Renamed => match file.prior_path.as_deref() {
            Some(prior_path) if in_scope(prior_path, config) => {
                check_prior_side(prior_path, submitter, snapshot, &mut errors);
            }
            Some(_) => {}
            None => {
                errors.push(ValidationError::new(
                    &file.path,
                    ErrorCode::InternalError,
                    "rename without a prior path in the changed-file list",
                ));
                return FileOutcome { errors, parsed };
            }
        },
        ChangeKind::Added | ChangeKind::Modified => {}
    }

    // A rename out of the registry directory is only a removal.
    if !in_scope(&file.path, config) {
        return FileOutcome { errors, parsed };
    }

    let Some(key) = record::key_from_path(&file.path) else {
        errors.push(ValidationError::new(
            &file.path,
            ErrorCode::InvalidFormat,
            "cannot derive a record key from the file name",
        ));
        return FileOutcome { errors, parsed };
    };

    let Some(content) = file.new_content.as_deref() else {
        errors.push(ValidationError::new(
            &file.path,
            ErrorCode::ParseError,
            "no content provided for a non-removed change",
        ));
        return FileOutcome { errors, parsed };
    };

    let new_record = match record::parse_record(content) {
        Ok(r) => r,
        Err(reason) => {
            errors.push(ValidationError::new(&file.path, ErrorCode::ParseError, reason));
            return FileOutcome { errors, parsed };
        }
    };

    errors.extend(rules::validate_record(&file.path, &key, &new_record, config));

    match file.kind {
        ChangeKind::Added | ChangeKind::Renamed => {
            errors.extend(authz::check_added(&file.path, &new_record, submitter));
        }
        ChangeKind::Modified => match snapshot.prior(&file.path) {
            Some(prior) => {
                errors.extend(authz::check_modified(&file.path, prior, &new_record, submitter));
            }
            None => {
                errors.push(ValidationError::new(
                    &file.path,
                    ErrorCode::InternalError,
                    "modified file has no prior record in the registry snapshot",
                ));
            }
        },
        ChangeKind::Removed => unreachable!("removals return early"),
    }

    parsed = Some(ParsedFile {
        path: file.path.clone(),
        key,
        record: new_record,
        is_addition: matches!(file.kind, ChangeKind::Added | ChangeKind::Renamed),
    });

    FileOutcome { errors, parsed }
}

fn check_prior_side(
    prior_path: &str,
    submitter: &str,
    snapshot: &RegistrySnapshot,
    errors: &mut Vec<ValidationError>,
) {
    match snapshot.prior(prior_path) {
        Some(prior) => errors.extend(authz::check_removed(prior_path, prior, submitter)),
        None => errors.push(ValidationError::new(
            prior_path,
            ErrorCode::InternalError,
            "removed file has no prior record in the registry snapshot",
        )),
    }
}
