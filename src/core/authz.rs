//! Authorization checks: who may change which record.
//!
//! Ownership is embedded in the records themselves; there is no central ACL
//! store. Every check therefore diffs against the *prior* record from the
//! registry snapshot, never against the proposed content alone. This gate is
//! the only thing standing between one party and another party's registry
//! entry. Identity comparison is case-insensitive because hosting-platform
//! usernames are.

use crate::core::record::Record;
use crate::core::verdict::{ErrorCode, ValidationError};

fn identity_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn is_owner(record: &Record, identity: &str) -> bool {
    record
        .owner
        .as_deref()
        .is_some_and(|owner| identity_eq(owner, identity))
}

fn is_delegated(record: &Record, identity: &str) -> bool {
    record
        .maintainers
        .iter()
        .any(|m| identity_eq(m, identity))
}

/// Added record: the submitter must register themselves as owner.
pub fn check_added(path: &str, record: &Record, submitter: &str) -> Vec<ValidationError> {
    match record.owner.as_deref() {
        // Missing owner is reported by the rule validator; no authorization
        // decision can be made about it here.
        None | Some("") => Vec::new(),
        Some(owner) if identity_eq(owner, submitter) => Vec::new(),
        Some(owner) => vec![ValidationError::new(
            path,
            ErrorCode::UnauthorizedCreate,
            format!(
                "new records must be self-registered: submitter `{}` cannot create a record owned by `{}`",
                submitter, owner
            ),
        )],
    }
}

/// Modified record: prior owner or a delegated maintainer may edit; only the
/// prior owner may change the `owner` field itself.
pub fn check_modified(
    path: &str,
    prior: &Record,
    new: &Record,
    submitter: &str,
) -> Vec<ValidationError> {
    if prior.owner.as_deref().is_none_or(str::is_empty) {
        // Prior record without an owner cannot authorize anyone.
        return vec![ValidationError::new(
            path,
            ErrorCode::InternalError,
            "prior record has no owner; refusing to authorize the change",
        )];
    }

    if !is_owner(prior, submitter) && !is_delegated(prior, submitter) {
        return vec![ValidationError::new(
            path,
            ErrorCode::UnauthorizedModify,
            format!(
                "submitter `{}` is neither the owner nor a delegated maintainer of this record",
                submitter
            ),
        )];
    }

    let owner_changed = match (prior.owner.as_deref(), new.owner.as_deref()) {
        (Some(a), Some(b)) => !identity_eq(a, b),
        (Some(_), None) => true,
        _ => false,
    };
    if owner_changed && !is_owner(prior, submitter) {
        return vec![ValidationError::new(
            path,
            ErrorCode::UnauthorizedModify,
            format!(
                "only the current owner may transfer ownership; `{}` is a delegated maintainer",
                submitter
            ),
        )];
    }

    Vec::new()
}

/// Removed record: only the prior owner may delete. Delegation does not
/// extend to deletion.
pub fn check_removed(path: &str, prior: &Record, submitter: &str) -> Vec<ValidationError> {
    if prior.owner.as_deref().is_none_or(str::is_empty) {
        return vec![ValidationError::new(
            path,
            ErrorCode::InternalError,
            "prior record has no owner; refusing to authorize the deletion",
        )];
    }
    if is_owner(prior, submitter) {
        return Vec::new();
    }
    vec![ValidationError::new(
        path,
        ErrorCode::UnauthorizedDelete,
        format!("submitter `{}` is not the owner of this record", submitter),
    )]
}
