//! Structural and cross-record rule validation.
//!
//! Structural rules look at one parsed record in isolation: required fields,
//! formats, bounds, and key/path consistency. Cross-record rules look at the
//! whole run plus the read-only snapshot: key uniqueness, reserved names,
//! and alias resolution. Every violated rule appends one error; validation
//! of one record never halts the others, so the submitter sees everything
//! in a single run.

use crate::core::config::EngineConfig;
use crate::core::record::{Record, STATUS_VALUES};
use crate::core::snapshot::RegistrySnapshot;
use crate::core::verdict::{ErrorCode, ValidationError};
use regex::Regex;
use rustc_hash::FxHashSet;

/// DNS-label shape for record keys: lowercase alphanumerics and inner
/// hyphens, no leading/trailing hyphen.
fn key_pattern() -> Regex {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap()
}

/// Hosting-platform username shape: alphanumerics and inner hyphens.
fn identity_pattern() -> Regex {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?$").unwrap()
}

fn email_pattern() -> Regex {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
}

/// Structural rules for one parsed record at `path` with derived `key`.
pub fn validate_record(
    path: &str,
    key: &str,
    record: &Record,
    config: &EngineConfig,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !key_pattern().is_match(key) {
        errors.push(ValidationError::new(
            path,
            ErrorCode::InvalidFormat,
            format!(
                "key `{}` (from the file name) must be lowercase alphanumerics and hyphens",
                key
            ),
        ));
    }
    if key.chars().count() > config.max_key_chars {
        errors.push(ValidationError::new(
            path,
            ErrorCode::InvalidFormat,
            format!("key `{}` exceeds {} characters", key, config.max_key_chars),
        ));
    }
    if config.is_reserved(key) {
        errors.push(ValidationError::new(
            path,
            ErrorCode::ReservedKey,
            format!("`{}` is a reserved name and cannot be registered", key),
        ));
    }

    if let Some(name) = record.name.as_deref()
        && name != key
    {
        errors.push(ValidationError::new(
            path,
            ErrorCode::InvalidFormat,
            format!("body `name` is `{}` but the file name implies `{}`", name, key),
        ));
    }

    match record.owner.as_deref() {
        None | Some("") => errors.push(ValidationError::new(
            path,
            ErrorCode::MissingField,
            "`owner` is required",
        )),
        Some(owner) => {
            if !identity_pattern().is_match(owner) {
                errors.push(ValidationError::new(
                    path,
                    ErrorCode::InvalidFormat,
                    format!("`owner` value `{}` is not a valid identity", owner),
                ));
            }
        }
    }

    match record.contact.as_deref() {
        None | Some("") => errors.push(ValidationError::new(
            path,
            ErrorCode::MissingField,
            "`contact` is required",
        )),
        Some(contact) => {
            if !email_pattern().is_match(contact) {
                errors.push(ValidationError::new(
                    path,
                    ErrorCode::InvalidFormat,
                    format!("`contact` value `{}` does not look like an email address", contact),
                ));
            }
        }
    }

    match record.status.as_deref() {
        None => errors.push(ValidationError::new(
            path,
            ErrorCode::MissingField,
            "`status` is required",
        )),
        Some(status) => {
            if !STATUS_VALUES.contains(&status) {
                errors.push(ValidationError::new(
                    path,
                    ErrorCode::InvalidFormat,
                    format!(
                        "`status` must be one of {}; got `{}`",
                        STATUS_VALUES.join(", "),
                        status
                    ),
                ));
            }
        }
    }

    if let Some(description) = record.description.as_deref()
        && description.chars().count() > config.max_description_chars
    {
        errors.push(ValidationError::new(
            path,
            ErrorCode::InvalidFormat,
            format!(
                "`description` exceeds {} characters",
                config.max_description_chars
            ),
        ));
    }

    for maintainer in &record.maintainers {
        if maintainer.is_empty() || !identity_pattern().is_match(maintainer) {
            errors.push(ValidationError::new(
                path,
                ErrorCode::InvalidFormat,
                format!("`maintainers` entry `{}` is not a valid identity", maintainer),
            ));
        }
    }

    for alias in &record.aliases {
        if !key_pattern().is_match(alias) {
            errors.push(ValidationError::new(
                path,
                ErrorCode::InvalidFormat,
                format!("`aliases` entry `{}` is not a valid record key", alias),
            ));
        }
    }

    errors
}

/// One successfully parsed record in this run, as seen by cross-record rules.
pub struct ParsedChange<'a> {
    pub path: &'a str,
    pub key: &'a str,
    pub record: &'a Record,
    /// True for additions (including the add half of a rename); only
    /// additions can collide with existing keys.
    pub is_addition: bool,
}

/// Cross-record rules: uniqueness over run + snapshot, and alias resolution.
///
/// `changes` must be ordered by path so the duplicate error lands on the
/// second record deterministically. `vacated_keys` holds keys freed by this
/// run (removals and rename sources); an addition may take over a vacated
/// key.
pub fn validate_cross_record(
    changes: &[ParsedChange<'_>],
    snapshot: &RegistrySnapshot,
    vacated_keys: &FxHashSet<String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Keys that will exist after the run, for alias resolution.
    let mut live_keys: FxHashSet<String> = changes.iter().map(|c| c.key.to_string()).collect();

    let mut seen_additions: FxHashSet<&str> = FxHashSet::default();
    for change in changes {
        if !change.is_addition {
            continue;
        }
        if seen_additions.contains(change.key) {
            errors.push(ValidationError::new(
                change.path,
                ErrorCode::DuplicateKey,
                format!("key `{}` is already added earlier in this proposal", change.key),
            ));
            continue;
        }
        seen_additions.insert(change.key);

        if let Some(existing_path) = snapshot.path_for_key(change.key)
            && existing_path != change.path
            && !vacated_keys.contains(change.key)
        {
            errors.push(ValidationError::new(
                change.path,
                ErrorCode::DuplicateKey,
                format!("key `{}` is already registered at {}", change.key, existing_path),
            ));
        }
    }

    // Snapshot keys that survive this run are valid alias targets too.
    live_keys.extend(
        snapshot
            .keys()
            .filter(|k| !vacated_keys.contains(*k))
            .map(str::to_string),
    );

    for change in changes {
        for alias in &change.record.aliases {
            if alias == change.key {
                errors.push(ValidationError::new(
                    change.path,
                    ErrorCode::InvalidFormat,
                    format!("`aliases` entry `{}` points at the record itself", alias),
                ));
            } else if !live_keys.contains(alias.as_str()) {
                errors.push(ValidationError::new(
                    change.path,
                    ErrorCode::InvalidFormat,
                    format!("`aliases` entry `{}` does not match any registered record", alias),
                ));
            }
        }
    }

    errors
}
