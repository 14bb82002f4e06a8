//! Commit-status description rendering.
//!
//! Hosting platforms cap status descriptions; 140 characters is the common
//! bound. The failure summary folds the verdict's error list into one line
//! that never exceeds that bound: a problem count, the first error messages
//! prefixed with their codes, and an overflow counter for the rest.

use crate::core::artifact::ArtifactError;

pub const STATUS_DESCRIPTION_LIMIT: usize = 140;

const ELLIPSIS: &str = "...";
const PREVIEWED_ERRORS: usize = 2;
const PREVIEW_MESSAGE_CHARS: usize = 80;

/// Collapse whitespace runs and bound to `max_chars`, ellipsis included.
pub fn compact(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let kept: String = collapsed
        .chars()
        .take(max_chars.saturating_sub(ELLIPSIS.len()))
        .collect();
    format!("{kept}{ELLIPSIS}")
}

/// One-line failure description for the commit status, bounded to
/// [`STATUS_DESCRIPTION_LIMIT`] characters.
pub fn failure_description(errors: &[ArtifactError]) -> String {
    let shown = errors
        .iter()
        .take(PREVIEWED_ERRORS)
        .map(|e| compact(&format!("{}: {}", e.code, e.message), PREVIEW_MESSAGE_CHARS))
        .collect::<Vec<_>>()
        .join(" | ");
    let overflow = errors.len().saturating_sub(PREVIEWED_ERRORS);
    let line = if overflow > 0 {
        format!("{} problem(s): {} (+{} more)", errors.len(), shown, overflow)
    } else {
        format!("{} problem(s): {}", errors.len(), shown)
    };
    compact(&line, STATUS_DESCRIPTION_LIMIT)
}
