//! Registry record schema and loader.
//!
//! One record file describes one owned entity (a whois-style entry). The
//! record embeds its own ownership information; there is no central ACL
//! store. Fields are deserialized loosely (everything optional) so that a
//! syntactically valid file with missing or malformed fields reaches the
//! rule validator and yields precise `missing_field` / `invalid_format`
//! errors instead of one opaque parse failure. Unknown fields are rejected
//! at parse time: the registry has exactly one record shape.

use serde::{Deserialize, Serialize};

/// Allowed values for the `status` field.
pub const STATUS_VALUES: [&str; 3] = ["active", "parked", "reserved"];

/// A parsed registry record.
///
/// The record's key is derived from its file path (the file stem); the body
/// `name`, when present, must match it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Record {
    /// Registrable name; must equal the path-derived key when present.
    pub name: Option<String>,
    /// Owner identity (hosting-platform username). The authorization gate
    /// compares the submitter against this field.
    pub owner: Option<String>,
    /// Identities delegated by the owner to modify (not delete) the record.
    pub maintainers: Vec<String>,
    /// Contact email for the owner.
    pub contact: Option<String>,
    /// Lifecycle status; one of [`STATUS_VALUES`].
    pub status: Option<String>,
    pub description: Option<String>,
    /// Keys of other records this record points at.
    pub aliases: Vec<String>,
}

/// Derive the record key from a file path: the stem of the final component.
///
/// `registry/acme.json` → `acme`. Returns `None` for paths without a usable
/// stem (dotfiles, bare directories).
pub fn key_from_path(path: &str) -> Option<String> {
    let file = path.rsplit('/').next()?;
    let stem = file.strip_suffix(&format!(".{}", file.rsplit('.').next()?))?;
    if stem.is_empty() { None } else { Some(stem.to_string()) }
}

/// Parse file content as a registry record.
///
/// The error string is the human-readable reason carried by the resulting
/// `parse_error`; classification happens in the engine.
pub fn parse_record(content: &str) -> Result<Record, String> {
    // Reject non-object top levels with a clearer message than serde's.
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| format!("malformed JSON: {}", e))?;
    if !value.is_object() {
        return Err("top-level value must be a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| format!("unexpected record shape: {}", e))
}
