//! Engine configuration loaded from `portcullis.toml`.
//!
//! The config describes the registry layout (which directory holds record
//! files and what extension they carry), the reserved-key list, and the
//! field bounds enforced by the rule validator. A missing config file is not
//! an error; every knob has a default.

use crate::core::error::PortcullisError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "portcullis.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory (relative to the repository root) holding record files.
    pub record_dir: String,
    /// File extension of record files, without the leading dot.
    pub record_ext: String,
    /// Keys that may never be registered.
    pub reserved_keys: Vec<String>,
    /// Upper bound on the `description` field, in characters.
    pub max_description_chars: usize,
    /// Upper bound on a record key, in characters (DNS label limit).
    pub max_key_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            record_dir: "registry".to_string(),
            record_ext: "json".to_string(),
            reserved_keys: vec![
                "www".to_string(),
                "api".to_string(),
                "mail".to_string(),
                "ns1".to_string(),
                "ns2".to_string(),
                "root".to_string(),
                "admin".to_string(),
                "registry".to_string(),
            ],
            max_description_chars: 256,
            max_key_chars: 63,
        }
    }
}

impl EngineConfig {
    /// Relative path prefix all in-scope record files must live under.
    pub fn record_prefix(&self) -> String {
        format!("{}/", self.record_dir.trim_end_matches('/'))
    }

    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_keys.iter().any(|r| r.eq_ignore_ascii_case(key))
    }
}

/// Load the engine config from an explicit path, or fall back to defaults.
///
/// An explicit path that does not exist is an error (the operator asked for
/// it); `None` means "use `portcullis.toml` beside the registry if present,
/// defaults otherwise".
pub fn load_config(explicit: Option<&Path>, registry_root: &Path) -> Result<EngineConfig, PortcullisError> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                return Err(PortcullisError::NotFound(format!(
                    "config file {} does not exist",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => {
            let candidate = registry_root.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(EngineConfig::default());
            }
            candidate
        }
    };

    let content = fs::read_to_string(&path).map_err(PortcullisError::IoError)?;
    let config: EngineConfig = toml::from_str(&content)
        .map_err(|e| PortcullisError::ConfigError(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}
