//! Read-only snapshot of the existing registry.
//!
//! Built once per run, before any per-file validation, so the uniqueness
//! index can be shared immutably across parallel per-file checks. The
//! snapshot is the engine's only view of prior state: authorization checks
//! diff against the prior record found here, never against mutable global
//! state.

use crate::core::config::EngineConfig;
use crate::core::error::PortcullisError;
use crate::core::record::{self, Record};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    /// Prior records keyed by registry-relative path (`registry/acme.json`).
    records: FxHashMap<String, Record>,
    /// Uniqueness index: record key → registry-relative path.
    keys: FxHashMap<String, String>,
}

impl RegistrySnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a prior record under its registry-relative path.
    pub fn insert(&mut self, path: &str, record: Record) {
        if let Some(key) = record::key_from_path(path) {
            self.keys.insert(key, path.to_string());
        }
        self.records.insert(path.to_string(), record);
    }

    /// Prior record for a registry-relative path, if one exists.
    pub fn prior(&self, path: &str) -> Option<&Record> {
        self.records.get(path)
    }

    /// Path currently holding `key`, if any.
    pub fn path_for_key(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }

    /// All keys currently registered in the snapshot.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load the registry snapshot from a checked-out repository root.
    ///
    /// Walks `<record_dir>/` recursively and reads every `.<record_ext>`
    /// file. An unreadable or undecodable prior record is a snapshot error:
    /// the engine cannot make authorization decisions against state it
    /// cannot read, so the caller must fall back to a conservative failing
    /// verdict.
    pub fn load(repo_root: &Path, config: &EngineConfig) -> Result<Self, PortcullisError> {
        let dir = repo_root.join(&config.record_dir);
        let mut snapshot = Self::empty();
        if !dir.is_dir() {
            // A repository without a registry directory has an empty registry.
            return Ok(snapshot);
        }

        let mut paths = Vec::new();
        collect_record_files(&dir, &config.record_ext, &mut paths)?;
        paths.sort();

        for path in paths {
            let rel = path
                .strip_prefix(repo_root)
                .ok()
                .and_then(|p| p.to_str())
                .map(|p| p.replace('\\', "/"))
                .ok_or_else(|| {
                    PortcullisError::SnapshotError(format!(
                        "non-UTF-8 record path under {}",
                        dir.display()
                    ))
                })?;
            let content = fs::read_to_string(&path).map_err(|e| {
                PortcullisError::SnapshotError(format!("cannot read {}: {}", rel, e))
            })?;
            let parsed = record::parse_record(&content).map_err(|e| {
                PortcullisError::SnapshotError(format!("cannot parse {}: {}", rel, e))
            })?;
            snapshot.insert(&rel, parsed);
        }

        Ok(snapshot)
    }
}

fn collect_record_files(
    dir: &Path,
    ext: &str,
    out: &mut Vec<std::path::PathBuf>,
) -> Result<(), PortcullisError> {
    for entry in fs::read_dir(dir).map_err(PortcullisError::IoError)? {
        let entry = entry.map_err(PortcullisError::IoError)?;
        let path = entry.path();
        if path.is_dir() {
            collect_record_files(&path, ext, out)?;
        } else if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(path);
        }
    }
    Ok(())
}
