//! Proposal data model: the immutable input to one validation run.
//!
//! A proposal is a change request against the registry: who submitted it,
//! which revision it points at, and the full ordered list of files it
//! touches. The orchestrator resolves all of this from the hosting platform
//! and hands it to the engine as already-fetched JSON; the engine never
//! talks to the platform itself.

use crate::core::error::PortcullisError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How a file changed in the proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Renamed,
}

/// One file touched by the proposal.
///
/// `new_content` is the post-change content; it is absent for removals.
/// `prior_path` is set only for renames and names the pre-change path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub kind: ChangeKind,
    #[serde(default)]
    pub prior_path: Option<String>,
    #[serde(default)]
    pub new_content: Option<String>,
}

/// Immutable context for a single validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalContext {
    /// Authenticated identity of the submitter, attributed upstream.
    pub submitter: String,
    /// Proposal (pull request) number on the hosting platform.
    pub number: u64,
    /// Head revision the verdict applies to.
    pub source_ref: String,
    pub changed_files: Vec<ChangedFile>,
}

/// Read a proposal context from a JSON file produced by the orchestrator.
pub fn load_proposal(path: &Path) -> Result<ProposalContext, PortcullisError> {
    let content = fs::read_to_string(path).map_err(PortcullisError::IoError)?;
    let proposal: ProposalContext = serde_json::from_str(&content)?;
    Ok(proposal)
}
