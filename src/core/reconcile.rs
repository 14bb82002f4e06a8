//! Feedback reconciliation: one canonical marker per proposal.
//!
//! The reconciler is a pure function of the latest artifact and the markers
//! currently observed on the proposal. It never talks to the platform; it
//! emits a plan (create / update / delete by id) that the orchestrator
//! executes. Convergence rule: the oldest marker is canonical and is never
//! deleted; update it first, prune the rest, so a crash mid-plan never
//! leaves the proposal with zero markers.

use crate::core::artifact::ResultArtifact;
use crate::core::output;
use serde::{Deserialize, Serialize};

/// Hidden tag embedded in comment bodies so the reconciler can recognize its
/// own markers and detect no-op updates by digest.
pub const MARKER_TAG: &str = "<!-- portcullis:verdict";

/// Status context name shown on the commit status line.
pub const STATUS_CONTEXT: &str = "portcullis/registry-gate";

/// An existing feedback comment observed on the proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub id: u64,
    /// RFC 3339 creation time as reported by the platform; used only to
    /// pick the canonical (oldest) marker deterministically.
    pub created_at: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerUpdate {
    pub id: u64,
    pub body: String,
}

/// What the orchestrator should do to converge the feedback surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<MarkerUpdate>,
    pub delete: Vec<u64>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.create.is_none() && self.update.is_none() && self.delete.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Success,
    Failure,
}

/// Commit-status entry for the proposal's head revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub state: StatusState,
    pub description: String,
    pub context: String,
}

/// Render the canonical comment body for an artifact.
pub fn comment_body(artifact: &ResultArtifact) -> String {
    format!(
        "{}\n\n{} {} -->\n",
        artifact.report.trim_end(),
        MARKER_TAG,
        artifact.report_digest
    )
}

/// Compute the convergent reconciliation plan.
///
/// Markers not carrying [`MARKER_TAG`] belong to humans and are never
/// touched. Among tagged markers the oldest is canonical: it is updated in
/// place (skipped when it already carries the current digest) and every
/// other tagged marker is deleted. Running the plan and reconciling again
/// always yields a no-op.
pub fn reconcile(artifact: &ResultArtifact, markers: &[Marker]) -> ReconcilePlan {
    let body = comment_body(artifact);

    let mut ours: Vec<&Marker> = markers
        .iter()
        .filter(|m| m.body.contains(MARKER_TAG))
        .collect();
    ours.sort_by(|a, b| (&a.created_at, a.id).cmp(&(&b.created_at, b.id)));

    let Some((canonical, rest)) = ours.split_first() else {
        return ReconcilePlan {
            create: Some(body),
            update: None,
            delete: Vec::new(),
        };
    };

    let digest_tag = format!("{} {} -->", MARKER_TAG, artifact.report_digest);
    let update = if canonical.body.contains(&digest_tag) {
        None
    } else {
        Some(MarkerUpdate {
            id: canonical.id,
            body,
        })
    };

    ReconcilePlan {
        create: None,
        update,
        delete: rest.iter().map(|m| m.id).collect(),
    }
}

/// Map an artifact onto the commit-status entry.
pub fn commit_status(artifact: &ResultArtifact) -> CommitStatus {
    if artifact.is_valid {
        return CommitStatus {
            state: StatusState::Success,
            description: "Registry validation passed".to_string(),
            context: STATUS_CONTEXT.to_string(),
        };
    }

    CommitStatus {
        state: StatusState::Failure,
        description: output::failure_description(&artifact.errors),
        context: STATUS_CONTEXT.to_string(),
    }
}

/// Wire contract description for orchestrator authors.
pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "reconcile",
        "version": "1.0.0",
        "description": "Convergent feedback plan for one proposal",
        "plan": {
            "create": "comment body to post, when no canonical marker exists",
            "update": { "id": "marker to rewrite", "body": "new body" },
            "delete": ["marker ids to prune"]
        },
        "status": { "state": "success|failure", "description": "bounded text", "context": STATUS_CONTEXT }
    })
}
