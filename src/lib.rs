//! Portcullis: a deterministic gatekeeper for registry change requests.
//!
//! Portcullis decides whether a proposed change set against a registry of
//! JSON records (one file per owned entity) is admissible, and renders that
//! verdict for the submitter and the hosting platform's status surface.
//!
//! # Guarantees
//!
//! - **Deterministic**: identical input always produces a byte-identical
//!   verdict, report included.
//! - **Stateless**: nothing is retained between runs; prior registry state
//!   arrives as a read-only snapshot.
//! - **Exhaustive**: errors accumulate across all files; the run never
//!   stops at the first violation.
//! - **Ownership-gated**: records embed their own owner; nobody else may
//!   modify or delete them, and new records must be self-registered.
//! - **Convergent feedback**: re-running reconciliation always ends with
//!   exactly one canonical comment and one commit status per proposal.
//!
//! # Pipeline
//!
//! diff filter → record loader → rule validator + authorization checker →
//! result aggregator → feedback reconciler. Everything up to the aggregator
//! is the pure engine (`core::engine::run_check`); the reconciler
//! (`core::reconcile`) is a pure planner whose plan the orchestrator
//! executes against the platform.
//!
//! The orchestrator owns all platform I/O: it fetches proposal metadata and
//! file diffs, invokes `portcullis check`, and executes the plan emitted by
//! `portcullis reconcile`. It must serialize runs per proposal; concurrent
//! reconciliation of the same proposal can duplicate or lose the canonical
//! marker.
//!
//! # Crate Structure
//!
//! - [`core`]: engine, data model, snapshot, verdict, reconciler
//! - `cli`: clap surface dispatched by [`run`]

pub mod core;

mod cli;

use crate::cli::{CheckCli, Cli, Command, ReconcileCli};
use crate::core::artifact::{self, ResultArtifact};
use crate::core::config;
use crate::core::engine;
use crate::core::error::PortcullisError;
use crate::core::proposal;
use crate::core::reconcile::{self, Marker};
use crate::core::snapshot::RegistrySnapshot;
use crate::core::verdict::ValidationResult;

use clap::Parser;
use colored::Colorize;
use std::fs;

pub fn run() -> Result<(), PortcullisError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Version => {
            println!("v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Schema => {
            let combined = serde_json::json!({
                "artifact": artifact::schema(),
                "reconcile": reconcile::schema(),
            });
            println!("{}", serde_json::to_string_pretty(&combined)?);
            Ok(())
        }
        Command::Check(args) => run_check_command(args),
        Command::Reconcile(args) => run_reconcile_command(args),
    }
}

fn run_check_command(args: CheckCli) -> Result<(), PortcullisError> {
    let config = config::load_config(args.config.as_deref(), &args.registry)?;
    let proposal = proposal::load_proposal(&args.proposal)?;

    println!(
        "check: proposal #{} by {} ({} changed file(s))",
        proposal.number,
        proposal.submitter,
        proposal.changed_files.len()
    );

    // An unreadable snapshot is an engine-level failure: fall back to a
    // conservative failing verdict instead of aborting without one.
    let result = match RegistrySnapshot::load(&args.registry, &config) {
        Ok(snapshot) => {
            println!("check: registry snapshot holds {} record(s)", snapshot.len());
            engine::run_check(&proposal, &snapshot, &config)
        }
        Err(e) => ValidationResult::internal_failure(&format!("registry snapshot unreadable: {e}")),
    };

    let artifact = ResultArtifact::from_result(&result);
    if let Some(out) = &args.out {
        artifact::write_artifact(out, &artifact)?;
        println!("check: artifact written to {}", out.display());
    }

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&artifact)?),
        _ => {
            let banner = if result.is_valid {
                "PASS".green().bold()
            } else {
                "FAIL".red().bold()
            };
            println!(
                "check: {} ({} error(s), {} warning(s))",
                banner,
                result.error_count(),
                result.warning_count()
            );
            println!("{}", result.report);
        }
    }

    if result.is_valid {
        Ok(())
    } else {
        Err(PortcullisError::ValidationError(format!(
            "{} error(s) in proposal #{}",
            result.error_count(),
            proposal.number
        )))
    }
}

fn run_reconcile_command(args: ReconcileCli) -> Result<(), PortcullisError> {
    let artifact = artifact::read_artifact(&args.artifact)?;
    let markers_raw = fs::read_to_string(&args.markers).map_err(PortcullisError::IoError)?;
    let markers: Vec<Marker> = serde_json::from_str(&markers_raw)?;

    let plan = reconcile::reconcile(&artifact, &markers);
    let status = reconcile::commit_status(&artifact);
    let payload = serde_json::json!({ "plan": plan, "status": status });
    let rendered = serde_json::to_string_pretty(&payload)?;

    match &args.out {
        Some(out) => {
            fs::write(out, format!("{rendered}\n")).map_err(PortcullisError::IoError)?;
            println!("reconcile: plan written to {}", out.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
