//! CLI struct definitions for the portcullis command-line interface.
//!
//! All clap-derived types live here. Dispatch logic lives in `lib.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "portcullis",
    version = env!("CARGO_PKG_VERSION"),
    about = "Deterministic gatekeeper for registry change requests",
    disable_version_flag = true
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Validate a proposal against the registry and emit a verdict artifact
    Check(CheckCli),

    /// Compute the feedback plan (comment + commit status) from an artifact
    Reconcile(ReconcileCli),

    /// Print the wire contracts consumed and produced by this tool
    Schema,

    /// Print version
    Version,
}

#[derive(clap::Args, Debug)]
pub(crate) struct CheckCli {
    /// Proposal context JSON (submitter, number, source_ref, changed_files).
    #[clap(long)]
    pub proposal: PathBuf,
    /// Checked-out repository root holding the current registry state.
    #[clap(long)]
    pub registry: PathBuf,
    /// Engine config TOML; defaults to `portcullis.toml` beside the registry.
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Where to write the result artifact JSON.
    #[clap(long)]
    pub out: Option<PathBuf>,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug)]
pub(crate) struct ReconcileCli {
    /// Result artifact written by `check`.
    #[clap(long)]
    pub artifact: PathBuf,
    /// JSON array of existing markers observed on the proposal.
    #[clap(long)]
    pub markers: PathBuf,
    /// Where to write the plan JSON (stdout if omitted).
    #[clap(long)]
    pub out: Option<PathBuf>,
}
