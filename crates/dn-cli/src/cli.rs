//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// deepnote-flow - analyze, plan, and execute .deepnote projects
#[derive(Parser, Debug)]
#[command(name = "dn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the project file (.deepnote, .yaml, or .json)
    #[arg(short = 'p', long, global = true, default_value = "project.deepnote")]
    pub project: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the project and report findings
    Lint(LintArgs),

    /// Show the block dependency graph
    Graph(GraphArgs),

    /// Execute blocks through a persistent interpreter
    Run(RunArgs),

    /// Split, merge, and list execution snapshots
    Snapshot(SnapshotArgs),
}

/// Output formats shared by reporting commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutput {
    /// Human-readable text
    Text,
    /// JSON lines suitable for tooling
    Json,
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Restrict analysis to one notebook (id or name)
    #[arg(short, long)]
    pub notebook: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: ReportOutput,
}

/// Arguments for the graph command
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Restrict to one notebook (id or name)
    #[arg(short, long)]
    pub notebook: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: ReportOutput,

    /// Show symbol owners alongside edges
    #[arg(long)]
    pub symbols: bool,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run a single notebook (id or name)
    #[arg(short, long, conflicts_with = "block")]
    pub notebook: Option<String>,

    /// Run a single block with its dependencies (id or unambiguous prefix)
    #[arg(short, long)]
    pub block: Option<String>,

    /// Print the plan without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Abort after the first failed block
    #[arg(long)]
    pub stop_on_error: bool,

    /// Interpreter to drive
    #[arg(long, default_value = "python3")]
    pub interpreter: String,

    /// Input overrides as name=value (repeatable)
    #[arg(long = "input", value_name = "NAME=VALUE")]
    pub inputs: Vec<String>,

    /// Write a snapshot of the executed project into this directory
    #[arg(long)]
    pub snapshot_dir: Option<String>,
}

/// Arguments for the snapshot command
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommands,
}

/// Snapshot subcommands
#[derive(Subcommand, Debug)]
pub enum SnapshotCommands {
    /// Split the project into a clean source copy and a snapshot file
    Split(SnapshotSplitArgs),

    /// Merge a snapshot's captured outputs back into the project
    Merge(SnapshotMergeArgs),

    /// List snapshots for the project, newest first
    Ls(SnapshotLsArgs),
}

/// Arguments for snapshot split
#[derive(Args, Debug)]
pub struct SnapshotSplitArgs {
    /// Directory to write the snapshot and source copy into
    #[arg(short, long, default_value = "snapshots")]
    pub out_dir: String,

    /// Stamp the snapshot as `latest` instead of a timestamp
    #[arg(long)]
    pub latest: bool,
}

/// Arguments for snapshot merge
#[derive(Args, Debug)]
pub struct SnapshotMergeArgs {
    /// Snapshot file to merge; defaults to the newest in --dir
    #[arg(short, long)]
    pub snapshot: Option<String>,

    /// Directory to search when --snapshot is not given
    #[arg(short, long, default_value = "snapshots")]
    pub dir: String,

    /// Keep captured outputs even when the block content changed
    #[arg(long)]
    pub keep_mismatched: bool,

    /// Where to write the merged project; defaults to the project file
    #[arg(short, long)]
    pub out: Option<String>,
}

/// Arguments for snapshot ls
#[derive(Args, Debug)]
pub struct SnapshotLsArgs {
    /// Directory to search
    #[arg(short, long, default_value = "snapshots")]
    pub dir: String,
}
