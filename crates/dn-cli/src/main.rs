//! deepnote-flow CLI - analyze, plan, and execute .deepnote projects

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{graph, lint, run, snapshot};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Lint(args) => lint::execute(args, &cli.global).await,
        cli::Commands::Graph(args) => graph::execute(args, &cli.global).await,
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Snapshot(args) => snapshot::execute(args, &cli.global).await,
    }
}
