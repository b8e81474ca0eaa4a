//! Graph command implementation - block dependency edges

use anyhow::{bail, Result};
use dn_analysis::build_graph;
use dn_core::Notebook;
use serde::Serialize;

use crate::cli::{GlobalArgs, GraphArgs, ReportOutput};
use crate::commands::common;

/// Graph of one notebook, shaped for output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotebookGraph {
    notebook: String,
    edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    symbols: Vec<SymbolOwner>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unresolved: Vec<UnresolvedUse>,
}

#[derive(Debug, Serialize)]
struct Edge {
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
struct SymbolOwner {
    symbol: String,
    block: String,
}

#[derive(Debug, Serialize)]
struct UnresolvedUse {
    block: String,
    symbol: String,
}

/// Execute the graph command
pub async fn execute(args: &GraphArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;

    let notebooks: Vec<&Notebook> = match &args.notebook {
        Some(reference) => match project.get_notebook(reference) {
            Some(notebook) => vec![notebook],
            None => bail!("Notebook '{}' not found in project", reference),
        },
        None => project.notebooks.iter().collect(),
    };

    let mut graphs = Vec::new();
    for notebook in notebooks {
        let graph = build_graph(notebook);

        let mut edges: Vec<Edge> = graph
            .edges()
            .into_iter()
            .map(|(from, to)| Edge {
                from: from.to_string(),
                to: to.to_string(),
            })
            .collect();
        edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

        let mut symbols = Vec::new();
        if args.symbols {
            symbols = graph
                .symbol_owner()
                .iter()
                .map(|(symbol, block)| SymbolOwner {
                    symbol: symbol.clone(),
                    block: block.to_string(),
                })
                .collect();
            symbols.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        }

        let unresolved = graph
            .unresolved()
            .iter()
            .map(|(block, symbol)| UnresolvedUse {
                block: block.to_string(),
                symbol: symbol.clone(),
            })
            .collect();

        graphs.push(NotebookGraph {
            notebook: notebook.name.clone(),
            edges,
            symbols,
            unresolved,
        });
    }

    match args.output {
        ReportOutput::Text => print_text(&graphs),
        ReportOutput::Json => println!("{}", serde_json::to_string_pretty(&graphs)?),
    }
    Ok(())
}

fn print_text(graphs: &[NotebookGraph]) {
    for graph in graphs {
        println!("notebook: {}", graph.notebook);
        if graph.edges.is_empty() {
            println!("  (no dependencies)");
        }
        for edge in &graph.edges {
            println!("  {} -> {}", edge.from, edge.to);
        }
        for symbol in &graph.symbols {
            println!("  symbol {} <- {}", symbol.symbol, symbol.block);
        }
        for unresolved in &graph.unresolved {
            println!("  unresolved {} in {}", unresolved.symbol, unresolved.block);
        }
        println!();
    }
}
