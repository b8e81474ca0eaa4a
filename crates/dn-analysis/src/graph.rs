//! Block dependency graph building.
//!
//! Edges run from a symbol's owning block to each consuming block. The
//! owner of a symbol is its **last** definer in sorting-key order: the
//! owner map is populated in one full pass with plain overwrites, so
//! resolution can point a consumer at a block that appears after it in
//! the notebook. This reproduces the observed engine behavior; true
//! notebook execution is top-down, so well-formed notebooks do not hit
//! the backward case.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

use dn_core::{BlockId, Notebook};

use crate::extract::{BlockExtractor, DefaultExtractor, SymbolInfo};

/// Dependency graph over the blocks of one notebook.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Edges run owner -> consumer.
    graph: DiGraph<BlockId, ()>,

    /// Map from block id to node index.
    node_map: HashMap<BlockId, NodeIndex>,

    /// Map from symbol to the block that owns it.
    symbol_owner: HashMap<String, BlockId>,

    /// Per-block symbol info, in sorting-key order.
    symbols: Vec<(BlockId, SymbolInfo)>,

    /// Used symbols that resolved to no owner, in sorting-key order.
    unresolved: Vec<(BlockId, String)>,
}

/// Build the dependency graph for a notebook with the built-in
/// extractors.
pub fn build_graph(notebook: &Notebook) -> DependencyGraph {
    DependencyGraph::build(notebook, &DefaultExtractor)
}

impl DependencyGraph {
    /// Build the graph for a notebook using the given extractor.
    pub fn build(notebook: &Notebook, extractor: &dyn BlockExtractor) -> Self {
        let blocks = notebook.sorted_blocks();

        let symbols: Vec<(BlockId, SymbolInfo)> = blocks
            .iter()
            .map(|b| (b.id.clone(), extractor.extract(b)))
            .collect();

        let mut graph = DiGraph::new();
        let mut node_map: HashMap<BlockId, NodeIndex> = HashMap::new();
        for (id, _) in &symbols {
            let idx = graph.add_node(id.clone());
            node_map.insert(id.clone(), idx);
        }

        // Full pass over document order: the last definer of a symbol
        // overwrites any earlier owner.
        let mut symbol_owner: HashMap<String, BlockId> = HashMap::new();
        for (id, info) in &symbols {
            for symbol in info.provided() {
                symbol_owner.insert(symbol.clone(), id.clone());
            }
        }

        // Resolve uses against the final owner map.
        let mut unresolved = Vec::new();
        let mut seen_edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        for (id, info) in &symbols {
            for symbol in &info.used_symbols {
                match symbol_owner.get(symbol) {
                    Some(owner) if owner != id => {
                        let from = node_map[owner];
                        let to = node_map[id];
                        if seen_edges.insert((from, to)) {
                            graph.add_edge(from, to, ());
                        }
                    }
                    Some(_) => {} // self-reference, no edge
                    None => unresolved.push((id.clone(), symbol.clone())),
                }
            }
        }

        Self {
            graph,
            node_map,
            symbol_owner,
            symbols,
            unresolved,
        }
    }

    /// Edges as (owner, consumer) pairs, in insertion order.
    pub fn edges(&self) -> Vec<(&BlockId, &BlockId)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()]))
            .collect()
    }

    /// Map from symbol to its owning block.
    pub fn symbol_owner(&self) -> &HashMap<String, BlockId> {
        &self.symbol_owner
    }

    /// Per-block symbol info, in sorting-key order.
    pub fn symbols(&self) -> &[(BlockId, SymbolInfo)] {
        &self.symbols
    }

    /// Used symbols with no owner, in sorting-key order.
    pub fn unresolved(&self) -> &[(BlockId, String)] {
        &self.unresolved
    }

    /// Whether a block is part of this graph.
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Direct dependencies (upstream owners) of a block.
    pub fn dependencies(&self, id: &str) -> Vec<&BlockId> {
        self.neighbors(id, petgraph::Direction::Incoming)
    }

    /// Direct dependents (downstream consumers) of a block.
    pub fn dependents(&self, id: &str) -> Vec<&BlockId> {
        self.neighbors(id, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: petgraph::Direction) -> Vec<&BlockId> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .map(|e| match direction {
                petgraph::Direction::Incoming => &self.graph[e.source()],
                petgraph::Direction::Outgoing => &self.graph[e.target()],
            })
            .collect()
    }

    /// Transitive upstream dependencies of a block, dependencies first.
    ///
    /// Each block's own dependencies are emitted before the block itself,
    /// so the result is directly usable as an execution prefix. The
    /// target block is not included. Cycles are tolerated (already
    /// visited nodes are skipped).
    pub fn upstream_closure(&self, id: &str) -> Vec<&BlockId> {
        let Some(&start) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut result = Vec::new();
        self.upstream_dfs(start, &mut visited, &mut result);
        result.into_iter().map(|idx| &self.graph[idx]).collect()
    }

    fn upstream_dfs(
        &self,
        idx: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        result: &mut Vec<NodeIndex>,
    ) {
        for edge in self
            .graph
            .edges_directed(idx, petgraph::Direction::Incoming)
        {
            let dep = edge.source();
            if visited.insert(dep) {
                self.upstream_dfs(dep, visited, result);
                result.push(dep);
            }
        }
    }

    /// Detect a dependency cycle, rendering its path for reporting.
    ///
    /// The graph is not required to be acyclic by construction; this is a
    /// separate pass used by lint.
    pub fn detect_cycle(&self) -> Option<String> {
        match toposort(&self.graph, None) {
            Ok(_) => None,
            Err(cycle) => Some(self.find_cycle_path(cycle.node_id())),
        }
    }

    /// Find a cycle path starting from a node for error reporting.
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
