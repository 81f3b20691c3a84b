use codegraph_core::{Edge, Node};
use codegraph_graph::DiGraph;

/// Everything an enrichment step needs: the internal-only node set (in a
/// fixed order that doubles as the graph's node index) and the directed
/// graph built from internal-only edges.
pub struct EnrichmentGraph {
    pub nodes: Vec<Node>,
    pub digraph: DiGraph,
}

impl EnrichmentGraph {
    pub fn build(nodes: Vec<Node>, edges: &[Edge]) -> Self {
        let hashes: Vec<&str> = nodes.iter().map(|n| n.hash.as_str()).collect();
        let edge_tuples = edges
            .iter()
            .filter(|e| !codegraph_core::is_external_hash(&e.caller_hash))
            .filter(|e| !codegraph_core::is_external_hash(&e.callee_hash))
            .map(|e| (e.caller_hash.as_str(), e.callee_hash.as_str(), e.call_count));
        let digraph = DiGraph::build(hashes, edge_tuples);
        Self { nodes, digraph }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn module_of(&self, idx: usize) -> &str {
        self.nodes[idx].module_or_external()
    }
}
