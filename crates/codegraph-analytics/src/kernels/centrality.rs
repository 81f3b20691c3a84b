use codegraph_core::{Edge, Node};
use codegraph_graph::DiGraph;
use serde::Serialize;

use crate::enrichment::centrality::betweenness_centrality;

const EXACT_LIMIT: usize = 2000;

#[derive(Debug, Clone, Serialize)]
pub struct CentralityRank {
    pub hash: String,
    pub score: f64,
    pub method: &'static str,
}

/// Ranks nodes by exact betweenness for graphs of at most 2000 nodes;
/// above that, falls back to normalized in-degree as a cheap proxy rather
/// than paying for (possibly sampled) betweenness again.
pub fn centrality(nodes: &[Node], edges: &[Edge], top_n: usize) -> Vec<CentralityRank> {
    let hashes: Vec<&str> = nodes.iter().map(|n| n.hash.as_str()).collect();
    let graph = DiGraph::build(
        hashes.iter().copied(),
        edges.iter().map(|e| (e.caller_hash.as_str(), e.callee_hash.as_str(), e.call_count)),
    );

    let (scores, method) = if graph.len() <= EXACT_LIMIT {
        (betweenness_centrality(&graph), "betweenness")
    } else {
        let n = graph.len();
        let max_in_degree = (0..n)
            .map(|idx| graph.predecessors(idx).len())
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let scores = (0..n)
            .map(|idx| graph.predecessors(idx).len() as f64 / max_in_degree)
            .collect();
        (scores, "in_degree_proxy")
    };

    let mut ranked: Vec<CentralityRank> = (0..graph.len())
        .map(|idx| CentralityRank {
            hash: graph.hash(idx).to_string(),
            score: scores[idx],
            method,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap().then(a.hash.cmp(&b.hash)));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, Risk};

    fn node(hash: &str) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some("m".to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity: 1,
            caller_count: 1,
            callee_count: 1,
            risk: Risk::Low,
        }
    }

    #[test]
    fn bridge_node_ranks_highest_in_a_path() {
        let nodes = vec![node("A"), node("B"), node("C")];
        let edges = vec![
            Edge { caller_hash: "A".into(), callee_hash: "B".into(), call_count: 1 },
            Edge { caller_hash: "B".into(), callee_hash: "C".into(), call_count: 1 },
        ];
        let ranks = centrality(&nodes, &edges, 10);
        assert_eq!(ranks[0].hash, "B");
        assert_eq!(ranks[0].method, "betweenness");
    }

    #[test]
    fn top_n_truncates_results() {
        let nodes = vec![node("A"), node("B"), node("C")];
        let edges = vec![Edge { caller_hash: "A".into(), callee_hash: "B".into(), call_count: 1 }];
        let ranks = centrality(&nodes, &edges, 1);
        assert_eq!(ranks.len(), 1);
    }

    #[test]
    fn empty_graph_yields_no_ranks() {
        let ranks = centrality(&[], &[], 10);
        assert!(ranks.is_empty());
    }
}
