use codegraph_core::NodeFeatures;
use codegraph_graph::{
    ancestor_node_counts, build_condensation, descendant_node_counts, strict_transitive_counts,
    tarjan_scc, topological_order,
};

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;

pub struct ReachabilityCounts;

impl EnrichmentStep for ReachabilityCounts {
    fn name(&self) -> &'static str {
        "reachability_counts"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        let sccs = tarjan_scc(&graph.digraph);
        let condensation = build_condensation(&graph.digraph, &sccs);
        let order = topological_order(&condensation);
        let scc_sizes: Vec<u32> = condensation.members.iter().map(|m| m.len() as u32).collect();

        let descendants = descendant_node_counts(&condensation, &order, &scc_sizes);
        let ancestors = ancestor_node_counts(&condensation, &order, &scc_sizes);

        let callees = strict_transitive_counts(&condensation, &scc_sizes, &descendants);
        let callers = strict_transitive_counts(&condensation, &scc_sizes, &ancestors);

        for idx in 0..features.len() {
            features[idx].transitive_callees = callees[idx];
            features[idx].transitive_callers = callers[idx];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Edge, Kind, Node, Risk};

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
    fn head_of_a_three_node_chain_reaches_both_downstream_nodes() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![
            Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 },
            Edge { caller_hash: "b".into(), callee_hash: "c".into(), call_count: 1 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        ReachabilityCounts.apply(&graph, &mut features).unwrap();
        assert_eq!(features[0].transitive_callees, 2);
        assert_eq!(features[0].transitive_callers, 0);
        assert_eq!(features[2].transitive_callers, 2);
        assert_eq!(features[2].transitive_callees, 0);
    }
}
