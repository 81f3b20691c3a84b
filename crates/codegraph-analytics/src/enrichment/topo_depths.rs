use codegraph_core::NodeFeatures;
use codegraph_graph::{
    build_condensation, lift_to_nodes, longest_path_depths, longest_path_reverse_depths,
    tarjan_scc, topological_order,
};

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;

pub struct TopoDepths;

impl EnrichmentStep for TopoDepths {
    fn name(&self) -> &'static str {
        "topo_depths"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        let sccs = tarjan_scc(&graph.digraph);
        let condensation = build_condensation(&graph.digraph, &sccs);
        let order = topological_order(&condensation);

        let depths = lift_to_nodes(&condensation, &longest_path_depths(&condensation, &order));
        let reverse_depths = lift_to_nodes(
            &condensation,
            &longest_path_reverse_depths(&condensation, &order),
        );

        for idx in 0..features.len() {
            features[idx].topological_depth = depths[idx];
            features[idx].reverse_topological_depth = reverse_depths[idx];
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
    fn a_three_node_chain_has_increasing_depth_and_decreasing_reverse_depth() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![
            Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 },
            Edge { caller_hash: "b".into(), callee_hash: "c".into(), call_count: 1 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        TopoDepths.apply(&graph, &mut features).unwrap();
        assert_eq!(features[0].topological_depth, 0);
        assert_eq!(features[1].topological_depth, 1);
        assert_eq!(features[2].topological_depth, 2);
        assert_eq!(features[0].reverse_topological_depth, 2);
        assert_eq!(features[2].reverse_topological_depth, 0);
    }
}
