use std::collections::HashSet;

use codegraph_core::NodeFeatures;
use codegraph_graph::{build_condensation, tarjan_scc};

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;

pub struct SccSignals;

impl EnrichmentStep for SccSignals {
    fn name(&self) -> &'static str {
        "scc_signals"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        let sccs = tarjan_scc(&graph.digraph);
        let condensation = build_condensation(&graph.digraph, &sccs);

        for (scc_id, members) in sccs.iter().enumerate() {
            let distinct_modules: HashSet<&str> =
                members.iter().map(|&idx| graph.module_of(idx)).collect();
            let cross_module = distinct_modules.len() >= 2;
            for &idx in members {
                features[idx].scc_id = scc_id as i64;
                features[idx].scc_size = members.len() as u32;
                features[idx].scc_cross_module = cross_module;
            }
        }

        debug_assert_eq!(condensation.scc_count(), sccs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Edge, Kind, Node, Risk};

    fn node(hash: &str, module: &str) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some(module.to_string()),
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
    fn cross_module_cycle_is_flagged() {
        let nodes = vec![node("a", "m1"), node("b", "m2")];
        let edges = vec![
            Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 },
            Edge { caller_hash: "b".into(), callee_hash: "a".into(), call_count: 1 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        SccSignals.apply(&graph, &mut features).unwrap();
        assert_eq!(features[0].scc_size, 2);
        assert!(features[0].scc_cross_module);
        assert_eq!(features[0].scc_id, features[1].scc_id);
    }

    #[test]
    fn acyclic_nodes_form_singleton_sccs() {
        let nodes = vec![node("a", "m"), node("b", "m")];
        let edges = vec![Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 }];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        SccSignals.apply(&graph, &mut features).unwrap();
        assert_eq!(features[0].scc_size, 1);
        assert!(!features[0].scc_cross_module);
        assert_ne!(features[0].scc_id, features[1].scc_id);
    }
}
