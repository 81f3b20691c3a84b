use std::collections::{HashMap, HashSet};

use codegraph_core::{NodeFeatures, EXTERNAL_MODULE};

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;

pub struct BoundarySignals;

impl EnrichmentStep for BoundarySignals {
    fn name(&self) -> &'static str {
        "boundary_signals"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        for idx in 0..graph.len() {
            let own_module = graph.module_of(idx);

            let caller_modules: HashSet<&str> = graph
                .digraph
                .predecessors(idx)
                .iter()
                .map(|&(p, _)| graph.module_of(p))
                .filter(|&m| m != own_module && m != EXTERNAL_MODULE)
                .collect();

            let mut callee_module_counts: HashMap<&str, u32> = HashMap::new();
            let mut total_outgoing = 0u64;
            for &(callee, call_count) in graph.digraph.successors(idx) {
                total_outgoing += call_count as u64;
                let callee_module = graph.module_of(callee);
                if callee_module != own_module && callee_module != EXTERNAL_MODULE {
                    *callee_module_counts.entry(callee_module).or_insert(0) += call_count;
                }
            }

            let xmod_fan_in = caller_modules.len() as u32;
            let xmod_fan_out = callee_module_counts.len() as u32;

            let xmod_outgoing: u64 = callee_module_counts.values().map(|&c| c as u64).sum();
            let xmod_call_ratio = if total_outgoing > 0 {
                xmod_outgoing as f64 / total_outgoing as f64
            } else {
                0.0
            };

            let (dominant_mod, dominant_frac) = callee_module_counts
                .iter()
                .max_by_key(|(_, &count)| count)
                .map(|(&m, &count)| {
                    let denom = xmod_outgoing;
                    let frac = if denom > 0 {
                        count as f64 / denom as f64
                    } else {
                        0.0
                    };
                    (Some(m.to_string()), frac)
                })
                .unwrap_or((None, 0.0));

            let stability_rank = if xmod_fan_in + xmod_fan_out > 0 {
                xmod_fan_out as f64 / (xmod_fan_in + xmod_fan_out) as f64
            } else {
                0.5
            };

            features[idx].xmod_fan_in = xmod_fan_in;
            features[idx].xmod_fan_out = xmod_fan_out;
            features[idx].xmod_call_ratio = xmod_call_ratio;
            features[idx].dominant_callee_mod = dominant_mod;
            features[idx].dominant_callee_frac = dominant_frac;
            features[idx].stability_rank = stability_rank;
        }
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
    fn counts_distinct_caller_and_callee_modules_not_edges() {
        let nodes = vec![node("a1", "a"), node("a2", "a"), node("target", "m"), node("b1", "b")];
        let edges = vec![
            Edge { caller_hash: "a1".into(), callee_hash: "target".into(), call_count: 1 },
            Edge { caller_hash: "a2".into(), callee_hash: "target".into(), call_count: 1 },
            Edge { caller_hash: "target".into(), callee_hash: "b1".into(), call_count: 3 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        BoundarySignals.apply(&graph, &mut features).unwrap();
        let target_idx = graph.nodes.iter().position(|n| n.hash == "target").unwrap();
        assert_eq!(features[target_idx].xmod_fan_in, 1);
        assert_eq!(features[target_idx].xmod_fan_out, 1);
        assert_eq!(features[target_idx].dominant_callee_mod, Some("b".to_string()));
        assert_eq!(features[target_idx].xmod_call_ratio, 1.0);
    }

    #[test]
    fn calls_from_or_to_a_moduleless_node_do_not_count_as_cross_module() {
        let mut unplaced = node("u1", "m");
        unplaced.module = None;
        let nodes = vec![node("target", "m"), unplaced, node("b1", "b")];
        let edges = vec![
            Edge { caller_hash: "u1".into(), callee_hash: "target".into(), call_count: 1 },
            Edge { caller_hash: "target".into(), callee_hash: "b1".into(), call_count: 1 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        BoundarySignals.apply(&graph, &mut features).unwrap();
        let target_idx = graph.nodes.iter().position(|n| n.hash == "target").unwrap();
        assert_eq!(features[target_idx].xmod_fan_in, 0);
        assert_eq!(features[target_idx].xmod_fan_out, 1);
        assert_eq!(features[target_idx].xmod_call_ratio, 1.0);
    }

    #[test]
    fn node_with_no_cross_module_calls_has_neutral_stability() {
        let nodes = vec![node("a1", "m"), node("a2", "m")];
        let edges = vec![Edge { caller_hash: "a1".into(), callee_hash: "a2".into(), call_count: 1 }];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        BoundarySignals.apply(&graph, &mut features).unwrap();
        assert_eq!(features[0].stability_rank, 0.5);
        assert_eq!(features[0].xmod_fan_in, 0);
        assert_eq!(features[0].xmod_fan_out, 0);
    }
}
