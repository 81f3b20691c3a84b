use std::collections::HashMap;

use codegraph_core::NodeFeatures;
use codegraph_graph::project_undirected;

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;
use crate::louvain::louvain;

const LOUVAIN_SEED: u64 = 42;
const DEFAULT_RESOLUTION: f64 = 1.0;

pub struct CommunitySignals;

impl EnrichmentStep for CommunitySignals {
    fn name(&self) -> &'static str {
        "community_signals"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        let projection = project_undirected(&graph.digraph);
        let raw_communities = louvain(&projection, DEFAULT_RESOLUTION, LOUVAIN_SEED);

        // Orphans: nodes with no projection edges at all are not part of
        // any community, regardless of what singleton id Louvain assigned.
        let is_orphan: Vec<bool> = (0..graph.len())
            .map(|idx| projection.neighbors(idx).is_empty())
            .collect();

        let mut members_by_community: HashMap<usize, Vec<usize>> = HashMap::new();
        for (idx, &comm) in raw_communities.iter().enumerate() {
            if !is_orphan[idx] {
                members_by_community.entry(comm).or_default().push(idx);
            }
        }

        let mut dominant_mod_by_community: HashMap<usize, String> = HashMap::new();
        for (&comm, members) in &members_by_community {
            let mut counts: HashMap<&str, u32> = HashMap::new();
            for &idx in members {
                *counts.entry(graph.module_of(idx)).or_insert(0) += 1;
            }
            if let Some((&module, _)) = counts.iter().max_by_key(|(_, &c)| c) {
                dominant_mod_by_community.insert(comm, module.to_string());
            }
        }

        for idx in 0..graph.len() {
            if is_orphan[idx] {
                features[idx].community_id = -1;
                features[idx].community_dominant_mod = None;
                features[idx].community_alignment = false;
                continue;
            }

            let comm = raw_communities[idx];
            let dominant_mod = dominant_mod_by_community.get(&comm).cloned();
            let alignment = dominant_mod
                .as_deref()
                .map(|dom| dom == graph.module_of(idx))
                .unwrap_or(false);

            features[idx].community_id = comm as i64;
            features[idx].community_dominant_mod = dominant_mod;
            features[idx].community_alignment = alignment;
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
    fn an_isolated_node_is_treated_as_an_orphan() {
        let nodes = vec![node("a", "m"), node("b", "m"), node("c", "m")];
        let edges = vec![Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 }];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        CommunitySignals.apply(&graph, &mut features).unwrap();
        let c_idx = graph.nodes.iter().position(|n| n.hash == "c").unwrap();
        assert_eq!(features[c_idx].community_id, -1);
        assert!(!features[c_idx].community_alignment);
    }

    #[test]
    fn a_node_in_its_community_s_dominant_module_is_aligned() {
        let nodes = vec![node("a1", "a"), node("a2", "a"), node("b1", "b")];
        let edges = vec![
            Edge { caller_hash: "a1".into(), callee_hash: "a2".into(), call_count: 10 },
            Edge { caller_hash: "a1".into(), callee_hash: "b1".into(), call_count: 1 },
        ];
        let graph = EnrichmentGraph::build(nodes, &edges);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        CommunitySignals.apply(&graph, &mut features).unwrap();
        let a1_idx = graph.nodes.iter().position(|n| n.hash == "a1").unwrap();
        assert_eq!(features[a1_idx].community_dominant_mod, Some("a".to_string()));
    }
}
