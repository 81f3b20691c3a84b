use std::collections::HashMap;

use codegraph_core::NodeFeatures;

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;

pub struct ComplexityPercentile;

impl EnrichmentStep for ComplexityPercentile {
    fn name(&self) -> &'static str {
        "complexity_pct"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        let n = graph.len();
        if n == 0 {
            return Ok(());
        }

        let mut by_complexity: Vec<(u32, usize)> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.complexity, idx))
            .collect();
        by_complexity.sort_by_key(|&(complexity, _)| complexity);

        // Ties share the lower rank: the first position a complexity value
        // appears at in the sorted order is the rank every node with that
        // value gets, not the average of their positions.
        let mut first_rank_for: HashMap<u32, usize> = HashMap::new();
        for (rank, &(complexity, _)) in by_complexity.iter().enumerate() {
            first_rank_for.entry(complexity).or_insert(rank);
        }

        for &(complexity, idx) in &by_complexity {
            let rank = first_rank_for[&complexity];
            features[idx].complexity_pct = (rank + 1) as f64 / n as f64;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, Node, Risk};

    fn node(hash: &str, complexity: u32) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some("m".to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity,
            caller_count: 1,
            callee_count: 1,
            risk: Risk::Low,
        }
    }

    #[test]
    fn tied_complexity_values_share_the_lower_rank() {
        let nodes = vec![node("a", 1), node("b", 5), node("c", 5), node("d", 9)];
        let graph = EnrichmentGraph::build(nodes, &[]);
        let mut features: Vec<NodeFeatures> = graph.nodes.iter().map(|n| NodeFeatures::zeroed(n.hash.clone())).collect();
        ComplexityPercentile.apply(&graph, &mut features).unwrap();
        assert_eq!(features[0].complexity_pct, 0.25);
        assert_eq!(features[1].complexity_pct, 0.5);
        assert_eq!(features[2].complexity_pct, 0.5);
        assert_eq!(features[3].complexity_pct, 1.0);
    }

    #[test]
    fn empty_graph_is_a_no_op() {
        let graph = EnrichmentGraph::build(Vec::new(), &[]);
        let mut features: Vec<NodeFeatures> = Vec::new();
        assert!(ComplexityPercentile.apply(&graph, &mut features).is_ok());
    }
}
