use codegraph_core::NodeFeatures;

use super::context::EnrichmentGraph;
use super::step::EnrichmentStep;

/// Runs after [`super::reachability::ReachabilityCounts`] and
/// [`super::boundary::BoundarySignals`] in the pipeline order: it reads
/// their fields off the accumulator rather than recomputing them.
pub struct CompositeScores;

impl EnrichmentStep for CompositeScores {
    fn name(&self) -> &'static str {
        "composite_scores"
    }

    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()> {
        for idx in 0..graph.len() {
            let f = &features[idx];
            let utility_score =
                (1.0 + f.transitive_callers as f64).ln() * (2.0 + f.xmod_fan_in as f64).ln();

            let middleman_score = if f.xmod_fan_in == 0 || f.xmod_fan_out == 0 {
                0.0
            } else {
                let complexity = graph.nodes[idx].complexity as f64;
                let raw = (1.0 / (1.0 + complexity))
                    * (1.0 + f.xmod_fan_in as f64).ln()
                    * (1.0 + f.xmod_fan_out as f64).ln()
                    / 10.0;
                raw.min(1.0)
            };

            features[idx].utility_score = utility_score;
            features[idx].middleman_score = middleman_score;
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
    fn middleman_score_is_zero_without_both_directions_of_fan() {
        let graph = EnrichmentGraph::build(vec![node("a", 1)], &[]);
        let mut features = vec![NodeFeatures::zeroed("a")];
        features[0].xmod_fan_in = 3;
        features[0].xmod_fan_out = 0;
        CompositeScores.apply(&graph, &mut features).unwrap();
        assert_eq!(features[0].middleman_score, 0.0);
    }

    #[test]
    fn utility_score_grows_with_transitive_callers_and_fan_in() {
        let solo_graph = EnrichmentGraph::build(vec![node("a", 1)], &[]);
        let mut quiet = vec![NodeFeatures::zeroed("a")];
        let mut busy = vec![NodeFeatures::zeroed("a")];
        busy[0].transitive_callers = 50;
        busy[0].xmod_fan_in = 10;
        CompositeScores.apply(&solo_graph, &mut quiet).unwrap();
        CompositeScores.apply(&solo_graph, &mut busy).unwrap();
        assert!(busy[0].utility_score > quiet[0].utility_score);
    }
}
