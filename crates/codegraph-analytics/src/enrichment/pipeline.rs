use codegraph_core::NodeFeatures;
use tracing::warn;

use super::boundary::BoundarySignals;
use super::centrality::Centrality;
use super::community::CommunitySignals;
use super::complexity_pct::ComplexityPercentile;
use super::composite::CompositeScores;
use super::context::EnrichmentGraph;
use super::reachability::ReachabilityCounts;
use super::scc_signals::SccSignals;
use super::step::EnrichmentStep;
use super::topo_depths::TopoDepths;

/// The enrichment step order. `CompositeScores` depends on the fields
/// `ReachabilityCounts` and `BoundarySignals` write, so it runs after both;
/// every other step is independent and could run in any order.
fn steps() -> Vec<Box<dyn EnrichmentStep>> {
    vec![
        Box::new(SccSignals),
        Box::new(TopoDepths),
        Box::new(ReachabilityCounts),
        Box::new(Centrality),
        Box::new(BoundarySignals),
        Box::new(ComplexityPercentile),
        Box::new(CompositeScores),
        Box::new(CommunitySignals),
    ]
}

/// Runs every enrichment step over `graph`, in order, isolating failures:
/// a step whose `apply` returns `Err` is logged and its scratch copy
/// discarded, leaving its fields at their zeroed defaults. Enrichment of
/// an empty graph is a no-op that returns an empty vector.
pub fn enrich(graph: &EnrichmentGraph) -> Vec<NodeFeatures> {
    if graph.is_empty() {
        return Vec::new();
    }

    let mut features: Vec<NodeFeatures> = graph
        .nodes
        .iter()
        .map(|n| NodeFeatures::zeroed(n.hash.clone()))
        .collect();

    for step in steps() {
        let mut scratch = features.clone();
        match step.apply(graph, &mut scratch) {
            Ok(()) => features = scratch,
            Err(error) => {
                warn!(step = step.name(), %error, "enrichment step degraded, using defaults");
            }
        }
    }

    features
}
