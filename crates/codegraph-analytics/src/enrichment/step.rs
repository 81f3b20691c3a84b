use codegraph_core::NodeFeatures;

use super::context::EnrichmentGraph;

/// One named, independently-failable enrichment step. A step mutates only
/// the fields it owns; on failure the pipeline discards its scratch copy
/// wholesale, so a step must not assume partial success from itself.
pub trait EnrichmentStep: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, graph: &EnrichmentGraph, features: &mut [NodeFeatures]) -> anyhow::Result<()>;
}
