pub mod adapters;
pub mod config_store;
pub mod diff_coordinator;
pub mod enrichment;
pub mod kernels;
pub mod louvain;
pub mod pivot;

pub use config_store::ConfigStore;
pub use enrichment::{enrich, EnrichmentGraph, EnrichmentStep};
