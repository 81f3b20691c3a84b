//! Thin per-operation fetch shims over in-memory snapshot data. Each
//! adapter assembles exactly the inputs one analytics kernel needs; the
//! only adapter that bundles more than one fetch is the triage bundle
//! (`high_centrality_candidates` + `dead_files::dead_file_stats` composed
//! by the caller into a `TriageInputs`).

pub mod dead_files;
pub mod graph;
pub mod high_centrality;
pub mod module_edges;
pub mod module_graph;
pub mod nodes_table;
pub mod overview;

pub use dead_files::dead_file_stats;
pub use graph::{graph as subgraph, node_detail, NodeDetail};
pub use high_centrality::{high_centrality_candidates, high_centrality_nodes};
pub use module_edges::{module_edges_detail, CallDetail};
pub use module_graph::{module_graph, ModuleGraph};
pub use nodes_table::{nodes_table, NodesTablePage, SortField};
pub use overview::{overview, ModuleCount, Overview};
