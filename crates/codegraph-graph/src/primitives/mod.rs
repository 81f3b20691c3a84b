pub mod condensation;
pub mod digraph;
pub mod longest_path;
pub mod projection;
pub mod reachability;
pub mod scc;
pub mod toposort;
pub mod traversal;

pub use condensation::{build_condensation, Condensation};
pub use digraph::DiGraph;
pub use longest_path::{lift_to_nodes, longest_path_depths, longest_path_reverse_depths};
pub use projection::{project_undirected, UndirectedProjection};
pub use reachability::{ancestor_node_counts, descendant_node_counts, strict_transitive_counts};
pub use scc::tarjan_scc;
pub use toposort::topological_order;
pub use traversal::{bfs_forward, bfs_upstream};
