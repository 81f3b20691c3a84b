use codegraph_core::{ModuleEdge, Node};
use serde::Serialize;

use crate::kernels::coupling::{coupling, ModuleCoupling};

#[derive(Debug, Clone, Serialize)]
pub struct ModuleGraph {
    pub modules: Vec<ModuleCoupling>,
    pub edges: Vec<ModuleEdge>,
    pub max_depth: usize,
}

/// Rolled-up module coupling table, the inter-module edges, and the
/// deepest dotted/slash module path among non-sentinel modules (used by
/// the force-graph view to size its depth axis).
pub fn module_graph(nodes: &[Node], module_edges: &[ModuleEdge]) -> ModuleGraph {
    let modules = coupling(module_edges, nodes);
    let max_depth = modules
        .iter()
        .filter(|m| !m.module.starts_with("__"))
        .map(|m| m.module.split(['.', '/']).count())
        .max()
        .unwrap_or(1);
    ModuleGraph { modules, edges: module_edges.to_vec(), max_depth }
}
