use std::collections::HashMap;

use codegraph_core::{ModuleEdge, Node};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleCoupling {
    pub module: String,
    pub afferent: u32,
    pub efferent: u32,
    pub instability: f64,
    pub symbol_count: usize,
    pub avg_complexity: f64,
}

/// `module_edges` should already have `__external__` rows filtered by the
/// caller. `nodes` supplies the per-module symbol stats joined onto each
/// coupling row.
pub fn coupling(module_edges: &[ModuleEdge], nodes: &[Node]) -> Vec<ModuleCoupling> {
    let mut afferent: HashMap<&str, u32> = HashMap::new();
    let mut efferent: HashMap<&str, u32> = HashMap::new();

    for edge in module_edges {
        *efferent.entry(edge.caller_module.as_str()).or_insert(0) += edge.edge_count;
        *afferent.entry(edge.callee_module.as_str()).or_insert(0) += edge.edge_count;
    }

    let mut symbol_count: HashMap<&str, usize> = HashMap::new();
    let mut complexity_sum: HashMap<&str, u64> = HashMap::new();
    for node in nodes {
        if node.is_external() {
            continue;
        }
        let module = node.module_or_external();
        *symbol_count.entry(module).or_insert(0) += 1;
        *complexity_sum.entry(module).or_insert(0) += node.complexity as u64;
    }

    let mut modules: Vec<&str> = afferent
        .keys()
        .chain(efferent.keys())
        .chain(symbol_count.keys())
        .copied()
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    modules.sort();

    let mut rows: Vec<ModuleCoupling> = modules
        .into_iter()
        .map(|module| {
            let ca = afferent.get(module).copied().unwrap_or(0);
            let ce = efferent.get(module).copied().unwrap_or(0);
            let instability = if ca + ce > 0 {
                ce as f64 / (ca + ce) as f64
            } else {
                0.0
            };
            let count = symbol_count.get(module).copied().unwrap_or(0);
            let avg_complexity = if count > 0 {
                complexity_sum.get(module).copied().unwrap_or(0) as f64 / count as f64
            } else {
                0.0
            };
            ModuleCoupling {
                module: module.to_string(),
                afferent: ca,
                efferent: ce,
                instability,
                symbol_count: count,
                avg_complexity,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        (b.afferent + b.efferent)
            .cmp(&(a.afferent + a.efferent))
            .then(a.module.cmp(&b.module))
    });
    rows
}
