use std::collections::{HashMap, HashSet};

use codegraph_core::{Edge, Node, Risk};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleCount {
    pub module: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub node_count: usize,
    pub edge_count: usize,
    pub module_count: usize,
    pub dead_symbol_estimate: usize,
    pub cycle_candidates: usize,
    pub top_modules: Vec<ModuleCount>,
    pub risk_distribution: HashMap<Risk, usize>,
}

/// Aggregate repo-level stats for the overview page. `nodes`/`edges`
/// should include external rows; internal/external filtering happens
/// per-metric below to match the source query's mixed scoping.
pub fn overview(nodes: &[Node], edges: &[Edge]) -> Overview {
    let node_count = nodes.len();
    let edge_count = edges.len();

    let mut module_counts: HashMap<&str, usize> = HashMap::new();
    let mut dead_symbol_estimate = 0usize;
    let mut risk_distribution: HashMap<Risk, usize> = HashMap::new();

    for n in nodes {
        *risk_distribution.entry(n.risk).or_insert(0) += 1;
        if n.is_external() {
            continue;
        }
        if let Some(module) = &n.module {
            *module_counts.entry(module.as_str()).or_insert(0) += 1;
        }
        if n.caller_count == 0 {
            dead_symbol_estimate += 1;
        }
    }
    let module_count = module_counts.len();

    let mut top_modules: Vec<ModuleCount> =
        module_counts.into_iter().map(|(module, count)| ModuleCount { module: module.to_string(), count }).collect();
    top_modules.sort_by(|a, b| b.count.cmp(&a.count).then(a.module.cmp(&b.module)));
    top_modules.truncate(10);

    // A node that appears as both a caller and a callee somewhere is a
    // candidate member of a cycle, matching the source's intersection query.
    let mut has_outgoing: HashSet<&str> = HashSet::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for e in edges {
        has_outgoing.insert(e.caller_hash.as_str());
        has_incoming.insert(e.callee_hash.as_str());
    }
    let cycle_candidates = has_outgoing.intersection(&has_incoming).count();

    Overview {
        node_count,
        edge_count,
        module_count,
        dead_symbol_estimate,
        cycle_candidates,
        top_modules,
        risk_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::Kind;

    fn node(hash: &str, module: &str, caller_count: u32, risk: Risk) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some(module.to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity: 1,
            caller_count,
            callee_count: 1,
            risk,
        }
    }

    #[test]
    fn counts_dead_symbols_and_module_stats() {
        let nodes = vec![
            node("a1", "a", 0, Risk::Low),
            node("a2", "a", 2, Risk::High),
            node("b1", "b", 1, Risk::Low),
        ];
        let edges = vec![Edge { caller_hash: "a2".into(), callee_hash: "a1".into(), call_count: 1 }];
        let summary = overview(&nodes, &edges);
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.module_count, 2);
        assert_eq!(summary.dead_symbol_estimate, 1);
        assert_eq!(summary.top_modules[0].module, "a");
        assert_eq!(summary.top_modules[0].count, 2);
    }

    #[test]
    fn cycle_candidates_need_both_an_incoming_and_outgoing_edge() {
        let nodes = vec![node("a1", "a", 1, Risk::Low), node("a2", "a", 1, Risk::Low)];
        let edges = vec![Edge { caller_hash: "a1".into(), callee_hash: "a2".into(), call_count: 1 }];
        let summary = overview(&nodes, &edges);
        assert_eq!(summary.cycle_candidates, 0);
    }
}
