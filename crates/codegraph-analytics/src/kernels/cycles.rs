use std::collections::{BTreeSet, HashMap};

use codegraph_core::{Edge, Node};
use codegraph_graph::{tarjan_scc, DiGraph};
use serde::Serialize;

const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct BreakSuggestion {
    pub caller_hash: String,
    pub callee_hash: String,
    pub call_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub members: Vec<String>,
    pub modules: Vec<String>,
    pub cross_module: bool,
    pub break_suggestion: Option<BreakSuggestion>,
}

/// SCCs of size > 1, sorted descending by size, truncated to `top_n`
/// (defaulting to 20). Ties in size are broken by ascending first-member
/// hash, for a deterministic order.
pub fn cycles(nodes: &[Node], edges: &[Edge], top_n: Option<usize>) -> Vec<CycleReport> {
    let hashes: Vec<&str> = nodes.iter().map(|n| n.hash.as_str()).collect();
    let module_of: HashMap<&str, &str> = nodes
        .iter()
        .map(|n| (n.hash.as_str(), n.module_or_external()))
        .collect();

    let graph = DiGraph::build(
        hashes.iter().copied(),
        edges.iter().map(|e| (e.caller_hash.as_str(), e.callee_hash.as_str(), e.call_count)),
    );
    let sccs = tarjan_scc(&graph);

    let mut reports: Vec<CycleReport> = sccs
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut members: Vec<String> = scc.iter().map(|&idx| graph.hash(idx).to_string()).collect();
            members.sort();

            let member_set: BTreeSet<&str> = members.iter().map(|s| s.as_str()).collect();
            let mut modules: Vec<String> = scc
                .iter()
                .map(|&idx| module_of.get(graph.hash(idx)).copied().unwrap_or("").to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            modules.sort();
            let cross_module = modules.len() >= 2;

            let mut intra_edges: Vec<(&str, &str, u32)> = Vec::new();
            for &idx in &scc {
                for &(succ, weight) in graph.successors(idx) {
                    let succ_hash = graph.hash(succ);
                    if member_set.contains(succ_hash) {
                        intra_edges.push((graph.hash(idx), succ_hash, weight));
                    }
                }
            }
            // Deterministic tie-break: lowest call_count wins; ties broken
            // by (caller_hash, callee_hash) ascending.
            intra_edges.sort_by(|a, b| a.2.cmp(&b.2).then(a.0.cmp(b.0)).then(a.1.cmp(b.1)));
            let break_suggestion = intra_edges.first().map(|&(caller, callee, call_count)| {
                BreakSuggestion {
                    caller_hash: caller.to_string(),
                    callee_hash: callee.to_string(),
                    call_count,
                }
            });

            CycleReport {
                members,
                modules,
                cross_module,
                break_suggestion,
            }
        })
        .collect();

    reports.sort_by(|a, b| b.members.len().cmp(&a.members.len()).then(a.members.cmp(&b.members)));
    reports.truncate(top_n.unwrap_or(DEFAULT_TOP_N));
    reports
}
