use std::collections::{HashMap, HashSet};

use codegraph_core::{Edge, Node};

use crate::kernels::triage::HighCentralityCandidate;

/// Nodes called from at least `threshold` distinct external modules,
/// ordered by calling-module count then caller_count, matching
/// `fetch_high_centrality_nodes`'s `HAVING`/`ORDER BY` clause.
fn calling_module_counts<'a>(nodes: &'a [Node], edges: &[Edge]) -> HashMap<&'a str, (u32, &'a Node)> {
    let by_hash: HashMap<&str, &Node> = nodes.iter().map(|n| (n.hash.as_str(), n)).collect();
    let mut callers_by_callee: HashMap<&str, HashSet<&str>> = HashMap::new();
    for e in edges {
        let Some(&callee) = by_hash.get(e.callee_hash.as_str()) else { continue };
        let Some(&caller) = by_hash.get(e.caller_hash.as_str()) else { continue };
        if callee.is_external() {
            continue;
        }
        let caller_mod = caller.module_or_external();
        if caller.module.is_none() || caller_mod == callee.module_or_external() || caller.is_external() {
            continue;
        }
        callers_by_callee.entry(callee.hash.as_str()).or_default().insert(caller_mod);
    }
    callers_by_callee
        .into_iter()
        .map(|(hash, mods)| (hash, (mods.len() as u32, by_hash[hash])))
        .collect()
}

pub fn high_centrality_nodes(nodes: &[Node], edges: &[Edge], threshold: u32) -> Vec<Node> {
    let counts = calling_module_counts(nodes, edges);
    let mut rows: Vec<(u32, &Node)> =
        counts.into_values().filter(|(count, _)| *count >= threshold).collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.caller_count.cmp(&a.1.caller_count)));
    rows.truncate(100);
    rows.into_iter().map(|(_, n)| n.clone()).collect()
}

pub fn high_centrality_candidates(nodes: &[Node], edges: &[Edge], threshold: u32) -> Vec<HighCentralityCandidate> {
    let counts = calling_module_counts(nodes, edges);
    let mut rows: Vec<(u32, &Node)> =
        counts.into_values().filter(|(count, _)| *count >= threshold).collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.caller_count.cmp(&a.1.caller_count)));
    rows.truncate(100);
    rows.into_iter()
        .map(|(calling_modules, n)| HighCentralityCandidate {
            hash: n.hash.clone(),
            name: n.name.clone(),
            module: n.module.clone(),
            calling_modules,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, Risk};

    fn node(hash: &str, module: &str, caller_count: u32) -> Node {
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
            risk: Risk::Low,
        }
    }

    #[test]
    fn counts_distinct_calling_modules_not_calls() {
        let nodes = vec![node("target", "core", 3), node("a1", "a", 1), node("a2", "a", 1), node("b1", "b", 1)];
        let edges = vec![
            Edge { caller_hash: "a1".into(), callee_hash: "target".into(), call_count: 1 },
            Edge { caller_hash: "a2".into(), callee_hash: "target".into(), call_count: 1 },
            Edge { caller_hash: "b1".into(), callee_hash: "target".into(), call_count: 1 },
        ];
        let candidates = high_centrality_candidates(&nodes, &edges, 2);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].hash, "target");
        assert_eq!(candidates[0].calling_modules, 2);
    }

    #[test]
    fn same_module_calls_do_not_count_toward_threshold() {
        let nodes = vec![node("target", "core", 2), node("c1", "core", 1)];
        let edges = vec![Edge { caller_hash: "c1".into(), callee_hash: "target".into(), call_count: 1 }];
        assert!(high_centrality_candidates(&nodes, &edges, 1).is_empty());
        assert!(high_centrality_nodes(&nodes, &edges, 1).is_empty());
    }
}
