use std::collections::{HashMap, HashSet};

use codegraph_core::{content_fingerprint, Edge, Node};
use serde::Serialize;

fn diff_key(node: &Node) -> String {
    format!("{}::{}", node.module_or_external(), node.name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Removed,
    Modified,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffSummary {
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub nodes_common: usize,
    pub nodes_modified: usize,
    pub similarity: f64,
}

/// Matches nodes across two snapshots by `(module, name)`, not hash (the
/// hash carries content and would never match across an edit).
pub fn diff(nodes_a: &[Node], nodes_b: &[Node]) -> DiffSummary {
    let by_key_a: HashMap<String, &Node> = nodes_a.iter().map(|n| (diff_key(n), n)).collect();
    let by_key_b: HashMap<String, &Node> = nodes_b.iter().map(|n| (diff_key(n), n)).collect();

    let keys_a: HashSet<&String> = by_key_a.keys().collect();
    let keys_b: HashSet<&String> = by_key_b.keys().collect();

    let added = keys_b.difference(&keys_a).count();
    let removed = keys_a.difference(&keys_b).count();
    let common_keys: Vec<&&String> = keys_a.intersection(&keys_b).collect();
    let common = common_keys.len();

    let modified = common_keys
        .iter()
        .filter(|&&key| {
            let a = by_key_a[key.as_str()];
            let b = by_key_b[key.as_str()];
            content_fingerprint(&a.hash) != content_fingerprint(&b.hash)
        })
        .count();

    let union = keys_a.union(&keys_b).count();
    let similarity = if union > 0 { common as f64 / union as f64 } else { 1.0 };

    DiffSummary {
        nodes_added: added,
        nodes_removed: removed,
        nodes_common: common,
        nodes_modified: modified,
        similarity,
    }
}

/// Keyed by `module::name`; only present for nodes whose status differs
/// from unchanged (unchanged nodes are omitted, per the source's sparse
/// status-map convention).
pub fn diff_status_map(nodes_a: &[Node], nodes_b: &[Node]) -> HashMap<String, DiffStatus> {
    let by_key_a: HashMap<String, &Node> = nodes_a.iter().map(|n| (diff_key(n), n)).collect();
    let by_key_b: HashMap<String, &Node> = nodes_b.iter().map(|n| (diff_key(n), n)).collect();

    let mut map = HashMap::new();
    for (key, node_b) in &by_key_b {
        match by_key_a.get(key) {
            None => {
                map.insert(key.clone(), DiffStatus::Added);
            }
            Some(node_a) => {
                if content_fingerprint(&node_a.hash) != content_fingerprint(&node_b.hash) {
                    map.insert(key.clone(), DiffStatus::Modified);
                }
            }
        }
    }
    for key in by_key_a.keys() {
        if !by_key_b.contains_key(key) {
            map.insert(key.clone(), DiffStatus::Removed);
        }
    }
    map
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffEdge {
    pub source: String,
    pub target: String,
    pub status: EdgeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<DiffEdge>,
    pub context_trimmed: bool,
}

/// Changed nodes (added/removed/modified, by diff key) plus up to
/// `max_context` neighbors (by `caller_count` desc) from each snapshot,
/// capped at `max_nodes` total with context trimmed first when over.
pub fn diff_graph(
    nodes_a: &[Node],
    edges_a: &[Edge],
    nodes_b: &[Node],
    edges_b: &[Edge],
    max_context: usize,
    max_nodes: usize,
) -> DiffGraph {
    let status_map = diff_status_map(nodes_a, nodes_b);
    let by_key_a: HashMap<String, &Node> = nodes_a.iter().map(|n| (diff_key(n), n)).collect();
    let by_key_b: HashMap<String, &Node> = nodes_b.iter().map(|n| (diff_key(n), n)).collect();

    let changed_keys: HashSet<&String> = status_map.keys().collect();
    let mut changed_hashes: HashSet<String> = HashSet::new();
    for key in &changed_keys {
        if let Some(n) = by_key_a.get(key.as_str()) {
            changed_hashes.insert(n.hash.clone());
        }
        if let Some(n) = by_key_b.get(key.as_str()) {
            changed_hashes.insert(n.hash.clone());
        }
    }

    let mut context_hashes: HashSet<String> = HashSet::new();
    let mut neighbor_gather = |nodes: &[Node], edges: &[Edge]| {
        let node_by_hash: HashMap<&str, &Node> = nodes.iter().map(|n| (n.hash.as_str(), n)).collect();
        for hash in &changed_hashes {
            let mut neighbors: Vec<&str> = edges
                .iter()
                .filter(|e| e.caller_hash == *hash || e.callee_hash == *hash)
                .map(|e| if e.caller_hash == *hash { e.callee_hash.as_str() } else { e.caller_hash.as_str() })
                .collect();
            neighbors.sort_by(|a, b| {
                let ca = node_by_hash.get(a).map(|n| n.caller_count).unwrap_or(0);
                let cb = node_by_hash.get(b).map(|n| n.caller_count).unwrap_or(0);
                cb.cmp(&ca).then(a.cmp(b))
            });
            neighbors.dedup();
            for &n in neighbors.iter().take(max_context) {
                context_hashes.insert(n.to_string());
            }
        }
    };
    neighbor_gather(nodes_a, edges_a);
    neighbor_gather(nodes_b, edges_b);
    context_hashes.retain(|h| !changed_hashes.contains(h));

    let mut context_trimmed = false;
    let mut all_hashes: Vec<String> = changed_hashes.iter().cloned().collect();
    all_hashes.sort();
    let mut context_sorted: Vec<String> = context_hashes.into_iter().collect();
    context_sorted.sort();

    if all_hashes.len() + context_sorted.len() > max_nodes {
        context_trimmed = true;
        let remaining = max_nodes.saturating_sub(all_hashes.len());
        context_sorted.truncate(remaining);
    }
    all_hashes.extend(context_sorted);
    all_hashes.truncate(max_nodes);

    let node_set: HashSet<&str> = all_hashes.iter().map(|s| s.as_str()).collect();

    let edge_set_a: HashSet<(&str, &str)> = edges_a
        .iter()
        .map(|e| (e.caller_hash.as_str(), e.callee_hash.as_str()))
        .collect();
    let edge_set_b: HashSet<(&str, &str)> = edges_b
        .iter()
        .map(|e| (e.caller_hash.as_str(), e.callee_hash.as_str()))
        .collect();

    let mut edges = Vec::new();
    for &(src, tgt) in edge_set_a.union(&edge_set_b) {
        if !node_set.contains(src) || !node_set.contains(tgt) {
            continue;
        }
        let status = match (edge_set_a.contains(&(src, tgt)), edge_set_b.contains(&(src, tgt))) {
            (true, true) => EdgeStatus::Unchanged,
            (false, true) => EdgeStatus::Added,
            (true, false) => EdgeStatus::Removed,
            (false, false) => unreachable!(),
        };
        edges.push(DiffEdge {
            source: src.to_string(),
            target: tgt.to_string(),
            status,
        });
    }
    edges.sort_by(|a, b| a.source.cmp(&b.source).then(a.target.cmp(&b.target)));

    DiffGraph {
        nodes: all_hashes,
        edges,
        context_trimmed,
    }
}
