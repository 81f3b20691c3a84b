use std::collections::HashMap;

use codegraph_core::Node;
use serde::Serialize;

use crate::kernels::diff::{diff_status_map, DiffStatus};
use crate::pivot::{Dimension, GraphEdge, PivotNode, PivotResult, PivotRow, ResolvedDim};

/// Fixed numeric codes for the pivot diff overlay: added/modified/default/
/// removed, in that order, matching the result contract exactly.
pub fn status_code(status: Option<DiffStatus>) -> f64 {
    match status {
        Some(DiffStatus::Added) => 0.0,
        Some(DiffStatus::Modified) => 0.25,
        None => 0.5,
        Some(DiffStatus::Removed) => 1.0,
    }
}

fn symbol_key(row: &PivotRow) -> String {
    format!("{}::{}", row.node.module_or_external(), row.node.name)
}

/// Pairs two snapshots' node sets into the per-symbol status map used to
/// annotate a pivot computed over either side.
pub fn symbol_statuses(nodes_a: &[Node], nodes_b: &[Node]) -> HashMap<String, DiffStatus> {
    diff_status_map(nodes_a, nodes_b)
}

fn matches_key(dims: &[ResolvedDim], key: &[(String, String)], row: &PivotRow) -> bool {
    key.iter().all(|(token, value)| {
        dims.iter().find(|d| d.token() == *token).is_some_and(|d| &d.key(row) == value)
    })
}

fn annotate_node(node: &mut PivotNode, dims: &[ResolvedDim], rows: &[PivotRow], status: &HashMap<String, DiffStatus>) {
    let members: Vec<&PivotRow> = rows.iter().filter(|r| matches_key(dims, &node.key, r)).collect();
    let mean = if members.is_empty() {
        0.5
    } else {
        members.iter().map(|r| status_code(status.get(&symbol_key(r)).copied())).sum::<f64>() / members.len() as f64
    };
    node.values.insert("diff_status_value".to_string(), Some(mean));
    for child in &mut node.children {
        annotate_node(child, dims, rows, status);
    }
}

/// Annotates every row of `result` with `diff_status_value`, in place.
/// `dims` must be the same dimensions (resolved against `rows`) that
/// produced `result`; pass an empty slice for a symbol-grain result.
pub fn annotate_pivot(result: &mut PivotResult, dims: &[Dimension], rows: &[PivotRow], status: &HashMap<String, DiffStatus>) {
    if dims.is_empty() {
        for node in &mut result.rows {
            let sym = node.key.iter().find(|(k, _)| k == "symbol").map(|(_, v)| v.clone());
            let value = sym.map(|s| status_code(status.get(&s).copied())).unwrap_or(0.5);
            node.values.insert("diff_status_value".to_string(), Some(value));
        }
        return;
    }
    let resolved: Vec<ResolvedDim> = dims.iter().map(|d| ResolvedDim::resolve(*d, rows)).collect();
    for node in &mut result.rows {
        annotate_node(node, &resolved, rows, status);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDiffStatus {
    Added,
    Modified,
    Unchanged,
}

/// A changed-status endpoint (added or removed relative to the other
/// snapshot) collapses into `Added` here: the edge contract only has three
/// buckets, and "existed in only one snapshot" is the nearest fit to
/// "added" for either direction of comparison.
fn endpoint_bucket(status: Option<DiffStatus>) -> EdgeDiffStatus {
    match status {
        Some(DiffStatus::Added) | Some(DiffStatus::Removed) => EdgeDiffStatus::Added,
        Some(DiffStatus::Modified) => EdgeDiffStatus::Modified,
        None => EdgeDiffStatus::Unchanged,
    }
}

fn worse(a: EdgeDiffStatus, b: EdgeDiffStatus) -> EdgeDiffStatus {
    use EdgeDiffStatus::*;
    match (a, b) {
        (Added, _) | (_, Added) => Added,
        (Modified, _) | (_, Modified) => Modified,
        _ => Unchanged,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub status: EdgeDiffStatus,
}

/// Annotates induced-subgraph edges for a symbol-grain result: each group
/// is a single symbol, so the endpoint status comes straight from the
/// per-symbol map keyed by `module::name`.
pub fn annotate_symbol_edges(edges: &[GraphEdge], status: &HashMap<String, DiffStatus>) -> Vec<AnnotatedEdge> {
    edges
        .iter()
        .map(|e| {
            let s = endpoint_bucket(status.get(&e.source).copied());
            let t = endpoint_bucket(status.get(&e.target).copied());
            AnnotatedEdge { source: e.source.clone(), target: e.target.clone(), weight: e.weight, status: worse(s, t) }
        })
        .collect()
}

/// Annotates induced-subgraph edges for a dimension-grouped result: a
/// group's status is the worst status among its member symbols.
pub fn annotate_group_edges(
    edges: &[GraphEdge],
    dim: &ResolvedDim,
    rows: &[PivotRow],
    status: &HashMap<String, DiffStatus>,
) -> Vec<AnnotatedEdge> {
    let mut group_status: HashMap<String, EdgeDiffStatus> = HashMap::new();
    for row in rows {
        let key = dim.key(row);
        let bucket = endpoint_bucket(status.get(&symbol_key(row)).copied());
        group_status.entry(key).and_modify(|existing| *existing = worse(*existing, bucket)).or_insert(bucket);
    }
    edges
        .iter()
        .map(|e| {
            let s = group_status.get(&e.source).copied().unwrap_or(EdgeDiffStatus::Unchanged);
            let t = group_status.get(&e.target).copied().unwrap_or(EdgeDiffStatus::Unchanged);
            AnnotatedEdge { source: e.source.clone(), target: e.target.clone(), weight: e.weight, status: worse(s, t) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::diff::DiffStatus;
    use crate::pivot::{build_rows, Dimension, SimpleDim};
    use codegraph_core::{Kind, NodeFeatures, Risk};

    fn node(hash: &str, module: &str) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some(module.to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity: 1,
            caller_count: 1,
            callee_count: 1,
            risk: Risk::Low,
        }
    }

    #[test]
    fn status_code_orders_added_below_removed() {
        assert!(status_code(Some(DiffStatus::Added)) < status_code(Some(DiffStatus::Modified)));
        assert!(status_code(Some(DiffStatus::Modified)) < status_code(None));
        assert!(status_code(None) < status_code(Some(DiffStatus::Removed)));
    }

    #[test]
    fn endpoint_bucket_collapses_added_and_removed() {
        assert_eq!(endpoint_bucket(Some(DiffStatus::Added)), EdgeDiffStatus::Added);
        assert_eq!(endpoint_bucket(Some(DiffStatus::Removed)), EdgeDiffStatus::Added);
        assert_eq!(endpoint_bucket(Some(DiffStatus::Modified)), EdgeDiffStatus::Modified);
        assert_eq!(endpoint_bucket(None), EdgeDiffStatus::Unchanged);
    }

    #[test]
    fn annotate_symbol_edges_takes_the_worse_endpoint() {
        let mut status = HashMap::new();
        status.insert("m::a".to_string(), DiffStatus::Added);
        let edges = vec![GraphEdge { source: "m::a".into(), target: "m::b".into(), weight: 1.0 }];
        let annotated = annotate_symbol_edges(&edges, &status);
        assert_eq!(annotated[0].status, EdgeDiffStatus::Added);
    }

    #[test]
    fn annotate_group_edges_uses_worst_member_per_group() {
        let nodes = vec![node("a1", "a"), node("a2", "a"), node("b1", "b")];
        let features: Vec<NodeFeatures> = Vec::new();
        let rows = build_rows(&nodes, &features);
        let resolved = ResolvedDim::resolve(Dimension::Simple(SimpleDim::Module), &rows);

        let mut status = HashMap::new();
        status.insert("a::a1".to_string(), DiffStatus::Modified);

        let edges = vec![GraphEdge { source: "a".into(), target: "b".into(), weight: 1.0 }];
        let annotated = annotate_group_edges(&edges, &resolved, &rows, &status);
        assert_eq!(annotated[0].status, EdgeDiffStatus::Modified);
    }
}
