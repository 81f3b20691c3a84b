use std::collections::HashSet;

use codegraph_core::{CodeGraphError, Edge, Node, Result};
use serde::Serialize;

/// Subgraph of internal nodes (optionally restricted to one module) plus
/// the edges between the returned nodes. `limit`/`offset` page the node
/// list; edges are fetched only among the nodes actually returned.
pub fn graph(
    nodes: &[Node],
    edges: &[Edge],
    module: Option<&str>,
    limit: usize,
    offset: usize,
) -> (Vec<Node>, Vec<Edge>) {
    let filtered: Vec<&Node> = nodes
        .iter()
        .filter(|n| match module {
            Some(m) => n.module.as_deref() == Some(m),
            None => !n.is_external(),
        })
        .collect();
    let page: Vec<Node> = filtered.into_iter().skip(offset).take(limit).cloned().collect();
    let hashes: HashSet<&str> = page.iter().map(|n| n.hash.as_str()).collect();
    let page_edges: Vec<Edge> = edges
        .iter()
        .filter(|e| {
            hashes.contains(e.caller_hash.as_str())
                && hashes.contains(e.callee_hash.as_str())
                && !e.callee_hash.starts_with("ext:")
        })
        .cloned()
        .collect();
    (page, page_edges)
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeDetail {
    pub node: Node,
    pub callers: Vec<Node>,
    pub callees: Vec<Node>,
}

/// Single node plus its immediate internal callers/callees.
pub fn node_detail(nodes: &[Node], edges: &[Edge], hash: &str, repo_id: &str) -> Result<NodeDetail> {
    let by_hash: std::collections::HashMap<&str, &Node> = nodes.iter().map(|n| (n.hash.as_str(), n)).collect();
    let node = by_hash
        .get(hash)
        .copied()
        .cloned()
        .ok_or_else(|| CodeGraphError::NodeNotFound { repo_id: repo_id.to_string(), hash: hash.to_string() })?;

    let callers = edges
        .iter()
        .filter(|e| e.callee_hash == hash)
        .filter_map(|e| by_hash.get(e.caller_hash.as_str()).copied().cloned())
        .collect();
    let callees = edges
        .iter()
        .filter(|e| e.caller_hash == hash)
        .filter_map(|e| by_hash.get(e.callee_hash.as_str()).copied().cloned())
        .collect();

    Ok(NodeDetail { node, callers, callees })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, Risk};

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

    fn edge(caller: &str, callee: &str) -> Edge {
        Edge { caller_hash: caller.to_string(), callee_hash: callee.to_string(), call_count: 1 }
    }

    #[test]
    fn graph_restricts_to_requested_module() {
        let nodes = vec![node("a1", "a"), node("b1", "b")];
        let edges = vec![edge("a1", "b1")];
        let (page, page_edges) = graph(&nodes, &edges, Some("a"), 10, 0);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].hash, "a1");
        assert!(page_edges.is_empty(), "b1 is outside the module so the edge has no destination in scope");
    }

    #[test]
    fn graph_pages_with_limit_and_offset() {
        let nodes = vec![node("a1", "a"), node("a2", "a"), node("a3", "a")];
        let (page, _) = graph(&nodes, &[], None, 1, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].hash, "a2");
    }

    #[test]
    fn node_detail_collects_immediate_callers_and_callees() {
        let nodes = vec![node("a1", "a"), node("a2", "a"), node("a3", "a")];
        let edges = vec![edge("a1", "a2"), edge("a2", "a3")];
        let detail = node_detail(&nodes, &edges, "a2", "repo").unwrap();
        assert_eq!(detail.callers.len(), 1);
        assert_eq!(detail.callers[0].hash, "a1");
        assert_eq!(detail.callees.len(), 1);
        assert_eq!(detail.callees[0].hash, "a3");
    }

    #[test]
    fn node_detail_missing_hash_raises_not_found() {
        let nodes = vec![node("a1", "a")];
        let err = node_detail(&nodes, &[], "missing", "repo").unwrap_err();
        assert!(matches!(err, CodeGraphError::NodeNotFound { .. }));
    }
}
