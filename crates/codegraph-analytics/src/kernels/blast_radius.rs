use std::collections::BTreeSet;

use codegraph_core::{CodeGraphError, Edge, Node, Result};
use codegraph_graph::{bfs_upstream, DiGraph};
use serde::Serialize;

const DEFAULT_MAX_DEPTH: u32 = 5;
const MAX_ALLOWED_DEPTH: u32 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct AffectedNode {
    pub hash: String,
    pub depth: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlastRadiusReport {
    pub affected_nodes: Vec<AffectedNode>,
    pub affected_modules: Vec<String>,
    pub max_depth_reached: u32,
}

pub fn blast_radius(
    repo_id: &str,
    nodes: &[Node],
    edges: &[Edge],
    target_hash: &str,
    max_depth: Option<u32>,
) -> Result<BlastRadiusReport> {
    let max_depth = max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
    if max_depth > MAX_ALLOWED_DEPTH {
        return Err(CodeGraphError::InvalidArgument {
            operation: "blast_radius".to_string(),
            detail: format!("max_depth {} exceeds limit {}", max_depth, MAX_ALLOWED_DEPTH),
        });
    }

    let hashes: Vec<&str> = nodes.iter().map(|n| n.hash.as_str()).collect();
    let module_of: std::collections::HashMap<&str, &str> = nodes
        .iter()
        .map(|n| (n.hash.as_str(), n.module_or_external()))
        .collect();

    let graph = DiGraph::build(
        hashes.iter().copied(),
        edges.iter().map(|e| (e.caller_hash.as_str(), e.callee_hash.as_str(), e.call_count)),
    );

    let target_idx = graph.index_of(target_hash).ok_or_else(|| CodeGraphError::NodeNotFound {
        repo_id: repo_id.to_string(),
        hash: target_hash.to_string(),
    })?;

    let affected = bfs_upstream(&graph, target_idx, max_depth);

    let mut affected_nodes: Vec<AffectedNode> = affected
        .iter()
        .map(|&(idx, depth)| AffectedNode {
            hash: graph.hash(idx).to_string(),
            depth,
        })
        .collect();
    affected_nodes.sort_by(|a, b| a.depth.cmp(&b.depth).then(a.hash.cmp(&b.hash)));

    let affected_modules: Vec<String> = affected
        .iter()
        .map(|&(idx, _)| module_of.get(graph.hash(idx)).copied().unwrap_or("").to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let max_depth_reached = affected_nodes.iter().map(|n| n.depth).max().unwrap_or(0);

    Ok(BlastRadiusReport {
        affected_nodes,
        affected_modules,
        max_depth_reached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, Risk};

    fn node(hash: &str) -> Node {
        Node {
            hash: hash.to_string(),
            name: hash.to_string(),
            module: Some("m".to_string()),
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
    fn scenario_f_blast_radius() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d"), node("e"), node("f")];
        let edges = vec![
            Edge { caller_hash: "b".into(), callee_hash: "a".into(), call_count: 1 },
            Edge { caller_hash: "c".into(), callee_hash: "b".into(), call_count: 1 },
            Edge { caller_hash: "d".into(), callee_hash: "c".into(), call_count: 1 },
            Edge { caller_hash: "e".into(), callee_hash: "d".into(), call_count: 1 },
            Edge { caller_hash: "f".into(), callee_hash: "e".into(), call_count: 1 },
        ];
        let report = blast_radius("repo", &nodes, &edges, "a", Some(3)).unwrap();
        let hashes: Vec<&str> = report.affected_nodes.iter().map(|n| n.hash.as_str()).collect();
        assert_eq!(hashes, vec!["b", "c", "d"]);
        assert_eq!(report.max_depth_reached, 3);
    }

    #[test]
    fn rejects_max_depth_over_limit() {
        let nodes = vec![node("a")];
        let edges = vec![];
        let err = blast_radius("repo", &nodes, &edges, "a", Some(11)).unwrap_err();
        assert!(matches!(err, CodeGraphError::InvalidArgument { .. }));
    }
}
