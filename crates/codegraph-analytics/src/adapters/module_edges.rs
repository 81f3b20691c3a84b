use codegraph_core::{Edge, Node};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CallDetail {
    pub caller_name: String,
    pub caller_hash: String,
    pub caller_file: String,
    pub callee_name: String,
    pub callee_hash: String,
    pub callee_file: String,
    pub call_count: u32,
}

/// Function-level calls between two specific modules, worst-first by
/// call count, capped at `limit`.
pub fn module_edges_detail(nodes: &[Node], edges: &[Edge], from_module: &str, to_module: &str, limit: usize) -> Vec<CallDetail> {
    let by_hash: std::collections::HashMap<&str, &Node> = nodes.iter().map(|n| (n.hash.as_str(), n)).collect();
    let mut rows: Vec<CallDetail> = edges
        .iter()
        .filter_map(|e| {
            let caller = by_hash.get(e.caller_hash.as_str())?;
            let callee = by_hash.get(e.callee_hash.as_str())?;
            if caller.module.as_deref() != Some(from_module) || callee.module.as_deref() != Some(to_module) {
                return None;
            }
            if caller.is_external() || callee.is_external() {
                return None;
            }
            Some(CallDetail {
                caller_name: caller.name.clone(),
                caller_hash: caller.hash.clone(),
                caller_file: caller.file_path.clone(),
                callee_name: callee.name.clone(),
                callee_hash: callee.hash.clone(),
                callee_file: callee.file_path.clone(),
                call_count: e.call_count,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.call_count.cmp(&a.call_count));
    rows.truncate(limit);
    rows
}
