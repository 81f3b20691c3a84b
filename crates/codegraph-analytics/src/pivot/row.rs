use codegraph_core::{Node, NodeFeatures};

/// A single internal symbol joined with its (optional) feature row. The
/// pivot engine works entirely over slices of these; it never touches a
/// snapshot handle directly (adapters own that).
#[derive(Clone, Copy)]
pub struct PivotRow<'a> {
    pub node: &'a Node,
    pub features: Option<&'a NodeFeatures>,
}

pub fn build_rows<'a>(nodes: &'a [Node], features: &'a [NodeFeatures]) -> Vec<PivotRow<'a>> {
    let by_hash: std::collections::HashMap<&str, &NodeFeatures> =
        features.iter().map(|f| (f.hash.as_str(), f)).collect();
    nodes
        .iter()
        .filter(|n| !n.is_external())
        .map(|n| PivotRow { node: n, features: by_hash.get(n.hash.as_str()).copied() })
        .collect()
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
    fn external_nodes_are_excluded_from_pivot_rows() {
        let mut ext = node("ext:a");
        ext.module = None;
        let nodes = vec![node("a"), ext];
        let rows = build_rows(&nodes, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].node.hash, "a");
    }

    #[test]
    fn each_row_is_joined_with_its_feature_set_when_present() {
        let nodes = vec![node("a"), node("b")];
        let features = vec![NodeFeatures::zeroed("a")];
        let rows = build_rows(&nodes, &features);
        assert!(rows.iter().find(|r| r.node.hash == "a").unwrap().features.is_some());
        assert!(rows.iter().find(|r| r.node.hash == "b").unwrap().features.is_none());
    }
}
