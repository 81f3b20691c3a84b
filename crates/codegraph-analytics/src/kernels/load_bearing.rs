use codegraph_core::{LoadBearingConfig, Node};
use serde::Serialize;

/// Module-path keyword set for the `auto` load-bearing heuristic.
const KEYWORDS: &[&str] = &[
    "core", "platform", "base", "shared", "common", "infra", "lib", "utils", "foundation",
    "primitives", "runtime", "framework", "kernel",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Explicit,
    Auto,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadBearingNode {
    pub hash: String,
    pub name: String,
    pub module: String,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadBearingReport {
    pub declared: Vec<LoadBearingNode>,
    pub unexpected_load_bearing: Vec<String>,
}

fn module_parts(module: &str) -> impl Iterator<Item = &str> {
    module.split(['.', '/'])
}

fn matches_keyword(module: &str) -> bool {
    module_parts(module).any(|part| KEYWORDS.contains(&part.to_lowercase().as_str()))
}

fn declaration_kind(node: &Node, config: &LoadBearingConfig) -> Option<DeclarationKind> {
    if config.declares_node(&node.hash) || config.declares_module(node.module_or_external()) {
        return Some(DeclarationKind::Explicit);
    }
    if matches_keyword(node.module_or_external()) {
        return Some(DeclarationKind::Auto);
    }
    None
}

/// `candidates` must already be filtered by the adapter to nodes called
/// from at least the configured number of distinct external modules.
pub fn load_bearing(candidates: &[Node], config: &LoadBearingConfig) -> LoadBearingReport {
    let mut declared = Vec::new();
    let mut unexpected = Vec::new();

    for node in candidates {
        match declaration_kind(node, config) {
            Some(kind) => declared.push(LoadBearingNode {
                hash: node.hash.clone(),
                name: node.name.clone(),
                module: node.module_or_external().to_string(),
                kind,
            }),
            None => unexpected.push(node.hash.clone()),
        }
    }

    declared.sort_by(|a, b| a.hash.cmp(&b.hash));
    unexpected.sort();

    LoadBearingReport {
        declared,
        unexpected_load_bearing: unexpected,
    }
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
            caller_count: 5,
            callee_count: 1,
            risk: Risk::Low,
        }
    }

    #[test]
    fn explicit_beats_keyword_and_declares_wins_over_no_match() {
        let mut config = LoadBearingConfig::default();
        config.declared_nodes.push("a:1".to_string());
        config.declared_modules.push("payments".to_string());

        let candidates = vec![
            node("a:1", "weird.module"),
            node("a:2", "payments.gateway"),
            node("a:3", "core.util"),
            node("a:4", "widgets.display"),
        ];

        let report = load_bearing(&candidates, &config);
        assert_eq!(report.declared.len(), 3);
        assert_eq!(report.unexpected_load_bearing, vec!["a:4".to_string()]);

        let explicit_hashes: Vec<&str> = report
            .declared
            .iter()
            .filter(|n| n.kind == DeclarationKind::Explicit)
            .map(|n| n.hash.as_str())
            .collect();
        assert_eq!(explicit_hashes, vec!["a:1", "a:2"]);

        let auto_hashes: Vec<&str> = report
            .declared
            .iter()
            .filter(|n| n.kind == DeclarationKind::Auto)
            .map(|n| n.hash.as_str())
            .collect();
        assert_eq!(auto_hashes, vec!["a:3"]);
    }
}
