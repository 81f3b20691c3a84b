use std::collections::HashMap;

use codegraph_core::{Kind, Node};
use serde::Serialize;

/// Names that are conventionally invoked by a runtime/framework rather than
/// by other code in the repo, so a zero-caller count doesn't mean dead.
const ENTRYPOINT_NAMES: &[&str] = &[
    "main", "handler", "run", "init", "setup", "start", "serve", "execute", "__init__",
    "__main__",
];

/// Substrings marking a name as test/spec scaffolding rather than
/// production code, regardless of caller count.
const FRAMEWORK_NAME_PATTERNS: &[&str] = &["test_", "Test", "Spec"];

/// Path segments marking a file as test/fixture scaffolding.
const FRAMEWORK_PATH_SEGMENTS: &[&str] = &["test", "tests", "spec", "fixture", "fixtures", "conftest"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadCodeTier {
    Safe,
    Review,
    Caution,
}

fn matches_entrypoint_name(name: &str) -> bool {
    ENTRYPOINT_NAMES.iter().any(|&n| n.eq_ignore_ascii_case(name))
}

fn matches_framework_name(name: &str) -> bool {
    FRAMEWORK_NAME_PATTERNS.iter().any(|pat| {
        if pat.ends_with('_') {
            name.starts_with(pat)
        } else {
            name.ends_with(pat)
        }
    })
}

fn matches_framework_path(file_path: &str) -> bool {
    let lower = file_path.to_lowercase();
    FRAMEWORK_PATH_SEGMENTS
        .iter()
        .any(|seg| lower.split(['/', '\\']).any(|part| part == *seg))
}

pub fn classify_node(node: &Node) -> DeadCodeTier {
    if matches_entrypoint_name(&node.name)
        || matches_framework_name(&node.name)
        || matches_framework_path(&node.file_path)
        || node.kind == Kind::Class
    {
        return DeadCodeTier::Caution;
    }

    let is_private = node.name.starts_with('_');
    if is_private && node.complexity <= 8 {
        DeadCodeTier::Safe
    } else {
        DeadCodeTier::Review
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedNode {
    pub hash: String,
    pub name: String,
    pub complexity: u32,
    pub tier: DeadCodeTier,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileGroup {
    pub file_path: String,
    pub nodes: Vec<ClassifiedNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadCodeReport {
    pub groups: Vec<FileGroup>,
    pub safe_count: usize,
    pub review_count: usize,
    pub caution_count: usize,
    pub total_dead: usize,
    pub dead_ratio: f64,
}

/// `zero_caller_nodes` must already be filtered to internal nodes with
/// `caller_count == 0` by the adapter; `total_internal_symbols` is the
/// snapshot-wide internal node count (the denominator for `dead_ratio`).
pub fn dead_code(zero_caller_nodes: &[Node], total_internal_symbols: usize) -> DeadCodeReport {
    let mut by_file: HashMap<&str, Vec<ClassifiedNode>> = HashMap::new();
    let mut safe_count = 0;
    let mut review_count = 0;
    let mut caution_count = 0;

    for node in zero_caller_nodes {
        let tier = classify_node(node);
        match tier {
            DeadCodeTier::Safe => safe_count += 1,
            DeadCodeTier::Review => review_count += 1,
            DeadCodeTier::Caution => caution_count += 1,
        }
        by_file.entry(node.file_path.as_str()).or_default().push(ClassifiedNode {
            hash: node.hash.clone(),
            name: node.name.clone(),
            complexity: node.complexity,
            tier,
        });
    }

    let mut groups: Vec<FileGroup> = by_file
        .into_iter()
        .map(|(file_path, nodes)| FileGroup {
            file_path: file_path.to_string(),
            nodes,
        })
        .collect();
    groups.sort_by(|a, b| b.nodes.len().cmp(&a.nodes.len()).then(a.file_path.cmp(&b.file_path)));

    let total_dead = zero_caller_nodes.len();
    let dead_ratio = if total_internal_symbols > 0 {
        total_dead as f64 / total_internal_symbols as f64
    } else {
        0.0
    };

    DeadCodeReport {
        groups,
        safe_count,
        review_count,
        caution_count,
        total_dead,
        dead_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::Risk;

    fn node(hash: &str, name: &str, kind: Kind, complexity: u32) -> Node {
        Node {
            hash: hash.to_string(),
            name: name.to_string(),
            module: Some("a".to_string()),
            kind,
            file_path: "a.py".to_string(),
            line_start: 1,
            line_end: 2,
            complexity,
            caller_count: 0,
            callee_count: 0,
            risk: Risk::Low,
        }
    }

    #[test]
    fn scenario_a_dead_code_classification() {
        let nodes = vec![
            node("a:1", "_helper", Kind::Function, 4),
            node("a:2", "main", Kind::Function, 2),
            node("a:3", "UserService", Kind::Class, 1),
        ];
        let report = dead_code(&nodes, 5);
        assert_eq!(report.safe_count, 1);
        assert_eq!(report.caution_count, 2);
        assert_eq!(report.review_count, 0);
        assert_eq!(report.total_dead, 3);
        assert!((report.dead_ratio - 0.6).abs() < 1e-9);
    }
}
