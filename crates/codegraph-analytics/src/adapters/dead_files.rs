use std::collections::HashMap;

use codegraph_core::{Kind, Node};

use crate::kernels::triage::DeadFileStat;

/// Per-file dead/total symbol counts among function/method/class symbols,
/// kept only for files with >=5 such symbols and a dead ratio >=0.6,
/// worst-first, capped at 5 — mirrors the triage bundle's dead-file query.
pub fn dead_file_stats(nodes: &[Node]) -> Vec<DeadFileStat> {
    let mut totals: HashMap<&str, (u32, u32)> = HashMap::new();
    for n in nodes {
        if n.is_external() {
            continue;
        }
        if !matches!(n.kind, Kind::Function | Kind::Method | Kind::Class) {
            continue;
        }
        let entry = totals.entry(n.file_path.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if n.caller_count == 0 {
            entry.1 += 1;
        }
    }
    let mut rows: Vec<DeadFileStat> = totals
        .into_iter()
        .filter(|(_, (total, dead))| *total >= 5 && (*dead as f64) / (*total as f64) >= 0.6)
        .map(|(file_path, (total, dead))| DeadFileStat { file_path: file_path.to_string(), total, dead })
        .collect();
    rows.sort_by(|a, b| b.dead.cmp(&a.dead));
    rows.truncate(5);
    rows
}
