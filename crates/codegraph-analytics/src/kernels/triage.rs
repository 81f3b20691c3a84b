use std::collections::HashMap;

use codegraph_core::{Edge, LoadBearingConfig, ModuleEdge, Node};
use serde::Serialize;

use crate::kernels::cycles::cycles;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

fn severity_rank(s: Severity) -> u8 {
    match s {
        Severity::High => 0,
        Severity::Medium => 1,
        Severity::Low => 2,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageIssue {
    pub issue_type: &'static str,
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    pub action: String,
    pub hash: Option<String>,
    pub name: Option<String>,
    pub module: Option<String>,
    pub modules: Option<Vec<String>>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageReport {
    pub issues: Vec<TriageIssue>,
}

/// Load-bearing candidate pre-filtered to `calling_modules >= 5`, fetched
/// by the triage bundle adapter from the centrality/coupling query.
#[derive(Debug, Clone)]
pub struct HighCentralityCandidate {
    pub hash: String,
    pub name: String,
    pub module: Option<String>,
    pub calling_modules: u32,
}

#[derive(Debug, Clone)]
pub struct DeadFileStat {
    pub file_path: String,
    pub total: u32,
    pub dead: u32,
}

/// Everything the triage steps read, bundled in one call by the only
/// orchestration adapter (the triage bundle), since the four checks are
/// otherwise independent of one another.
pub struct TriageInputs<'a> {
    pub high_centrality_nodes: &'a [HighCentralityCandidate],
    pub module_edges: &'a [ModuleEdge],
    pub call_graph_nodes: &'a [Node],
    pub call_graph_edges: &'a [Edge],
    pub dead_file_stats: &'a [DeadFileStat],
}

fn check_unexpected_coupling(inputs: &TriageInputs, config: &LoadBearingConfig) -> Vec<TriageIssue> {
    let candidates: Vec<&HighCentralityCandidate> = inputs
        .high_centrality_nodes
        .iter()
        .filter(|r| !config.declares_node(&r.hash) && !config.declares_module(r.module.as_deref().unwrap_or("")))
        .take(3)
        .collect();

    candidates
        .into_iter()
        .map(|row| {
            let severity = if row.calling_modules >= 8 { Severity::High } else { Severity::Medium };
            TriageIssue {
                issue_type: "unexpected_coupling",
                severity,
                title: format!("`{}` is load-bearing without declaration", row.name),
                detail: format!(
                    "Called from {} modules but not declared as load-bearing. Module: {}. \
                     This node will resist refactoring.",
                    row.calling_modules,
                    row.module.as_deref().unwrap_or("")
                ),
                action: "Open Building View → click this node → Declare load-bearing (if intentional) \
                          or plan to reduce its callers."
                    .to_string(),
                hash: Some(row.hash.clone()),
                name: Some(row.name.clone()),
                module: None,
                modules: None,
                file: None,
            }
        })
        .collect()
}

fn check_unstable_modules(inputs: &TriageInputs) -> Option<TriageIssue> {
    let mut afferent: HashMap<&str, u32> = HashMap::new();
    let mut efferent: HashMap<&str, u32> = HashMap::new();
    for e in inputs.module_edges {
        *afferent.entry(e.callee_module.as_str()).or_insert(0) += e.edge_count;
        *efferent.entry(e.caller_module.as_str()).or_insert(0) += e.edge_count;
    }

    let unstable: Vec<&str> = afferent
        .keys()
        .copied()
        .filter(|&m| {
            let ca = afferent[m];
            let ce = efferent.get(m).copied().unwrap_or(0);
            ca > 5 && ce as f64 / (ca + ce) as f64 > 0.65
        })
        .collect();

    unstable
        .into_iter()
        .max_by_key(|&m| afferent[m] + efferent.get(m).copied().unwrap_or(0))
        .map(|m| {
            let ca = afferent[m];
            let ce = efferent.get(m).copied().unwrap_or(0);
            let instability = (ce as f64 / (ca + ce) as f64 * 100.0).round() / 100.0;
            TriageIssue {
                issue_type: "unstable_module",
                severity: Severity::Medium,
                title: format!("`{}` is high-traffic and unstable (I={})", m, instability),
                detail: format!(
                    "Called from {} edges in, {} edges out. Instability {} means changes here \
                     ripple widely.",
                    ca, ce, instability
                ),
                action: "Open Module Coupling → review this module's callers. Consider extracting \
                          stable core interfaces from this module."
                    .to_string(),
                hash: None,
                name: None,
                module: Some(m.to_string()),
                modules: None,
                file: None,
            }
        })
}

fn check_cross_module_cycles(inputs: &TriageInputs) -> Option<TriageIssue> {
    if inputs.call_graph_nodes.is_empty() || inputs.call_graph_edges.is_empty() {
        return None;
    }
    let reports = cycles(inputs.call_graph_nodes, inputs.call_graph_edges, None);
    let biggest = reports
        .iter()
        .filter(|c| c.cross_module)
        .max_by_key(|c| c.members.len())?;

    let mut mods = biggest.modules.clone();
    mods.sort();
    let shown: Vec<&String> = mods.iter().take(4).collect();
    let suffix = if mods.len() > 4 { "…" } else { "" };

    let action = match &biggest.break_suggestion {
        Some(bs) => format!(
            "Open Cycles → cut the call `{}` → `{}` (lowest call count in the cycle) to break it.",
            bs.caller_hash, bs.callee_hash
        ),
        None => "Open Cycles view to identify the weakest edge to cut.".to_string(),
    };

    Some(TriageIssue {
        issue_type: "cross_module_cycle",
        severity: Severity::High,
        title: format!("Cross-module cycle across {} modules ({} symbols)", mods.len(), biggest.members.len()),
        detail: format!(
            "Modules involved: {}{}. Circular dependencies prevent clean module extraction.",
            shown.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", "),
            suffix
        ),
        action,
        hash: None,
        name: None,
        module: None,
        modules: Some(mods),
        file: None,
    })
}

fn check_dead_code_concentration(inputs: &TriageInputs) -> Option<TriageIssue> {
    let worst = inputs.dead_file_stats.iter().max_by_key(|r| r.dead)?;
    if worst.dead < 5 {
        return None;
    }
    let pct = (worst.dead as f64 / worst.total as f64 * 100.0).round() as u32;
    let short_name = worst.file_path.rsplit('/').next().unwrap_or(&worst.file_path);
    Some(TriageIssue {
        issue_type: "dead_code_concentration",
        severity: Severity::Low,
        title: format!("{}% of `{}` is unreachable", pct, short_name),
        detail: format!(
            "{} of {} symbols have zero callers. This file may be legacy code.",
            worst.dead, worst.total
        ),
        action: "Open Dead Code → review this file's symbols. Private functions with low complexity \
                  are safest to delete first."
            .to_string(),
        hash: None,
        name: None,
        module: None,
        modules: None,
        file: Some(worst.file_path.clone()),
    })
}

/// Runs the four independent triage checks and returns the top 5 by
/// severity (high, medium, low; stable within a tier).
pub fn triage(inputs: &TriageInputs, config: &LoadBearingConfig) -> TriageReport {
    let mut issues = Vec::new();
    issues.extend(check_unexpected_coupling(inputs, config));
    issues.extend(check_unstable_modules(inputs));
    issues.extend(check_cross_module_cycles(inputs));
    issues.extend(check_dead_code_concentration(inputs));

    issues.sort_by_key(|issue| severity_rank(issue.severity));
    issues.truncate(5);

    TriageReport { issues }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_undeclared_high_centrality_node() {
        let candidates = vec![HighCentralityCandidate {
            hash: "a:1".to_string(),
            name: "dispatch".to_string(),
            module: Some("core".to_string()),
            calling_modules: 9,
        }];
        let inputs = TriageInputs {
            high_centrality_nodes: &candidates,
            module_edges: &[],
            call_graph_nodes: &[],
            call_graph_edges: &[],
            dead_file_stats: &[],
        };
        let config = LoadBearingConfig::default();
        let report = triage(&inputs, &config);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].issue_type, "unexpected_coupling");
        assert_eq!(report.issues[0].severity, Severity::High);
    }

    #[test]
    fn declared_node_is_not_flagged() {
        let candidates = vec![HighCentralityCandidate {
            hash: "a:1".to_string(),
            name: "dispatch".to_string(),
            module: Some("core".to_string()),
            calling_modules: 9,
        }];
        let inputs = TriageInputs {
            high_centrality_nodes: &candidates,
            module_edges: &[],
            call_graph_nodes: &[],
            call_graph_edges: &[],
            dead_file_stats: &[],
        };
        let mut config = LoadBearingConfig::default();
        config.declared_nodes.push("a:1".to_string());
        let report = triage(&inputs, &config);
        assert!(report.issues.is_empty());
    }
}
