use std::collections::{HashMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};

use codegraph_core::{Edge, Node};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PatternInstance {
    pub nodes: Vec<String>,
    pub node_labels: Vec<String>,
    pub description: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternResult {
    pub pattern: &'static str,
    pub display_name: &'static str,
    pub count: usize,
    pub instances: Vec<PatternInstance>,
}

struct NodeInfo {
    name: String,
    module: String,
}

/// Adjacency view built once per run and shared read-only by every
/// detector. External nodes must already be filtered by the caller.
struct PatternGraph {
    nodes: HashMap<String, NodeInfo>,
    out_adj: HashMap<String, Vec<(String, u32)>>,
    in_adj: HashMap<String, Vec<(String, u32)>>,
}

impl PatternGraph {
    fn build(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut info = HashMap::new();
        for n in nodes {
            info.insert(
                n.hash.clone(),
                NodeInfo {
                    name: n.name.clone(),
                    module: n.module_or_external().to_string(),
                },
            );
        }
        let mut out_adj: HashMap<String, Vec<(String, u32)>> = HashMap::new();
        let mut in_adj: HashMap<String, Vec<(String, u32)>> = HashMap::new();
        for e in edges {
            if !info.contains_key(&e.caller_hash) || !info.contains_key(&e.callee_hash) {
                continue;
            }
            out_adj
                .entry(e.caller_hash.clone())
                .or_default()
                .push((e.callee_hash.clone(), e.call_count));
            in_adj
                .entry(e.callee_hash.clone())
                .or_default()
                .push((e.caller_hash.clone(), e.call_count));
        }
        PatternGraph { nodes: info, out_adj, in_adj }
    }

    fn out_deg(&self, h: &str) -> usize {
        self.out_adj.get(h).map(|v| v.len()).unwrap_or(0)
    }

    fn in_deg(&self, h: &str) -> usize {
        self.in_adj.get(h).map(|v| v.len()).unwrap_or(0)
    }

    fn label(&self, h: &str) -> String {
        match self.nodes.get(h) {
            Some(n) => format!("{}.{}", n.module, n.name),
            None => h.to_string(),
        }
    }

    fn name(&self, h: &str) -> &str {
        self.nodes.get(h).map(|n| n.name.as_str()).unwrap_or(h)
    }

    fn module(&self, h: &str) -> &str {
        self.nodes.get(h).map(|n| n.module.as_str()).unwrap_or("")
    }

    fn labels(&self, hashes: &[String]) -> Vec<String> {
        hashes.iter().map(|h| self.label(h)).collect()
    }
}

/// Follows a strictly linear chain (out-degree 1, in-degree 1 at every
/// interior hop) from `start` until it branches, merges, or cycles.
fn bfs_chain(g: &PatternGraph, start: &str) -> Vec<String> {
    let mut chain = vec![start.to_string()];
    let mut seen: HashSet<String> = [start.to_string()].into_iter().collect();
    let mut cur = start.to_string();
    loop {
        let nexts = match g.out_adj.get(&cur) {
            Some(v) if v.len() == 1 => v,
            _ => break,
        };
        let nxt = &nexts[0].0;
        if seen.contains(nxt) {
            break;
        }
        if g.in_deg(nxt) != 1 {
            break;
        }
        chain.push(nxt.clone());
        seen.insert(nxt.clone());
        cur = nxt.clone();
    }
    chain
}

fn iterative_sccs(g: &PatternGraph) -> Vec<Vec<String>> {
    let mut order = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();

    for v in g.nodes.keys() {
        if visited.contains(v) {
            continue;
        }
        let mut stack: Vec<(String, usize)> = vec![(v.clone(), 0)];
        visited.insert(v.clone());
        while let Some((node, mut offset)) = stack.pop() {
            let children = g.out_adj.get(&node).map(|v| v.as_slice()).unwrap_or(&[]);
            let mut pushed_child = None;
            while offset < children.len() {
                let child = &children[offset].0;
                offset += 1;
                if !visited.contains(child) {
                    visited.insert(child.clone());
                    pushed_child = Some(child.clone());
                    break;
                }
            }
            if let Some(child) = pushed_child {
                stack.push((node, offset));
                stack.push((child, 0));
            } else {
                order.push(node);
            }
        }
    }

    let mut rev_adj: HashMap<String, Vec<String>> = HashMap::new();
    for (v, targets) in &g.out_adj {
        for (w, _) in targets {
            if g.nodes.contains_key(w) {
                rev_adj.entry(w.clone()).or_default().push(v.clone());
            }
        }
    }

    let mut visited2: HashSet<String> = HashSet::new();
    let mut sccs = Vec::new();
    for v in order.into_iter().rev() {
        if visited2.contains(&v) {
            continue;
        }
        let mut comp = Vec::new();
        let mut stack = vec![v.clone()];
        visited2.insert(v);
        while let Some(node) = stack.pop() {
            comp.push(node.clone());
            if let Some(preds) = rev_adj.get(&node) {
                for w in preds {
                    if !visited2.contains(w) {
                        visited2.insert(w.clone());
                        stack.push(w.clone());
                    }
                }
            }
        }
        if comp.len() > 1 {
            sccs.push(comp);
        }
    }
    sccs
}

fn clamp_conf(v: f64, ceiling: f64) -> f64 {
    (v.min(ceiling) * 100.0).round() / 100.0
}

fn detect_singleton(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let in_deg = g.in_deg(h);
        let out_deg = g.out_deg(h);
        if in_deg >= 4 && out_deg <= 3 {
            let companion = g
                .out_adj
                .get(h)
                .into_iter()
                .flatten()
                .find(|(t, _)| g.in_deg(t) == 1)
                .map(|(t, _)| t.clone());

            let mut confidence = (0.55 + in_deg as f64 * 0.04).min(0.95);
            let mut desc = format!("{} is called by {} callers (getter pattern)", g.label(h), in_deg);
            let mut nodes = vec![h.clone()];
            if let Some(companion) = &companion {
                desc += &format!("; delegates creation to {}", g.name(companion));
                confidence = (confidence + 0.1).min(0.95);
                nodes.push(companion.clone());
            }
            instances.push(PatternInstance {
                node_labels: g.labels(&nodes),
                nodes,
                description: desc,
                confidence: clamp_conf(confidence, 0.95),
            });
        }
    }
    instances
}

fn detect_factory_method(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let module = g.module(h);
        let same_mod: Vec<String> = g
            .out_adj
            .get(h)
            .into_iter()
            .flatten()
            .filter(|(t, _)| g.nodes.contains_key(t) && g.module(t) == module && g.in_deg(t) <= 2)
            .map(|(t, _)| t.clone())
            .collect();
        if same_mod.len() >= 3 {
            let confidence = clamp_conf(0.50 + same_mod.len() as f64 * 0.06, 0.90);
            let mut nodes = vec![h.clone()];
            nodes.extend(same_mod.iter().take(6).cloned());
            instances.push(PatternInstance {
                description: format!(
                    "{} creates {} product variants in module '{}'",
                    g.label(h),
                    same_mod.len(),
                    module
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_observer(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let out_edges = match g.out_adj.get(h) {
            Some(v) if v.len() >= 5 => v,
            _ => continue,
        };
        let handlers: Vec<String> = out_edges
            .iter()
            .filter(|(t, _)| g.nodes.contains_key(t) && g.in_deg(t) <= 2)
            .map(|(t, _)| t.clone())
            .collect();
        if handlers.len() >= 4 {
            let confidence = clamp_conf(0.55 + handlers.len() as f64 * 0.05, 0.92);
            let mut nodes = vec![h.clone()];
            nodes.extend(handlers.iter().take(8).cloned());
            instances.push(PatternInstance {
                description: format!(
                    "{} fans out to {} handlers (observer/event-bus)",
                    g.label(h),
                    handlers.len()
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_decorator_chain(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut hashes: Vec<&String> = g.nodes.keys().collect();
    hashes.sort();
    for h in hashes {
        if visited.contains(h) {
            continue;
        }
        if g.in_deg(h) >= 2 && g.out_deg(h) == 1 {
            let chain = bfs_chain(g, h);
            if chain.len() >= 4 {
                for c in &chain {
                    visited.insert(c.clone());
                }
                let confidence = clamp_conf(0.45 + chain.len() as f64 * 0.07, 0.88);
                let nodes: Vec<String> = chain.iter().take(8).cloned().collect();
                instances.push(PatternInstance {
                    description: format!(
                        "Decorator chain of {} wrappers: {} → … → {}",
                        chain.len(),
                        g.name(&chain[0]),
                        g.name(chain.last().unwrap())
                    ),
                    node_labels: g.labels(&nodes),
                    nodes,
                    confidence,
                });
            }
        }
    }
    instances
}

fn detect_facade(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let module = g.module(h);
        let mut other_modules: Vec<&str> = g
            .out_adj
            .get(h)
            .into_iter()
            .flatten()
            .filter(|(t, _)| g.nodes.contains_key(t) && g.module(t) != module)
            .map(|(t, _)| g.module(t))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if other_modules.len() >= 3 {
            other_modules.sort();
            let callee_hashes: Vec<String> = g
                .out_adj
                .get(h)
                .into_iter()
                .flatten()
                .filter(|(t, _)| g.nodes.contains_key(t) && g.module(t) != module)
                .map(|(t, _)| t.clone())
                .collect();
            let confidence = clamp_conf(0.50 + other_modules.len() as f64 * 0.08, 0.90);
            let mut nodes = vec![h.clone()];
            nodes.extend(callee_hashes.into_iter().take(8));
            instances.push(PatternInstance {
                description: format!(
                    "{} orchestrates {} modules: {}",
                    g.label(h),
                    other_modules.len(),
                    other_modules.join(", ")
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_composite_recursive(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let self_calls = g.out_adj.get(h).into_iter().flatten().any(|(t, _)| t == h);
        if self_calls {
            let nodes = vec![h.clone()];
            instances.push(PatternInstance {
                description: format!("{} is self-recursive (composite/tree traversal/fold)", g.label(h)),
                node_labels: g.labels(&nodes),
                nodes,
                confidence: 0.85,
            });
        }
    }
    instances
}

fn detect_strategy(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let module = g.module(h);
        let siblings: Vec<String> = g
            .out_adj
            .get(h)
            .into_iter()
            .flatten()
            .filter(|(t, _)| g.nodes.contains_key(t) && g.module(t) == module && g.in_deg(t) <= 2 && t != h)
            .map(|(t, _)| t.clone())
            .collect();
        if (3..=8).contains(&siblings.len()) {
            let confidence = clamp_conf(0.48 + siblings.len() as f64 * 0.07, 0.85);
            let mut nodes = vec![h.clone()];
            nodes.extend(siblings.iter().cloned());
            instances.push(PatternInstance {
                description: format!(
                    "{} dispatches to {} strategy implementations",
                    g.label(h),
                    siblings.len()
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_chain_of_responsibility(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut hashes: Vec<&String> = g.nodes.keys().collect();
    hashes.sort();
    for h in hashes {
        if visited.contains(h) {
            continue;
        }
        if g.in_deg(h) <= 1 && g.out_deg(h) == 1 {
            let chain = bfs_chain(g, h);
            if chain.len() >= 5 {
                for c in &chain {
                    visited.insert(c.clone());
                }
                let confidence = clamp_conf(0.40 + chain.len() as f64 * 0.07, 0.82);
                let nodes: Vec<String> = chain.iter().take(8).cloned().collect();
                instances.push(PatternInstance {
                    description: format!(
                        "Handler chain: {} → … → {} ({} steps)",
                        g.name(&chain[0]),
                        g.name(chain.last().unwrap()),
                        chain.len()
                    ),
                    node_labels: g.labels(&nodes),
                    nodes,
                    confidence,
                });
            }
        }
    }
    instances
}

fn detect_template_method(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let hooks: Vec<String> = g
            .out_adj
            .get(h)
            .into_iter()
            .flatten()
            .filter(|(t, _)| g.nodes.contains_key(t) && g.in_deg(t) <= 2)
            .map(|(t, _)| t.clone())
            .collect();
        if hooks.len() >= 5 {
            let confidence = clamp_conf(0.48 + hooks.len() as f64 * 0.05, 0.87);
            let mut nodes = vec![h.clone()];
            nodes.extend(hooks.iter().take(8).cloned());
            instances.push(PatternInstance {
                description: format!(
                    "{} calls {} hook methods (template method skeleton)",
                    g.label(h),
                    hooks.len()
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_command(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let exclusive: Vec<String> = g
            .out_adj
            .get(h)
            .into_iter()
            .flatten()
            .filter(|(t, _)| g.nodes.contains_key(t) && g.in_deg(t) == 1)
            .map(|(t, _)| t.clone())
            .collect();
        if exclusive.len() >= 5 {
            let confidence = clamp_conf(0.50 + exclusive.len() as f64 * 0.05, 0.88);
            let mut nodes = vec![h.clone()];
            nodes.extend(exclusive.iter().take(8).cloned());
            instances.push(PatternInstance {
                description: format!(
                    "{} exclusively owns {} command handlers",
                    g.label(h),
                    exclusive.len()
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_map_reduce(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let out_edges = match g.out_adj.get(h) {
            Some(v) if v.len() >= 4 => v,
            _ => continue,
        };
        let mappers: Vec<String> = out_edges
            .iter()
            .filter(|(t, _)| g.nodes.contains_key(t))
            .map(|(t, _)| t.clone())
            .collect();
        if mappers.len() < 4 {
            continue;
        }
        let mut downstream_counts: HashMap<String, usize> = HashMap::new();
        for m in &mappers {
            for (t, _) in g.out_adj.get(m).into_iter().flatten() {
                if g.nodes.contains_key(t) && t != h {
                    *downstream_counts.entry(t.clone()).or_insert(0) += 1;
                }
            }
        }
        let mut reducers: Vec<(String, usize)> = downstream_counts.into_iter().filter(|(_, c)| *c >= 3).collect();
        reducers.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        if let Some((reducer_hash, _)) = reducers.into_iter().next() {
            let confidence = clamp_conf(0.50 + mappers.len() as f64 * 0.06, 0.86);
            let mut nodes = vec![h.clone()];
            nodes.extend(mappers.iter().take(6).cloned());
            nodes.push(reducer_hash.clone());
            instances.push(PatternInstance {
                description: format!(
                    "{} fans out to {} mappers → converges at {}",
                    g.label(h),
                    mappers.len(),
                    g.name(&reducer_hash)
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_mediator(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let in_deg = g.in_deg(h);
        let out_deg = g.out_deg(h);
        if in_deg >= 4 && out_deg >= 4 {
            let confidence = clamp_conf(0.45 + (in_deg + out_deg) as f64 * 0.025, 0.90);
            let mut callers: Vec<String> = g
                .in_adj
                .get(h)
                .into_iter()
                .flatten()
                .take(5)
                .filter(|(t, _)| g.nodes.contains_key(t))
                .map(|(t, _)| t.clone())
                .collect();
            callers.truncate(4);
            let mut callees: Vec<String> = g
                .out_adj
                .get(h)
                .into_iter()
                .flatten()
                .take(5)
                .filter(|(t, _)| g.nodes.contains_key(t))
                .map(|(t, _)| t.clone())
                .collect();
            callees.truncate(4);
            let mut nodes = vec![h.clone()];
            nodes.extend(callers);
            nodes.extend(callees);
            instances.push(PatternInstance {
                description: format!("{}: bidirectional hub (in={}, out={})", g.label(h), in_deg, out_deg),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_mutual_recursion(g: &PatternGraph) -> Vec<PatternInstance> {
    let sccs = iterative_sccs(g);
    sccs.into_iter()
        .map(|scc| {
            let names: Vec<&str> = scc.iter().take(4).map(|h| g.name(h)).collect();
            let mut description = format!("Mutual recursion cycle: {}", names.join(" ↔ "));
            if scc.len() > 4 {
                description += &format!(" (+{} more)", scc.len() - 4);
            }
            let confidence = clamp_conf(0.70 + scc.len() as f64 * 0.04, 0.95);
            let nodes: Vec<String> = scc.into_iter().take(8).collect();
            PatternInstance {
                node_labels: g.labels(&nodes),
                nodes,
                description,
                confidence,
            }
        })
        .collect()
}

fn detect_layered_architecture(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut module_callers: HashMap<&str, HashSet<&str>> = HashMap::new();
    for h in g.nodes.keys() {
        let module = g.module(h);
        for (t, _) in g.out_adj.get(h).into_iter().flatten() {
            if g.nodes.contains_key(t) && g.module(t) != module {
                module_callers.entry(module).or_default().insert(g.module(t));
            }
        }
    }
    if module_callers.len() < 3 {
        return Vec::new();
    }

    let mut acyclic_pairs: Vec<(&str, &str)> = Vec::new();
    let mut modules: Vec<&str> = module_callers.keys().copied().collect();
    modules.sort();
    for &a in &modules {
        let mut callees: Vec<&str> = module_callers.get(a).into_iter().flatten().copied().collect();
        callees.sort();
        for b in callees {
            let back = module_callers.get(b).map(|s| s.contains(a)).unwrap_or(false);
            if !back {
                acyclic_pairs.push((a, b));
            }
        }
    }

    if acyclic_pairs.len() < 3 {
        return Vec::new();
    }

    let considered: HashSet<&str> = acyclic_pairs.iter().take(3).flat_map(|&(a, b)| [a, b]).collect();
    let mut layer_nodes: Vec<String> = g
        .nodes
        .keys()
        .filter(|h| considered.contains(g.module(h)))
        .cloned()
        .collect();
    layer_nodes.sort();
    layer_nodes.truncate(12);

    let confidence = clamp_conf(0.50 + acyclic_pairs.len() as f64 * 0.06, 0.85);
    vec![PatternInstance {
        description: format!(
            "Layered architecture: {} strict one-way module dependencies",
            acyclic_pairs.len()
        ),
        node_labels: g.labels(&layer_nodes),
        nodes: layer_nodes,
        confidence,
    }]
}

fn detect_proxy(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    for h in g.nodes.keys() {
        let in_deg = g.in_deg(h);
        if in_deg < 3 {
            continue;
        }
        let module = g.module(h);
        let subject = g
            .out_adj
            .get(h)
            .into_iter()
            .flatten()
            .find(|(t, _)| g.nodes.contains_key(t) && g.in_deg(t) <= 1 && g.module(t) == module)
            .map(|(t, _)| t.clone());
        let Some(subject) = subject else { continue };
        let hooks: Vec<String> = g
            .out_adj
            .get(h)
            .into_iter()
            .flatten()
            .filter(|(t, _)| g.nodes.contains_key(t) && g.in_deg(t) <= 2 && t != &subject)
            .map(|(t, _)| t.clone())
            .collect();
        if hooks.len() >= 2 {
            let confidence = clamp_conf(0.52 + in_deg as f64 * 0.04 + hooks.len() as f64 * 0.03, 0.88);
            let mut nodes = vec![h.clone(), subject.clone()];
            nodes.extend(hooks.iter().take(4).cloned());
            instances.push(PatternInstance {
                description: format!(
                    "{} proxies {} with {} cross-cutting hooks",
                    g.label(h),
                    g.name(&subject),
                    hooks.len()
                ),
                node_labels: g.labels(&nodes),
                nodes,
                confidence,
            });
        }
    }
    instances
}

fn detect_pipeline(g: &PatternGraph) -> Vec<PatternInstance> {
    let mut instances = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut hashes: Vec<&String> = g.nodes.keys().collect();
    hashes.sort();
    for h in hashes {
        if visited.contains(h) {
            continue;
        }
        if g.in_deg(h) >= 1 {
            let chain = bfs_chain(g, h);
            if chain.len() >= 4 {
                for c in &chain {
                    visited.insert(c.clone());
                }
                let confidence = clamp_conf(0.38 + chain.len() as f64 * 0.07, 0.80);
                let nodes: Vec<String> = chain.iter().take(8).cloned().collect();
                instances.push(PatternInstance {
                    description: format!(
                        "Processing pipeline: {} → … → {} ({} stages)",
                        g.name(&chain[0]),
                        g.name(chain.last().unwrap()),
                        chain.len()
                    ),
                    node_labels: g.labels(&nodes),
                    nodes,
                    confidence,
                });
            }
        }
    }
    instances
}

type Detector = fn(&PatternGraph) -> Vec<PatternInstance>;

const DETECTORS: &[(&str, &str, Detector)] = &[
    ("singleton", "Singleton", detect_singleton),
    ("factory_method", "Factory Method", detect_factory_method),
    ("observer", "Observer / Event Bus", detect_observer),
    ("decorator_chain", "Decorator Chain", detect_decorator_chain),
    ("facade", "Façade", detect_facade),
    ("composite_recursive", "Composite / Recursive", detect_composite_recursive),
    ("strategy", "Strategy", detect_strategy),
    ("chain_of_responsibility", "Chain of Responsibility", detect_chain_of_responsibility),
    ("template_method", "Template Method", detect_template_method),
    ("command", "Command / Dispatcher", detect_command),
    ("map_reduce", "Map / Reduce", detect_map_reduce),
    ("mediator", "Mediator", detect_mediator),
    ("mutual_recursion", "Mutual Recursion", detect_mutual_recursion),
    ("layered_architecture", "Layered Architecture", detect_layered_architecture),
    ("proxy", "Proxy", detect_proxy),
    ("pipeline", "Pipeline", detect_pipeline),
];

/// Runs every detector in isolation; a panicking detector yields nothing
/// rather than aborting the run, matching the source's per-detector
/// try/except.
pub fn detect_all_patterns(nodes: &[Node], edges: &[Edge], min_confidence: f64) -> Vec<PatternResult> {
    let graph = PatternGraph::build(nodes, edges);

    let mut results: Vec<PatternResult> = DETECTORS
        .iter()
        .filter_map(|&(key, display_name, detector)| {
            let raw = catch_unwind(AssertUnwindSafe(|| detector(&graph))).unwrap_or_default();
            let instances: Vec<PatternInstance> =
                raw.into_iter().filter(|inst| inst.confidence >= min_confidence).collect();
            if instances.is_empty() {
                None
            } else {
                Some(PatternResult {
                    pattern: key,
                    display_name,
                    count: instances.len(),
                    instances,
                })
            }
        })
        .collect();

    results.sort_by(|a, b| b.count.cmp(&a.count).then(a.pattern.cmp(b.pattern)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Kind, Risk};

    fn node(hash: &str, name: &str, module: &str) -> Node {
        Node {
            hash: hash.to_string(),
            name: name.to_string(),
            module: Some(module.to_string()),
            kind: Kind::Function,
            file_path: "f.py".to_string(),
            line_start: 1,
            line_end: 1,
            complexity: 1,
            caller_count: 0,
            callee_count: 0,
            risk: Risk::Low,
        }
    }

    #[test]
    fn detects_self_recursive_composite() {
        let nodes = vec![node("a", "walk", "tree")];
        let edges = vec![Edge { caller_hash: "a".into(), callee_hash: "a".into(), call_count: 3 }];
        let results = detect_all_patterns(&nodes, &edges, 0.5);
        assert!(results.iter().any(|r| r.pattern == "composite_recursive"));
    }

    #[test]
    fn detects_mutual_recursion_cycle() {
        let nodes = vec![node("a", "even", "m"), node("b", "odd", "m")];
        let edges = vec![
            Edge { caller_hash: "a".into(), callee_hash: "b".into(), call_count: 1 },
            Edge { caller_hash: "b".into(), callee_hash: "a".into(), call_count: 1 },
        ];
        let results = detect_all_patterns(&nodes, &edges, 0.5);
        assert!(results.iter().any(|r| r.pattern == "mutual_recursion"));
    }

    #[test]
    fn empty_graph_yields_no_patterns() {
        let results = detect_all_patterns(&[], &[], 0.5);
        assert!(results.is_empty());
    }
}
