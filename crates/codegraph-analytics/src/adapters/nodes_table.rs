use codegraph_core::Node;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    CallerCount,
    CalleeCount,
    Complexity,
}

impl SortField {
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "name" => Self::Name,
            "caller_count" => Self::CallerCount,
            "callee_count" => Self::CalleeCount,
            "complexity" => Self::Complexity,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodesTablePage {
    pub rows: Vec<Node>,
    pub total: usize,
}

/// Raw, paginated node listing with optional module restriction and a
/// closed-set sort key, mirroring `fetch_nodes`'s `ORDER BY`/`LIMIT`/
/// `OFFSET` query shape rather than a freeform client-supplied sort.
pub fn nodes_table(
    nodes: &[Node],
    module: Option<&str>,
    sort: SortField,
    descending: bool,
    limit: usize,
    offset: usize,
) -> NodesTablePage {
    let mut filtered: Vec<&Node> = nodes
        .iter()
        .filter(|n| !n.is_external())
        .filter(|n| match module {
            Some(m) => n.module.as_deref() == Some(m),
            None => true,
        })
        .collect();

    filtered.sort_by(|a, b| {
        let ord = match sort {
            SortField::Name => a.name.cmp(&b.name),
            SortField::CallerCount => a.caller_count.cmp(&b.caller_count),
            SortField::CalleeCount => a.callee_count.cmp(&b.callee_count),
            SortField::Complexity => a.complexity.cmp(&b.complexity),
        };
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    let total = filtered.len();
    let rows = filtered.into_iter().skip(offset).take(limit).cloned().collect();
    NodesTablePage { rows, total }
}
