use super::digraph::DiGraph;

/// Strongly connected components of `g`, each a list of node indices.
/// Iterative Tarjan so depth-first recursion never overflows the stack on
/// large call graphs. Order of SCCs is reverse-topological (Tarjan's
/// natural output order); callers that need a stable ascending SCC id
/// should assign ids by first-discovery order, which this does.
pub fn tarjan_scc(g: &DiGraph) -> Vec<Vec<usize>> {
    let n = g.len();
    let mut index = vec![None; n];
    let mut lowlink = vec![0u32; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut next_index = 0u32;
    let mut sccs = Vec::new();

    // work_stack holds (node, next child offset to examine)
    let mut work_stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..n {
        if index[start].is_some() {
            continue;
        }
        work_stack.push((start, 0));
        while let Some(&(v, child_i)) = work_stack.last() {
            if index[v].is_none() {
                index[v] = Some(next_index);
                lowlink[v] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v] = true;
            }

            let successors = g.successors(v);
            if child_i < successors.len() {
                let (w, _) = successors[child_i];
                work_stack.last_mut().unwrap().1 += 1;
                if index[w].is_none() {
                    work_stack.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w].unwrap());
                }
            } else {
                work_stack.pop();
                if let Some(&(parent, _)) = work_stack.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v] == index[v].unwrap() {
                    let mut component = Vec::new();
                    loop {
                        let w = stack.pop().unwrap();
                        on_stack[w] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    sccs.push(component);
                }
            }
        }
    }

    sccs
}
