//! Strongly connected components (Tarjan's algorithm).
//!
//! The implementation is iterative, so deep verifier graphs do not overflow the
//! call stack. Components are returned in reverse topological order (sinks
//! first); every node belongs to exactly one component, singletons included.

/// Compute the strongly connected components of a graph with nodes `0..num_nodes`.
pub fn tarjan<F, I>(num_nodes: usize, successors: F) -> Vec<Vec<usize>>
where
    F: Fn(usize) -> I,
    I: IntoIterator<Item = usize>,
{
    const UNVISITED: usize = usize::MAX;

    let mut index = vec![UNVISITED; num_nodes];
    let mut lowlink = vec![0; num_nodes];
    let mut on_stack = vec![false; num_nodes];
    let mut stack = Vec::new();
    let mut components = Vec::new();
    let mut next_index = 0;

    // Frames of the simulated recursion: (node, successors, next successor position).
    let mut frames: Vec<(usize, Vec<usize>, usize)> = Vec::new();

    for root in 0..num_nodes {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, successors(root).into_iter().collect(), 0));

        while let Some((v, succ, pos)) = frames.last_mut() {
            let v = *v;
            if *pos < succ.len() {
                let w = succ[*pos];
                *pos += 1;
                assert!(w < num_nodes, "Successor {} is out of range", w);
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    frames.push((w, successors(w).into_iter().collect(), 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            // All successors of `v` are done.
            frames.pop();
            if let Some((parent, _, _)) = frames.last() {
                lowlink[*parent] = lowlink[*parent].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components
}
