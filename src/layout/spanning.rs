use std::collections::{HashMap, HashSet, VecDeque};

use crate::engine::{NodeId, StateSpace};

/// Breadth-first spanning tree over the state space, rooted at the initial state.
#[derive(Debug, Default)]
pub(super) struct SpanningTree {
    pub(super) predecessors: HashMap<NodeId, NodeId>,
    pub(super) children: HashMap<NodeId, Vec<NodeId>>,
    pub(super) pending_in_degree: HashMap<NodeId, usize>,
}

/// Discovers tree edges breadth-first. The first edge reaching a node becomes its
/// canonical edge; self-edges never take part.
pub(super) fn discover(space: &StateSpace, root: &NodeId) -> SpanningTree {
    let mut tree = SpanningTree::default();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();

    seen.insert(root.clone());
    queue.push_back(root.clone());

    while let Some(node_id) = queue.pop_front() {
        let Some(node) = space.node(&node_id) else {
            continue;
        };

        for successor_id in &node.outgoing {
            if *successor_id == node_id || !seen.insert(successor_id.clone()) {
                continue;
            }

            tree.children
                .entry(node_id.clone())
                .or_default()
                .push(successor_id.clone());
            *tree
                .pending_in_degree
                .entry(successor_id.clone())
                .or_default() += 1;
            tree.predecessors
                .insert(successor_id.clone(), node_id.clone());
            queue.push_back(successor_id.clone());
        }
    }

    tree
}

/// Kahn's algorithm over the tree edges only, so it terminates on cyclic graphs and
/// never recurses.
pub(super) fn topological_order(root: &NodeId, tree: &SpanningTree) -> Vec<NodeId> {
    let mut pending = tree.pending_in_degree.clone();
    let mut queue = VecDeque::new();
    let mut sorted = Vec::with_capacity(tree.predecessors.len() + 1);

    queue.push_back(root.clone());
    while let Some(node_id) = queue.pop_front() {
        if let Some(children) = tree.children.get(&node_id) {
            for child_id in children {
                let Some(degree) = pending.get_mut(child_id) else {
                    continue;
                };
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    queue.push_back(child_id.clone());
                }
            }
        }
        sorted.push(node_id);
    }

    sorted
}
