//! d-separation via the moralized ancestral subgraph.
//!
//! `A ⫫ B | C` holds iff, in the moral graph of the ancestral closure of
//! A ∪ B ∪ C (skeleton plus edges between co-parents), deleting C leaves no
//! undirected path from A to B. Equivalent to path-blocking with collider
//! logic; an incorrect oracle silently permits unsound rewrites, so this
//! module is tested against known examples on its own.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;

use deriva_core::{DerivaResult, VariableSet};

use super::CausalGraph;

const CONTEXT: &str = "d-separation query";

pub fn d_separated(
    causal: &CausalGraph,
    a: &VariableSet,
    b: &VariableSet,
    given: &VariableSet,
) -> DerivaResult<bool> {
    // Validate every mentioned variable up front.
    for var in a.iter().chain(b.iter()).chain(given.iter()) {
        causal.node(var, CONTEXT)?;
    }

    // Conditioned endpoints are deleted below; anything left shared between
    // the two sides is trivially connected to itself.
    let a_open = a.difference(given);
    let b_open = b.difference(given);
    if a_open.is_empty() || b_open.is_empty() {
        return Ok(true);
    }
    if !a_open.is_disjoint(&b_open) {
        return Ok(false);
    }

    let interest = a.union(b).union(given);
    let ancestral = causal.reach_indices(&interest, Direction::Incoming, CONTEXT)?;

    let mut conditioned = HashSet::new();
    for var in given {
        conditioned.insert(causal.node(var, CONTEXT)?);
    }

    // Moral graph over the ancestral closure, with conditioned nodes deleted.
    let mut moral: UnGraph<(), ()> = UnGraph::default();
    let mut moral_index: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    for &idx in &ancestral {
        if !conditioned.contains(&idx) {
            moral_index.insert(idx, moral.add_node(()));
        }
    }

    // Skeleton edges between surviving ancestral nodes.
    for edge in causal.graph().edge_references() {
        if let (Some(&source), Some(&target)) = (
            moral_index.get(&edge.source()),
            moral_index.get(&edge.target()),
        ) {
            moral.update_edge(source, target, ());
        }
    }

    // Co-parent edges: parents of a common child in the ancestral closure are
    // married even when the child itself is conditioned away.
    for &child in &ancestral {
        let parents: Vec<NodeIndex> = causal
            .graph()
            .neighbors_directed(child, Direction::Incoming)
            .filter(|parent| ancestral.contains(parent))
            .collect();
        for (i, &left) in parents.iter().enumerate() {
            for &right in &parents[i + 1..] {
                if let (Some(&u), Some(&v)) = (moral_index.get(&left), moral_index.get(&right)) {
                    moral.update_edge(u, v, ());
                }
            }
        }
    }

    // Undirected reachability from the A side to the B side.
    let mut b_indices = HashSet::new();
    for var in &b_open {
        if let Some(&idx) = moral_index.get(&causal.node(var, CONTEXT)?) {
            b_indices.insert(idx);
        }
    }
    for var in &a_open {
        let Some(&start) = moral_index.get(&causal.node(var, CONTEXT)?) else {
            continue;
        };
        let mut bfs = Bfs::new(&moral, start);
        while let Some(node) = bfs.next(&moral) {
            if b_indices.contains(&node) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
