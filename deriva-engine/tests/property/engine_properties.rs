//! Property tests for deriva-engine: oracle symmetry, mutilation purity,
//! verifier reflexivity, and termination under tight budgets.

use proptest::prelude::*;

use deriva_core::{Expression, SearchConfig, VariableSet};
use deriva_engine::{CausalGraph, Verdict, Verifier};

const NODES: usize = 8;

fn node(i: usize) -> String {
    format!("n{i}")
}

/// Random DAG: edges only point from lower to higher index, so the graph is
/// acyclic by construction and never rejected.
fn build_forward_dag(edges: &[(usize, usize)]) -> CausalGraph {
    let node_names: Vec<String> = (0..NODES).map(node).collect();
    let node_refs: Vec<&str> = node_names.iter().map(String::as_str).collect();

    let mut edge_names: Vec<(String, String)> = Vec::new();
    for &(a, b) in edges {
        let (lo, hi) = (a.min(b) % NODES, a.max(b) % NODES);
        if lo != hi {
            edge_names.push((node(lo), node(hi)));
        }
    }
    let edge_refs: Vec<(&str, &str)> = edge_names
        .iter()
        .map(|(s, t)| (s.as_str(), t.as_str()))
        .collect();
    CausalGraph::with_nodes(&node_refs, &edge_refs).expect("forward edges cannot form a cycle")
}

fn edge_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..NODES, 0..NODES), 0..NODES * 2)
}

/// Three disjoint index sets over the node pool: (target, given, do).
fn term_indices() -> impl Strategy<Value = Vec<usize>> {
    prop::sample::subsequence((0..NODES).collect::<Vec<_>>(), 1..=5)
}

fn term_from_indices(indices: &[usize]) -> Expression {
    let mut target = VariableSet::new();
    let mut given = VariableSet::new();
    let mut do_set = VariableSet::new();
    for (slot, &i) in indices.iter().enumerate() {
        let var = node(i).into();
        match slot % 3 {
            0 => target.insert(var),
            1 => given.insert(var),
            _ => do_set.insert(var),
        };
    }
    Expression::prob(target, given, do_set).expect("slots are disjoint")
}

// =============================================================================
// d-separation is symmetric in its endpoints
// =============================================================================
proptest! {
    #[test]
    fn d_separation_is_symmetric(
        edges in edge_strategy(),
        a in 0..NODES,
        b in 0..NODES,
        given in prop::sample::subsequence((0..NODES).collect::<Vec<_>>(), 0..=3),
    ) {
        let graph = build_forward_dag(&edges);
        let a_set = VariableSet::singleton(node(a));
        let b_set = VariableSet::singleton(node(b));
        let given: VariableSet = given.into_iter().map(node).collect();

        let forward = graph.d_separated(&a_set, &b_set, &given).expect("known nodes");
        let backward = graph.d_separated(&b_set, &a_set, &given).expect("known nodes");
        prop_assert_eq!(forward, backward);
    }
}

// =============================================================================
// Mutilation never mutates the receiver
// =============================================================================
proptest! {
    #[test]
    fn mutilation_leaves_the_receiver_intact(
        edges in edge_strategy(),
        barred in prop::sample::subsequence((0..NODES).collect::<Vec<_>>(), 1..=3),
    ) {
        let graph = build_forward_dag(&edges);
        let before = graph.edge_count();
        let set: VariableSet = barred.into_iter().map(node).collect();

        let incoming = graph.remove_incoming(&set).expect("known nodes");
        let outgoing = graph.remove_outgoing(&set).expect("known nodes");

        prop_assert_eq!(graph.edge_count(), before);
        prop_assert!(incoming.edge_count() <= before);
        prop_assert!(outgoing.edge_count() <= before);
    }
}

// =============================================================================
// Reflexivity: verify(g, e, e) is always Derivable with an empty trace
// =============================================================================
proptest! {
    #[test]
    fn verify_is_reflexive(
        edges in edge_strategy(),
        indices in term_indices(),
    ) {
        let graph = build_forward_dag(&edges);
        let expr = term_from_indices(&indices);

        let verdict = Verifier::new().verify(&graph, &expr, &expr).expect("valid inputs");
        match verdict {
            Verdict::Derivable { trace } => prop_assert!(trace.is_empty()),
            other => prop_assert!(false, "expected Derivable, got {other:?}"),
        }
    }
}

// =============================================================================
// Termination: every call returns a verdict within a tight budget
// =============================================================================
proptest! {
    #[test]
    fn verify_terminates_within_budget(
        edges in edge_strategy(),
        left in term_indices(),
        right in term_indices(),
    ) {
        let graph = build_forward_dag(&edges);
        let predicted = term_from_indices(&left);
        let target = term_from_indices(&right);

        let verifier = Verifier::with_config(SearchConfig {
            max_depth: 2,
            max_states: 500,
        });
        // Any verdict is fine; the property is that the call returns at all
        // and never errors on valid inputs.
        let verdict = verifier.verify(&graph, &predicted, &target).expect("valid inputs");
        match verdict {
            Verdict::Inconclusive { budget } => {
                prop_assert!(budget.states_expanded > budget.max_states);
            }
            Verdict::Derivable { .. } | Verdict::NotDerivable => {}
        }
    }
}
