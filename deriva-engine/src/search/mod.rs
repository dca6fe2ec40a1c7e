//! Bidirectional breadth-first derivability search.
//!
//! One frontier expands from the start expression, a second from the goal;
//! both use the same rule catalog, since every equality is present in both
//! directions. The search stops the moment the frontiers share a canonical
//! form and stitches the two half-paths into one forward derivation. Both
//! the per-side depth bound and the global state budget are correctness
//! requirements: the rewrite closure is not known to be finite.
//!
//! Visited sets live and die with one `run` call. No state crosses calls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use deriva_core::{canonicalize, DerivaResult, Expression, SearchConfig};

use crate::graph::CausalGraph;
use crate::rewrite::successors;
use crate::rules::RuleSet;

/// One step of a derivation trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationStep {
    /// Name of the rule applied.
    pub rule: String,
    /// The subterm at the rewrite site.
    pub matched: Expression,
    /// The whole expression after the step, in canonical form.
    pub result: Expression,
}

/// Budget state at the moment a search gave up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub max_depth: usize,
    pub max_states: usize,
    pub states_expanded: usize,
}

/// Raw outcome of one bidirectional search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// A chain of rewrites maps the start into the goal's canonical form.
    Found { trace: Vec<DerivationStep> },
    /// The depth-bounded reachable space was fully explored without a meet.
    Exhausted,
    /// The state budget tripped before exploration finished.
    BudgetExceeded(BudgetReport),
}

/// How a visited state was reached. `None` marks a search root.
struct Edge {
    /// Predecessor on the forward side; continuation toward the goal on the
    /// backward side.
    other: Expression,
    rule: String,
    matched: Expression,
}

type Visited = HashMap<Expression, Option<Edge>>;

/// A single derivability search over one graph and rule catalog.
pub struct SearchEngine<'a> {
    graph: &'a CausalGraph,
    rules: &'a RuleSet,
    config: SearchConfig,
}

impl<'a> SearchEngine<'a> {
    pub fn new(graph: &'a CausalGraph, rules: &'a RuleSet, config: SearchConfig) -> Self {
        Self {
            graph,
            rules,
            config,
        }
    }

    /// Search for a rewrite chain from `start` to `goal`.
    pub fn run(&self, start: &Expression, goal: &Expression) -> DerivaResult<SearchOutcome> {
        let start = canonicalize(start);
        let goal = canonicalize(goal);
        if start == goal {
            return Ok(SearchOutcome::Found { trace: Vec::new() });
        }

        let mut forward: Visited = HashMap::from([(start.clone(), None)]);
        let mut backward: Visited = HashMap::from([(goal.clone(), None)]);
        let mut forward_frontier = vec![start];
        let mut backward_frontier = vec![goal];
        let mut forward_depth = 0usize;
        let mut backward_depth = 0usize;
        let mut expanded = 0usize;

        loop {
            let can_forward =
                !forward_frontier.is_empty() && forward_depth < self.config.max_depth;
            let can_backward =
                !backward_frontier.is_empty() && backward_depth < self.config.max_depth;
            if !can_forward && !can_backward {
                debug!(
                    forward_depth,
                    backward_depth, expanded, "search space exhausted without a meet"
                );
                return Ok(SearchOutcome::Exhausted);
            }

            // Expand the cheaper side first to keep the frontiers balanced.
            let expand_forward = can_forward
                && (!can_backward || forward_frontier.len() <= backward_frontier.len());

            let frontier = if expand_forward {
                std::mem::take(&mut forward_frontier)
            } else {
                std::mem::take(&mut backward_frontier)
            };
            let mut next = Vec::new();

            for state in frontier {
                expanded += 1;
                if expanded > self.config.max_states {
                    debug!(expanded, "state budget exceeded");
                    return Ok(SearchOutcome::BudgetExceeded(BudgetReport {
                        max_depth: self.config.max_depth,
                        max_states: self.config.max_states,
                        states_expanded: expanded,
                    }));
                }

                for rewrite in successors(&state, self.graph, self.rules)? {
                    let (this_side, other_side) = if expand_forward {
                        (&mut forward, &backward)
                    } else {
                        (&mut backward, &forward)
                    };
                    if this_side.contains_key(&rewrite.result) {
                        continue;
                    }
                    let edge = if expand_forward {
                        Edge {
                            other: state.clone(),
                            rule: rewrite.rule.to_string(),
                            matched: rewrite.site_before.clone(),
                        }
                    } else {
                        // Stored pre-inverted: walking the backward chain in
                        // the forward direction applies the inverse rule to
                        // the subterm this rewrite produced.
                        Edge {
                            other: state.clone(),
                            rule: rewrite.inverse.to_string(),
                            matched: rewrite.site_after.clone(),
                        }
                    };
                    this_side.insert(rewrite.result.clone(), Some(edge));

                    if other_side.contains_key(&rewrite.result) {
                        let trace = stitch(&forward, &backward, &rewrite.result);
                        debug!(steps = trace.len(), expanded, "frontiers met");
                        return Ok(SearchOutcome::Found { trace });
                    }
                    next.push(rewrite.result);
                }
            }

            if expand_forward {
                forward_frontier = next;
                forward_depth += 1;
            } else {
                backward_frontier = next;
                backward_depth += 1;
            }
        }
    }

    /// Every canonical form reachable from `start` within `max_depth`
    /// rewrites, tagged with the rule that first produced it. The start maps
    /// to `"initial"`. Stops early if the state budget runs out.
    pub fn explore(
        &self,
        start: &Expression,
        max_depth: usize,
    ) -> DerivaResult<HashMap<Expression, String>> {
        let start = canonicalize(start);
        let mut reached = HashMap::from([(start.clone(), "initial".to_string())]);
        let mut frontier = vec![start];
        let mut expanded = 0usize;

        for _ in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for state in frontier {
                expanded += 1;
                if expanded > self.config.max_states {
                    debug!(expanded, "exploration stopped at the state budget");
                    return Ok(reached);
                }
                for rewrite in successors(&state, self.graph, self.rules)? {
                    if !reached.contains_key(&rewrite.result) {
                        reached.insert(rewrite.result.clone(), rewrite.rule.to_string());
                        next.push(rewrite.result);
                    }
                }
            }
            frontier = next;
        }
        debug!(reached = reached.len(), expanded, "exploration finished");
        Ok(reached)
    }
}

/// Join the forward half-path (start → meet) with the pre-inverted backward
/// half-path (meet → goal) into one forward trace.
fn stitch(forward: &Visited, backward: &Visited, meet: &Expression) -> Vec<DerivationStep> {
    let mut steps = Vec::new();

    let mut cursor = meet.clone();
    while let Some(Some(edge)) = forward.get(&cursor) {
        steps.push(DerivationStep {
            rule: edge.rule.clone(),
            matched: edge.matched.clone(),
            result: cursor.clone(),
        });
        cursor = edge.other.clone();
    }
    steps.reverse();

    let mut cursor = meet.clone();
    while let Some(Some(edge)) = backward.get(&cursor) {
        steps.push(DerivationStep {
            rule: edge.rule.clone(),
            matched: edge.matched.clone(),
            result: edge.other.clone(),
        });
        cursor = edge.other.clone();
    }
    steps
}
