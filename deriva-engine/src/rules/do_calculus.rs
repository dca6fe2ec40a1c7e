//! Do-calculus Rules 1–3, each direction its own rule.
//!
//! Every side-condition is a d-separation query against the correctly
//! mutilated graph for that rule, never the original graph:
//!
//! - Rule 1: `P(y | do(x), z, w) = P(y | do(x), w)` iff `y ⫫ z | x, w` in
//!   G with edges into x deleted.
//! - Rule 2: `P(y | do(x), do(z), w) = P(y | do(x), z, w)` iff
//!   `y ⫫ z | x, w` in G with edges into x and out of z deleted.
//! - Rule 3: `P(y | do(x), do(z), w) = P(y | do(x), w)` iff `y ⫫ z | x, w`
//!   in G with edges into x deleted, and edges into z also deleted when z is
//!   not an ancestor of w in that graph.

use deriva_core::{DerivaResult, Expression, Prob, Variable, VariableSet};

use crate::graph::CausalGraph;

use super::RewriteRule;

fn single(var: &Variable) -> VariableSet {
    VariableSet::singleton(var.clone())
}

/// Variables of the graph that the term does not mention; candidates for the
/// insertion directions.
fn absent_variables(graph: &CausalGraph, prob: &Prob) -> VariableSet {
    graph.variables().difference(&prob.variables())
}

/// Rule 1, deletion direction: drop one observed variable.
pub struct DeleteObservation;

impl RewriteRule for DeleteObservation {
    fn name(&self) -> &'static str {
        "delete_observation"
    }

    fn inverse_name(&self) -> &'static str {
        "insert_observation"
    }

    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };
        if prob.given.is_empty() {
            return Ok(Vec::new());
        }

        let barred = graph.remove_incoming(&prob.do_set)?;
        let mut out = Vec::new();
        for z in &prob.given {
            let rest = prob.given.without(z);
            let condition = prob.do_set.union(&rest);
            if barred.d_separated(&prob.target, &single(z), &condition)? {
                out.push(Expression::prob(
                    prob.target.clone(),
                    rest,
                    prob.do_set.clone(),
                )?);
            }
        }
        Ok(out)
    }
}

/// Rule 1, insertion direction: observe one additional graph variable.
pub struct InsertObservation;

impl RewriteRule for InsertObservation {
    fn name(&self) -> &'static str {
        "insert_observation"
    }

    fn inverse_name(&self) -> &'static str {
        "delete_observation"
    }

    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };

        let barred = graph.remove_incoming(&prob.do_set)?;
        let mut out = Vec::new();
        for z in &absent_variables(graph, prob) {
            let condition = prob.do_set.union(&prob.given);
            if barred.d_separated(&prob.target, &single(z), &condition)? {
                out.push(Expression::prob(
                    prob.target.clone(),
                    prob.given.with(z.clone()),
                    prob.do_set.clone(),
                )?);
            }
        }
        Ok(out)
    }
}

/// Rule 2: trade one intervention for an observation.
pub struct ActionToObservation;

impl RewriteRule for ActionToObservation {
    fn name(&self) -> &'static str {
        "action_to_observation"
    }

    fn inverse_name(&self) -> &'static str {
        "observation_to_action"
    }

    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for z in &prob.do_set {
            let kept = prob.do_set.without(z);
            let view = graph.remove_incoming(&kept)?.remove_outgoing(&single(z))?;
            let condition = kept.union(&prob.given);
            if view.d_separated(&prob.target, &single(z), &condition)? {
                out.push(Expression::prob(
                    prob.target.clone(),
                    prob.given.with(z.clone()),
                    kept,
                )?);
            }
        }
        Ok(out)
    }
}

/// Rule 2, reverse direction: trade one observation for an intervention.
pub struct ObservationToAction;

impl RewriteRule for ObservationToAction {
    fn name(&self) -> &'static str {
        "observation_to_action"
    }

    fn inverse_name(&self) -> &'static str {
        "action_to_observation"
    }

    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };
        if prob.given.is_empty() {
            return Ok(Vec::new());
        }

        let barred = graph.remove_incoming(&prob.do_set)?;
        let mut out = Vec::new();
        for z in &prob.given {
            let view = barred.remove_outgoing(&single(z))?;
            let condition = prob.do_set.union(&prob.given.without(z));
            if view.d_separated(&prob.target, &single(z), &condition)? {
                out.push(Expression::prob(
                    prob.target.clone(),
                    prob.given.without(z),
                    prob.do_set.with(z.clone()),
                )?);
            }
        }
        Ok(out)
    }
}

/// Rule 3 mutilation: bar the kept interventions, then bar `z` as well
/// unless `z` is an ancestor of the observed set in that graph.
fn rule3_view(
    graph: &CausalGraph,
    kept: &VariableSet,
    z: &Variable,
    observed: &VariableSet,
) -> DerivaResult<CausalGraph> {
    let barred = graph.remove_incoming(kept)?;
    if barred.ancestors(observed)?.contains(z) {
        Ok(barred)
    } else {
        barred.remove_incoming(&single(z))
    }
}

/// Rule 3, deletion direction: drop one intervention.
pub struct DeleteAction;

impl RewriteRule for DeleteAction {
    fn name(&self) -> &'static str {
        "delete_action"
    }

    fn inverse_name(&self) -> &'static str {
        "insert_action"
    }

    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for z in &prob.do_set {
            let kept = prob.do_set.without(z);
            let view = rule3_view(graph, &kept, z, &prob.given)?;
            let condition = kept.union(&prob.given);
            if view.d_separated(&prob.target, &single(z), &condition)? {
                out.push(Expression::prob(prob.target.clone(), prob.given.clone(), kept)?);
            }
        }
        Ok(out)
    }
}

/// Rule 3, insertion direction: intervene on one additional graph variable.
pub struct InsertAction;

impl RewriteRule for InsertAction {
    fn name(&self) -> &'static str {
        "insert_action"
    }

    fn inverse_name(&self) -> &'static str {
        "delete_action"
    }

    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for z in &absent_variables(graph, prob) {
            let view = rule3_view(graph, &prob.do_set, z, &prob.given)?;
            let condition = prob.do_set.union(&prob.given);
            if view.d_separated(&prob.target, &single(z), &condition)? {
                out.push(Expression::prob(
                    prob.target.clone(),
                    prob.given.clone(),
                    prob.do_set.with(z.clone()),
                )?);
            }
        }
        Ok(out)
    }
}
