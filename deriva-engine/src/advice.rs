//! Conditioning diagnostics for a single probability term.
//!
//! Complements the verifier: rather than proving equivalence, this flags
//! conditioning choices that the graph structure argues against (redundant
//! conditioning sets, mediator conditioning, observed direct causes,
//! d-connected covariates).

use serde::{Deserialize, Serialize};

use deriva_core::{DerivaResult, Prob, Variable, VariableSet};

use crate::graph::CausalGraph;

/// Category of a conditioning diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    /// Every observed variable is d-separated from the target under the
    /// intervention; the whole conditioning set can be dropped.
    RedundantConditioning,
    /// Conditioning on a mediator of an observed cause risks post-treatment
    /// bias.
    MediatorConditioning,
    /// A direct cause of the target is merely observed; an intervention may
    /// have been intended.
    ObservedCause,
    /// The target is d-connected to this observed variable given the rest;
    /// conditioning on it can bias the estimate.
    BiasedConditioning,
}

/// One diagnostic about a probability term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub kind: AdviceKind,
    /// The observed variable the advice concerns; absent for set-wide advice.
    pub subject: Option<Variable>,
    pub message: String,
}

/// Diagnose the conditioning set of `term` against `graph`.
pub fn conditioning_advice(graph: &CausalGraph, term: &Prob) -> DerivaResult<Vec<Advice>> {
    let intervened = graph.remove_incoming(&term.do_set)?;
    let mut advice = Vec::new();

    // Set-wide redundancy first: if every observed variable is separated from
    // the target given the rest, recommend dropping the whole set.
    let mut all_separated = !term.given.is_empty();
    for z in &term.given {
        if !separated_given_rest(&intervened, term, z)? {
            all_separated = false;
            break;
        }
    }
    if all_separated {
        advice.push(Advice {
            kind: AdviceKind::RedundantConditioning,
            subject: None,
            message: format!(
                "every observed variable is d-separated from {} under the intervention; \
                 P({}) needs no conditioning",
                term.target, term.target
            ),
        });
        return Ok(advice);
    }

    for z in &term.given {
        let causes_target = term.target.iter().any(|y| graph.has_edge(z, y));
        if causes_target {
            let mut mediated = false;
            for x in &term.given {
                if x == z {
                    continue;
                }
                if graph
                    .descendants(&VariableSet::singleton(x.clone()))?
                    .contains(z)
                {
                    mediated = true;
                    break;
                }
            }
            if mediated {
                advice.push(Advice {
                    kind: AdviceKind::MediatorConditioning,
                    subject: Some(z.clone()),
                    message: format!(
                        "{z} mediates between an observed cause and {}; conditioning on it \
                         risks post-treatment bias",
                        term.target
                    ),
                });
            } else {
                advice.push(Advice {
                    kind: AdviceKind::ObservedCause,
                    subject: Some(z.clone()),
                    message: format!(
                        "{z} directly causes {} but is only observed; do({z}) may have been \
                         intended",
                        term.target
                    ),
                });
            }
        }

        if !separated_given_rest(&intervened, term, z)? {
            advice.push(Advice {
                kind: AdviceKind::BiasedConditioning,
                subject: Some(z.clone()),
                message: format!(
                    "{} is d-connected to {z} given the remaining conditions; conditioning \
                     on {z} can bias the estimate",
                    term.target
                ),
            });
        }
    }
    Ok(advice)
}

fn separated_given_rest(
    intervened: &CausalGraph,
    term: &Prob,
    z: &Variable,
) -> DerivaResult<bool> {
    let rest = term.do_set.union(&term.given.without(z));
    intervened.d_separated(&term.target, &VariableSet::singleton(z.clone()), &rest)
}
