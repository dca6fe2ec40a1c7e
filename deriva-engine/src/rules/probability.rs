//! Probability identities: chain rule, Bayes inversion, marginalization.
//!
//! Each identity holds the do-set fixed and threads it through every term it
//! produces: `P(· | do(x))` is itself a probability distribution, so the
//! identities apply verbatim under any fixed intervention. Commutativity and
//! associativity of products and sums are handled by the canonicalizer, not
//! here.

use deriva_core::{DerivaResult, Expression, Prob, VariableSet};

use crate::graph::CausalGraph;

use super::RewriteRule;

/// Chain rule, factorizing direction:
/// `P(a, b | w) = P(a | b, w) * P(b | w)`, one factorization per choice of b.
pub struct ChainFactorize;

impl RewriteRule for ChainFactorize {
    fn name(&self) -> &'static str {
        "chain_factorize"
    }

    fn inverse_name(&self) -> &'static str {
        "chain_combine"
    }

    fn apply(&self, expr: &Expression, _graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };
        if prob.target.len() < 2 {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for b in &prob.target {
            let rest = prob.target.without(b);
            let head = Expression::prob(
                rest,
                prob.given.with(b.clone()),
                prob.do_set.clone(),
            )?;
            let tail = Expression::prob(
                VariableSet::singleton(b.clone()),
                prob.given.clone(),
                prob.do_set.clone(),
            )?;
            out.push(Expression::product(vec![head, tail])?);
        }
        Ok(out)
    }
}

/// Chain rule, combining direction: merge a matching pair of product factors
/// back into one joint term.
pub struct ChainCombine;

impl RewriteRule for ChainCombine {
    fn name(&self) -> &'static str {
        "chain_combine"
    }

    fn inverse_name(&self) -> &'static str {
        "chain_factorize"
    }

    fn apply(&self, expr: &Expression, _graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Expression::Product { factors } = expr else {
            return Ok(Vec::new());
        };
        if factors.len() < 2 {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for (i, head) in factors.iter().enumerate() {
            let Some(head) = head.as_prob() else {
                continue;
            };
            for (j, tail) in factors.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(tail) = tail.as_prob() else {
                    continue;
                };
                // head = P(a | b, w), tail = P(b | w): merge to P(a, b | w).
                if head.do_set != tail.do_set
                    || !tail.target.is_subset(&head.given)
                    || head.given.difference(&tail.target) != tail.given
                {
                    continue;
                }
                let merged = Expression::prob(
                    head.target.union(&tail.target),
                    tail.given.clone(),
                    head.do_set.clone(),
                )?;
                let mut remaining: Vec<Expression> = factors
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != i && *k != j)
                    .map(|(_, factor)| factor.clone())
                    .collect();
                remaining.push(merged);
                out.push(Expression::product(remaining)?);
            }
        }
        Ok(out)
    }
}

/// Bayes inversion, expanding direction:
/// `P(a | b, w) = P(b | a, w) * P(a | w) / P(b | w)`, one per observed b.
pub struct BayesExpand;

impl RewriteRule for BayesExpand {
    fn name(&self) -> &'static str {
        "bayes_expand"
    }

    fn inverse_name(&self) -> &'static str {
        "bayes_collapse"
    }

    fn apply(&self, expr: &Expression, _graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };
        if prob.given.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for b in &prob.given {
            let rest = prob.given.without(b);
            let likelihood = Expression::prob(
                VariableSet::singleton(b.clone()),
                prob.target.union(&rest),
                prob.do_set.clone(),
            )?;
            let prior = Expression::prob(prob.target.clone(), rest.clone(), prob.do_set.clone())?;
            let evidence = Expression::prob(
                VariableSet::singleton(b.clone()),
                rest,
                prob.do_set.clone(),
            )?;
            out.push(Expression::ratio(
                Expression::product(vec![likelihood, prior])?,
                evidence,
            ));
        }
        Ok(out)
    }
}

/// Bayes inversion, collapsing direction: fold a likelihood–prior ratio back
/// into a single conditional term.
pub struct BayesCollapse;

impl RewriteRule for BayesCollapse {
    fn name(&self) -> &'static str {
        "bayes_collapse"
    }

    fn inverse_name(&self) -> &'static str {
        "bayes_expand"
    }

    fn apply(&self, expr: &Expression, _graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Expression::Ratio {
            numerator,
            denominator,
        } = expr
        else {
            return Ok(Vec::new());
        };
        let Some(evidence) = denominator.as_prob() else {
            return Ok(Vec::new());
        };
        if evidence.target.len() != 1 {
            return Ok(Vec::new());
        }
        let Expression::Product { factors } = numerator.as_ref() else {
            return Ok(Vec::new());
        };
        if factors.len() != 2 {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for (likelihood, prior) in [(&factors[0], &factors[1]), (&factors[1], &factors[0])] {
            let (Some(likelihood), Some(prior)) = (likelihood.as_prob(), prior.as_prob()) else {
                continue;
            };
            // likelihood = P(b | a, w), prior = P(a | w), evidence = P(b | w).
            if likelihood.target != evidence.target
                || likelihood.do_set != evidence.do_set
                || prior.do_set != evidence.do_set
                || prior.given != evidence.given
                || likelihood.given != prior.target.union(&prior.given)
            {
                continue;
            }
            let b = evidence.target.iter().next().cloned();
            let Some(b) = b else { continue };
            out.push(Expression::prob(
                prior.target.clone(),
                prior.given.with(b),
                prior.do_set.clone(),
            )?);
        }
        Ok(out)
    }
}

/// Marginalization, introducing direction:
/// `P(a | w) = Σ_b P(a, b | w)`, one per graph variable absent from the term.
pub struct MarginalIntroduce;

impl RewriteRule for MarginalIntroduce {
    fn name(&self) -> &'static str {
        "marginal_introduce"
    }

    fn inverse_name(&self) -> &'static str {
        "marginal_eliminate"
    }

    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Some(prob) = expr.as_prob() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for b in &graph.variables().difference(&prob.variables()) {
            let joint = Expression::prob(
                prob.target.with(b.clone()),
                prob.given.clone(),
                prob.do_set.clone(),
            )?;
            out.push(Expression::sum(VariableSet::singleton(b.clone()), joint)?);
        }
        Ok(out)
    }
}

/// Marginalization, eliminating direction: sum one summed variable out of a
/// joint term.
pub struct MarginalEliminate;

impl RewriteRule for MarginalEliminate {
    fn name(&self) -> &'static str {
        "marginal_eliminate"
    }

    fn inverse_name(&self) -> &'static str {
        "marginal_introduce"
    }

    fn apply(&self, expr: &Expression, _graph: &CausalGraph) -> DerivaResult<Vec<Expression>> {
        let Expression::Sum { over, body } = expr else {
            return Ok(Vec::new());
        };
        let Some(prob) = body.as_prob() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for b in &over.intersection(&prob.target) {
            let target = prob.target.without(b);
            if target.is_empty() {
                continue;
            }
            let reduced = Expression::prob(target, prob.given.clone(), prob.do_set.clone())?;
            let remaining = over.without(b);
            if remaining.is_empty() {
                out.push(reduced);
            } else {
                out.push(Expression::sum(remaining, reduced)?);
            }
        }
        Ok(out)
    }
}
