//! Canonical forms.
//!
//! Two expressions are interchangeable inputs to the search only if they are
//! structurally identical after canonicalization. Variable sets are already
//! ordered by construction; this pass flattens nested products and nested
//! sums, collapses single-factor products, and fixes factor order by the
//! structural total order on `Expression`.

use crate::expression::Expression;

/// Rewrite `expr` into canonical form. Idempotent.
pub fn canonicalize(expr: &Expression) -> Expression {
    match expr {
        Expression::Prob(prob) => Expression::Prob(prob.clone()),
        Expression::Sum { over, body } => match canonicalize(body) {
            // Σ_a Σ_b e  ==  Σ_{a ∪ b} e
            Expression::Sum {
                over: inner,
                body: inner_body,
            } => Expression::Sum {
                over: over.union(&inner),
                body: inner_body,
            },
            other => Expression::Sum {
                over: over.clone(),
                body: Box::new(other),
            },
        },
        Expression::Product { factors } => {
            let mut flat = Vec::with_capacity(factors.len());
            for factor in factors {
                match canonicalize(factor) {
                    Expression::Product { factors: inner } => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            flat.sort();
            if flat.len() == 1 {
                flat.remove(0)
            } else {
                Expression::Product { factors: flat }
            }
        }
        Expression::Ratio {
            numerator,
            denominator,
        } => Expression::Ratio {
            numerator: Box::new(canonicalize(numerator)),
            denominator: Box::new(canonicalize(denominator)),
        },
        Expression::Difference { left, right } => Expression::Difference {
            left: Box::new(canonicalize(left)),
            right: Box::new(canonicalize(right)),
        },
    }
}

/// Structural equality up to canonical form.
pub fn canonical_eq(a: &Expression, b: &Expression) -> bool {
    canonicalize(a) == canonicalize(b)
}
