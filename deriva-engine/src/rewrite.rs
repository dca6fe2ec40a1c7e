//! Subterm matching and splicing.
//!
//! Rules rewrite the root of whatever term they are handed; this module
//! extends them to whole expressions by enumerating every subterm position,
//! applying each rule there, and splicing the replacement back in. Rewrites
//! that leave the canonical form unchanged are filtered out, so the search
//! frontier never receives degenerate self-loops.

use std::collections::HashSet;

use deriva_core::{canonicalize, DerivaResult, Expression};

use crate::graph::CausalGraph;
use crate::rules::RuleSet;

/// One rewrite of a whole expression: a rule applied at one subterm.
#[derive(Debug, Clone)]
pub struct Rewrite {
    /// Rule that produced this rewrite.
    pub rule: &'static str,
    /// Rule that maps `result` back to the source expression.
    pub inverse: &'static str,
    /// The subterm the rule matched.
    pub site_before: Expression,
    /// The replacement produced at that position.
    pub site_after: Expression,
    /// Canonical form of the full rewritten expression.
    pub result: Expression,
}

fn children(expr: &Expression) -> Vec<&Expression> {
    match expr {
        Expression::Prob(_) => Vec::new(),
        Expression::Sum { body, .. } => vec![body],
        Expression::Product { factors } => factors.iter().collect(),
        Expression::Ratio {
            numerator,
            denominator,
        } => vec![numerator, denominator],
        Expression::Difference { left, right } => vec![left, right],
    }
}

/// Every subterm of `expr` with its position path (child indices from the root).
fn subterms(expr: &Expression) -> Vec<(Vec<usize>, &Expression)> {
    let mut out = Vec::new();
    let mut stack = vec![(Vec::new(), expr)];
    while let Some((path, term)) = stack.pop() {
        for (i, child) in children(term).into_iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(i);
            stack.push((child_path, child));
        }
        out.push((path, term));
    }
    out
}

/// Rebuild `expr` with the subterm at `path` replaced by `replacement`.
/// Paths are produced by `subterms` on the same expression and are always
/// valid; an out-of-range path leaves the expression unchanged.
fn replace_at(expr: &Expression, path: &[usize], replacement: Expression) -> Expression {
    let Some((&head, rest)) = path.split_first() else {
        return replacement;
    };
    match expr {
        Expression::Prob(_) => expr.clone(),
        Expression::Sum { over, body } => Expression::Sum {
            over: over.clone(),
            body: Box::new(replace_at(body, rest, replacement)),
        },
        Expression::Product { factors } => {
            let mut factors = factors.clone();
            if let Some(slot) = factors.get(head) {
                let updated = replace_at(slot, rest, replacement);
                factors[head] = updated;
            }
            Expression::Product { factors }
        }
        Expression::Ratio {
            numerator,
            denominator,
        } => {
            if head == 0 {
                Expression::Ratio {
                    numerator: Box::new(replace_at(numerator, rest, replacement)),
                    denominator: denominator.clone(),
                }
            } else {
                Expression::Ratio {
                    numerator: numerator.clone(),
                    denominator: Box::new(replace_at(denominator, rest, replacement)),
                }
            }
        }
        Expression::Difference { left, right } => {
            if head == 0 {
                Expression::Difference {
                    left: Box::new(replace_at(left, rest, replacement)),
                    right: right.clone(),
                }
            } else {
                Expression::Difference {
                    left: left.clone(),
                    right: Box::new(replace_at(right, rest, replacement)),
                }
            }
        }
    }
}

/// Every distinct one-step rewrite of `expr`: each rule applied at each
/// subterm position, deduplicated by resulting canonical form.
pub fn successors(
    expr: &Expression,
    graph: &CausalGraph,
    rules: &RuleSet,
) -> DerivaResult<Vec<Rewrite>> {
    let current = canonicalize(expr);
    let mut seen: HashSet<Expression> = HashSet::new();
    let mut out = Vec::new();

    for (path, term) in subterms(&current) {
        for rule in rules.iter() {
            for replacement in rule.apply(term, graph)? {
                let result = canonicalize(&replace_at(&current, &path, replacement.clone()));
                if result == current || !seen.insert(result.clone()) {
                    continue;
                }
                out.push(Rewrite {
                    rule: rule.name(),
                    inverse: rule.inverse_name(),
                    site_before: term.clone(),
                    site_after: replacement,
                    result,
                });
            }
        }
    }
    Ok(out)
}
