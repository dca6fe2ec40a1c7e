//! Symbolic probability expressions.
//!
//! The closed variant set {Prob, Sum, Product, Ratio, Difference} is the
//! whole term language: interventional/observational probability terms,
//! marginal sums, algebraic products, Bayes-style ratios, and ATE-style
//! contrasts. Trees are finite, immutable after construction, and validated
//! structurally at construction time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{DerivaError, DerivaResult};
use crate::variable::{Variable, VariableSet};

/// A single probability term `P(target | given, do(do_set))`.
///
/// `given` and `do_set` may be empty; `target` may not. The three sets are
/// pairwise disjoint: a variable is observed, intervened on, or an outcome,
/// never two at once within one term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Prob {
    pub target: VariableSet,
    pub given: VariableSet,
    pub do_set: VariableSet,
}

impl Prob {
    pub fn new(target: VariableSet, given: VariableSet, do_set: VariableSet) -> DerivaResult<Self> {
        if target.is_empty() {
            return Err(DerivaError::InvalidExpression {
                reason: "probability term with empty target".to_string(),
            });
        }
        if !target.is_disjoint(&given) || !target.is_disjoint(&do_set) || !given.is_disjoint(&do_set)
        {
            return Err(DerivaError::InvalidExpression {
                reason: format!(
                    "target, given, and do sets must be pairwise disjoint in P({target} | {given}, do({do_set}))"
                ),
            });
        }
        Ok(Self {
            target,
            given,
            do_set,
        })
    }

    /// All variables mentioned by the term.
    pub fn variables(&self) -> VariableSet {
        self.target.union(&self.given).union(&self.do_set)
    }
}

impl fmt::Display for Prob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P({}", self.target)?;
        if !self.do_set.is_empty() || !self.given.is_empty() {
            f.write_str(" | ")?;
            if !self.do_set.is_empty() {
                write!(f, "do({})", self.do_set)?;
                if !self.given.is_empty() {
                    f.write_str(", ")?;
                }
            }
            if !self.given.is_empty() {
                write!(f, "{}", self.given)?;
            }
        }
        f.write_str(")")
    }
}

/// A symbolic causal probability expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Expression {
    /// `P(target | given, do(do_set))`.
    Prob(Prob),
    /// Marginal sum over `over`.
    Sum { over: VariableSet, body: Box<Expression> },
    /// Algebraic product. Order is fixed by canonical form, not by meaning.
    Product { factors: Vec<Expression> },
    /// Division, as produced by Bayes inversion.
    Ratio {
        numerator: Box<Expression>,
        denominator: Box<Expression>,
    },
    /// Contrast of two expressions, e.g. an average treatment effect.
    Difference {
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    /// `P(target | given, do(do_set))`.
    pub fn prob(
        target: VariableSet,
        given: VariableSet,
        do_set: VariableSet,
    ) -> DerivaResult<Self> {
        Ok(Self::Prob(Prob::new(target, given, do_set)?))
    }

    /// Unconditional `P(target)`.
    pub fn marginal(target: VariableSet) -> DerivaResult<Self> {
        Self::prob(target, VariableSet::new(), VariableSet::new())
    }

    /// `Σ_{over}[body]`.
    pub fn sum(over: VariableSet, body: Expression) -> DerivaResult<Self> {
        if over.is_empty() {
            return Err(DerivaError::InvalidExpression {
                reason: "sum over an empty variable set".to_string(),
            });
        }
        Ok(Self::Sum {
            over,
            body: Box::new(body),
        })
    }

    /// Product of one or more factors.
    pub fn product(factors: Vec<Expression>) -> DerivaResult<Self> {
        if factors.is_empty() {
            return Err(DerivaError::InvalidExpression {
                reason: "empty product".to_string(),
            });
        }
        Ok(Self::Product { factors })
    }

    pub fn ratio(numerator: Expression, denominator: Expression) -> Self {
        Self::Ratio {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
        }
    }

    pub fn difference(left: Expression, right: Expression) -> Self {
        Self::Difference {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// All variables mentioned anywhere in the tree.
    pub fn variables(&self) -> VariableSet {
        match self {
            Self::Prob(prob) => prob.variables(),
            Self::Sum { over, body } => over.union(&body.variables()),
            Self::Product { factors } => factors
                .iter()
                .fold(VariableSet::new(), |acc, f| acc.union(&f.variables())),
            Self::Ratio {
                numerator,
                denominator,
            } => numerator.variables().union(&denominator.variables()),
            Self::Difference { left, right } => left.variables().union(&right.variables()),
        }
    }

    /// Check that every mentioned variable is in `known`.
    ///
    /// `context` names the expression in the error message, e.g. "predicted
    /// expression".
    pub fn validate(&self, known: &VariableSet, context: &str) -> DerivaResult<()> {
        for var in &self.variables() {
            if !known.contains(var) {
                return Err(DerivaError::UnknownVariable {
                    name: var.name().to_string(),
                    context: context.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn as_prob(&self) -> Option<&Prob> {
        match self {
            Self::Prob(prob) => Some(prob),
            _ => None,
        }
    }
}

impl From<Prob> for Expression {
    fn from(prob: Prob) -> Self {
        Self::Prob(prob)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prob(prob) => write!(f, "{prob}"),
            Self::Sum { over, body } => write!(f, "Σ_{{{over}}}[{body}]"),
            Self::Product { factors } => {
                let mut first = true;
                for factor in factors {
                    if !first {
                        f.write_str(" * ")?;
                    }
                    first = false;
                    match factor {
                        Self::Prob(_) | Self::Sum { .. } => write!(f, "{factor}")?,
                        _ => write!(f, "({factor})")?,
                    }
                }
                Ok(())
            }
            Self::Ratio {
                numerator,
                denominator,
            } => write!(f, "({numerator}) / ({denominator})"),
            Self::Difference { left, right } => write!(f, "{left} - {right}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> VariableSet {
        VariableSet::from_names(names.iter().copied())
    }

    #[test]
    fn rejects_empty_target() {
        let err = Expression::prob(VariableSet::new(), names(&["x"]), VariableSet::new());
        assert!(matches!(
            err,
            Err(DerivaError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn rejects_overlapping_sets() {
        let err = Expression::prob(names(&["y"]), names(&["y"]), VariableSet::new());
        assert!(matches!(err, Err(DerivaError::InvalidExpression { .. })));

        let err = Expression::prob(names(&["y"]), names(&["z"]), names(&["z"]));
        assert!(matches!(err, Err(DerivaError::InvalidExpression { .. })));
    }

    #[test]
    fn rejects_empty_product_and_sum() {
        assert!(Expression::product(Vec::new()).is_err());

        let body = Expression::marginal(names(&["y"])).unwrap();
        assert!(Expression::sum(VariableSet::new(), body).is_err());
    }

    #[test]
    fn display_matches_convention() {
        let p = Expression::prob(names(&["y"]), names(&["z"]), names(&["x"])).unwrap();
        assert_eq!(p.to_string(), "P(y | do(x), z)");

        let marginal = Expression::marginal(names(&["y"])).unwrap();
        assert_eq!(marginal.to_string(), "P(y)");

        let sum = Expression::sum(names(&["z"]), p.clone()).unwrap();
        assert_eq!(sum.to_string(), "Σ_{z}[P(y | do(x), z)]");

        let product = Expression::product(vec![p.clone(), marginal.clone()]).unwrap();
        assert_eq!(product.to_string(), "P(y | do(x), z) * P(y)");

        let ratio = Expression::ratio(p.clone(), marginal.clone());
        assert_eq!(ratio.to_string(), "(P(y | do(x), z)) / (P(y))");

        let diff = Expression::difference(p, marginal);
        assert_eq!(diff.to_string(), "P(y | do(x), z) - P(y)");
    }

    #[test]
    fn validate_reports_unknown_variable() {
        let expr = Expression::prob(names(&["y"]), names(&["w"]), names(&["x"])).unwrap();
        let known = names(&["x", "y"]);
        let err = expr.validate(&known, "predicted expression");
        assert_eq!(
            err,
            Err(DerivaError::UnknownVariable {
                name: "w".to_string(),
                context: "predicted expression".to_string(),
            })
        );
    }
}
