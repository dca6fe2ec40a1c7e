//! The rewrite-rule catalog.
//!
//! Each rule is a value: a shape match over expression variants, a
//! graph-dependent side-condition, and a rewrite producer. Rules are
//! stateless and shared across searches. Every equality is represented by
//! two rules, one per direction, so the same catalog serves the forward and
//! the backward frontier and each rule can name its inverse for trace
//! stitching.

pub mod do_calculus;
pub mod probability;

use deriva_core::{DerivaResult, Expression};

use crate::graph::CausalGraph;

/// One direction of a sound rewrite equality.
pub trait RewriteRule: Send + Sync {
    /// Stable identifier used in derivation traces.
    fn name(&self) -> &'static str;

    /// Identifier of the rule that undoes this one.
    fn inverse_name(&self) -> &'static str;

    /// Every one-step rewrite of `expr` at its root. Expressions that do not
    /// match the rule's shape yield an empty list, not an error.
    fn apply(&self, expr: &Expression, graph: &CausalGraph) -> DerivaResult<Vec<Expression>>;
}

/// Ordered, read-only rule catalog.
pub struct RuleSet {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl RuleSet {
    /// The full catalog: do-calculus Rules 1–3 and the probability
    /// identities, each in both directions.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                Box::new(do_calculus::DeleteObservation),
                Box::new(do_calculus::InsertObservation),
                Box::new(do_calculus::ActionToObservation),
                Box::new(do_calculus::ObservationToAction),
                Box::new(do_calculus::DeleteAction),
                Box::new(do_calculus::InsertAction),
                Box::new(probability::ChainFactorize),
                Box::new(probability::ChainCombine),
                Box::new(probability::BayesExpand),
                Box::new(probability::BayesCollapse),
                Box::new(probability::MarginalIntroduce),
                Box::new(probability::MarginalEliminate),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn RewriteRule> + '_ {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
