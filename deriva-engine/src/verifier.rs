//! Top-level derivability verdicts.
//!
//! `Verifier` holds only read-only inputs (rule catalog, budget config), so
//! every call is pure and reentrant; independent calls share nothing mutable
//! and may run fully in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use deriva_core::{DerivaResult, Expression, SearchConfig};

use crate::graph::CausalGraph;
use crate::rules::RuleSet;
use crate::search::{BudgetReport, DerivationStep, SearchEngine, SearchOutcome};

/// Verdict of a single derivability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// A chain of sound rewrites connects predicted and target.
    Derivable { trace: Vec<DerivationStep> },
    /// The depth-bounded reachable space holds no connection. A weak claim:
    /// absence of proof within the budget, not proof of inequivalence.
    NotDerivable,
    /// The state budget ran out before exploration finished. Distinct from
    /// `NotDerivable`; surface it to callers, never fold it into failure.
    Inconclusive { budget: BudgetReport },
}

impl Verdict {
    pub fn is_derivable(&self) -> bool {
        matches!(self, Self::Derivable { .. })
    }
}

/// Reusable derivability checker.
pub struct Verifier {
    rules: RuleSet,
    config: SearchConfig,
}

impl Verifier {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            rules: RuleSet::standard(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Decide whether `predicted` is derivable from `target` under `graph`.
    ///
    /// Both expressions must mention only variables of `graph`; anything
    /// else fails with `UnknownVariable` before the search starts.
    pub fn verify(
        &self,
        graph: &CausalGraph,
        predicted: &Expression,
        target: &Expression,
    ) -> DerivaResult<Verdict> {
        let known = graph.variables();
        predicted.validate(&known, "predicted expression")?;
        target.validate(&known, "target expression")?;

        debug!(%predicted, %target, "starting derivability search");
        let engine = SearchEngine::new(graph, &self.rules, self.config.clone());
        let verdict = match engine.run(predicted, target)? {
            SearchOutcome::Found { trace } => {
                info!(steps = trace.len(), "derivation found");
                Verdict::Derivable { trace }
            }
            SearchOutcome::Exhausted => Verdict::NotDerivable,
            SearchOutcome::BudgetExceeded(budget) => Verdict::Inconclusive { budget },
        };
        Ok(verdict)
    }

    /// Verify independent (predicted, target) pairs in parallel. The graph,
    /// rule catalog, and config are read-only, so no locking is involved.
    pub fn verify_many(
        &self,
        graph: &CausalGraph,
        pairs: &[(Expression, Expression)],
    ) -> DerivaResult<Vec<Verdict>> {
        pairs
            .par_iter()
            .map(|(predicted, target)| self.verify(graph, predicted, target))
            .collect()
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot check with the standard rule catalog and default budget.
pub fn verify(
    graph: &CausalGraph,
    predicted: &Expression,
    target: &Expression,
) -> DerivaResult<Verdict> {
    Verifier::new().verify(graph, predicted, target)
}
