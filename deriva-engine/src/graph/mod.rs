//! Immutable causal DAGs with mutilation views.
//!
//! Nodes are named variables held in a petgraph adjacency structure with a
//! name→index table. Mutilation (`remove_incoming`, `remove_outgoing`) never
//! mutates the receiver; each call returns a new graph value, so every
//! do-calculus side-condition is checked against its own immutable view.

pub mod d_separation;

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use deriva_core::{DerivaError, DerivaResult, Variable, VariableSet};

/// A directed acyclic graph over named variables.
#[derive(Debug, Clone)]
pub struct CausalGraph {
    graph: DiGraph<Variable, ()>,
    index: HashMap<Variable, NodeIndex>,
}

impl CausalGraph {
    /// Build from an edge list. Variables are registered on first mention.
    pub fn from_edges(edges: &[(&str, &str)]) -> DerivaResult<Self> {
        Self::with_nodes(&[], edges)
    }

    /// Build from explicit nodes (for isolated variables, e.g. unmeasured
    /// confounders mentioned by no edge) plus an edge list. Rejects cycles.
    pub fn with_nodes(nodes: &[&str], edges: &[(&str, &str)]) -> DerivaResult<Self> {
        let mut graph = DiGraph::new();
        let mut index: HashMap<Variable, NodeIndex> = HashMap::new();

        for name in nodes {
            let var = Variable::new(*name);
            if !index.contains_key(&var) {
                let idx = graph.add_node(var.clone());
                index.insert(var, idx);
            }
        }
        for (source, target) in edges {
            if source == target {
                return Err(DerivaError::InvalidGraph {
                    path: format!("{source} -> {target}"),
                });
            }
            let src = Self::ensure_node(&mut graph, &mut index, source);
            let dst = Self::ensure_node(&mut graph, &mut index, target);
            if graph.find_edge(src, dst).is_none() {
                graph.add_edge(src, dst, ());
            }
        }

        let built = Self { graph, index };
        if let Some(path) = built.find_cycle_path() {
            return Err(DerivaError::InvalidGraph { path });
        }
        Ok(built)
    }

    fn ensure_node(
        graph: &mut DiGraph<Variable, ()>,
        index: &mut HashMap<Variable, NodeIndex>,
        name: &str,
    ) -> NodeIndex {
        let var = Variable::new(name);
        if let Some(&idx) = index.get(&var) {
            return idx;
        }
        let idx = graph.add_node(var.clone());
        index.insert(var, idx);
        idx
    }

    /// One cycle path, if the graph has any, formatted `a -> b -> a`.
    fn find_cycle_path(&self) -> Option<String> {
        let cycle = tarjan_scc(&self.graph)
            .into_iter()
            .find(|scc| scc.len() > 1)?;
        let names: Vec<&str> = cycle
            .iter()
            .filter_map(|&idx| self.graph.node_weight(idx).map(Variable::name))
            .collect();
        let first = names.first().copied().unwrap_or_default();
        Some(format!("{} -> {first}", names.join(" -> ")))
    }

    /// All variables in the graph.
    pub fn variables(&self) -> VariableSet {
        self.graph.node_weights().cloned().collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.index.contains_key(var)
    }

    /// Whether the edge `from -> to` is present. Unknown variables yield false.
    pub fn has_edge(&self, from: &Variable, to: &Variable) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&src), Some(&dst)) => self.graph.find_edge(src, dst).is_some(),
            _ => false,
        }
    }

    pub(crate) fn node(&self, var: &Variable, context: &str) -> DerivaResult<NodeIndex> {
        self.index
            .get(var)
            .copied()
            .ok_or_else(|| DerivaError::UnknownVariable {
                name: var.name().to_string(),
                context: context.to_string(),
            })
    }

    pub(crate) fn graph(&self) -> &DiGraph<Variable, ()> {
        &self.graph
    }

    /// Indices reachable from `set` along `direction`, including `set` itself.
    pub(crate) fn reach_indices(
        &self,
        set: &VariableSet,
        direction: Direction,
        context: &str,
    ) -> DerivaResult<HashSet<NodeIndex>> {
        let mut seen = HashSet::new();
        let mut stack = Vec::new();
        for var in set {
            let idx = self.node(var, context)?;
            if seen.insert(idx) {
                stack.push(idx);
            }
        }
        while let Some(idx) = stack.pop() {
            for next in self.graph.neighbors_directed(idx, direction) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        Ok(seen)
    }

    fn reach(&self, set: &VariableSet, direction: Direction, context: &str) -> DerivaResult<VariableSet> {
        let indices = self.reach_indices(set, direction, context)?;
        Ok(indices
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect())
    }

    /// Ancestors of `set`, including `set` itself.
    pub fn ancestors(&self, set: &VariableSet) -> DerivaResult<VariableSet> {
        self.reach(set, Direction::Incoming, "ancestor query")
    }

    /// Descendants of `set`, including `set` itself.
    pub fn descendants(&self, set: &VariableSet) -> DerivaResult<VariableSet> {
        self.reach(set, Direction::Outgoing, "descendant query")
    }

    /// The graph with every edge into `set` deleted (G with `set` barred).
    pub fn remove_incoming(&self, set: &VariableSet) -> DerivaResult<Self> {
        self.mutilate(set, Direction::Incoming)
    }

    /// The graph with every edge out of `set` deleted (G with `set` underlined).
    pub fn remove_outgoing(&self, set: &VariableSet) -> DerivaResult<Self> {
        self.mutilate(set, Direction::Outgoing)
    }

    fn mutilate(&self, set: &VariableSet, direction: Direction) -> DerivaResult<Self> {
        let mut affected = HashSet::new();
        for var in set {
            affected.insert(self.node(var, "graph mutilation")?);
        }
        let mut out = self.clone();
        out.graph.retain_edges(|frozen, edge| {
            frozen.edge_endpoints(edge).is_some_and(|(source, target)| {
                let endpoint = match direction {
                    Direction::Incoming => target,
                    Direction::Outgoing => source,
                };
                !affected.contains(&endpoint)
            })
        });
        Ok(out)
    }

    /// d-separation oracle: every path between `a` and `b` is blocked by
    /// `given` in this graph instance.
    pub fn d_separated(
        &self,
        a: &VariableSet,
        b: &VariableSet,
        given: &VariableSet,
    ) -> DerivaResult<bool> {
        d_separation::d_separated(self, a, b, given)
    }
}
