//! Named variables and deduplicated variable sets.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named node in a causal graph. Equality is by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Variable {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An unordered, deduplicated collection of variables.
///
/// Backed by a `BTreeSet`, so membership is deduplicated by construction and
/// iteration always follows the lexicographic order used for canonical
/// printing. Order carries no semantic meaning.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VariableSet(BTreeSet<Variable>);

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(var: impl Into<Variable>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(var.into());
        Self(set)
    }

    /// Build from anything yielding variable names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Variable>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn insert(&mut self, var: Variable) -> bool {
        self.0.insert(var)
    }

    pub fn remove(&mut self, var: &Variable) -> bool {
        self.0.remove(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.0.contains(var)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Variable> {
        self.0.iter()
    }

    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.0.is_disjoint(&other.0)
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Copy with `var` added.
    pub fn with(&self, var: Variable) -> Self {
        let mut out = self.clone();
        out.insert(var);
        out
    }

    /// Copy with `var` removed.
    pub fn without(&self, var: &Variable) -> Self {
        let mut out = self.clone();
        out.remove(var);
        out
    }
}

impl<S: Into<Variable>> FromIterator<S> for VariableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for VariableSet {
    type Item = Variable;
    type IntoIter = btree_set::IntoIter<Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = &'a Variable;
    type IntoIter = btree_set::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for VariableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for var in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{var}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_and_sorts() {
        let set = VariableSet::from_names(["z", "a", "z", "m"]);
        assert_eq!(set.len(), 3);
        let names: Vec<_> = set.iter().map(Variable::name).collect();
        assert_eq!(names, vec!["a", "m", "z"]);
    }

    #[test]
    fn set_algebra() {
        let a = VariableSet::from_names(["x", "y"]);
        let b = VariableSet::from_names(["y", "z"]);
        assert_eq!(a.union(&b), VariableSet::from_names(["x", "y", "z"]));
        assert_eq!(a.difference(&b), VariableSet::from_names(["x"]));
        assert_eq!(a.intersection(&b), VariableSet::from_names(["y"]));
        assert!(!a.is_disjoint(&b));
        assert!(a.difference(&b).is_disjoint(&b));
    }

    #[test]
    fn display_is_sorted() {
        let set = VariableSet::from_names(["w", "u"]);
        assert_eq!(set.to_string(), "u, w");
    }
}
