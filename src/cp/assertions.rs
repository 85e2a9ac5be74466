//! Append-only assertion set.
//!
//! Every formula a context commits lands here together with its origin.
//! Entries are never removed or mutated; only the owning context can
//! append.

use serde::{Deserialize, Serialize};

use super::ConstraintId;
use crate::error::Result;
use crate::formula::{BoolExpr, Valuation};
use crate::models::TaskId;

/// What contributed an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssertionOrigin {
    /// A task's own start/duration/horizon relations.
    Task(TaskId),
    /// A registered task constraint.
    Constraint(ConstraintId),
    /// A formula added directly by the caller.
    Formula,
}

/// A committed formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub origin: AssertionOrigin,
    pub formula: BoolExpr,
}

/// Problem-scoped collection of committed formulas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssertionSet {
    entries: Vec<Assertion>,
}

impl AssertionSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, origin: AssertionOrigin, formula: BoolExpr) {
        self.entries.push(Assertion { origin, formula });
    }

    /// Number of assertions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been asserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assertions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Assertion> {
        self.entries.iter()
    }

    /// Formulas in registration order, as handed to a solver backend.
    pub fn formulas(&self) -> impl Iterator<Item = &BoolExpr> {
        self.entries.iter().map(|a| &a.formula)
    }

    /// Formulas contributed by `origin`.
    pub fn from_origin(&self, origin: AssertionOrigin) -> impl Iterator<Item = &BoolExpr> {
        self.entries
            .iter()
            .filter(move |a| a.origin == origin)
            .map(|a| &a.formula)
    }

    /// First assertion that `valuation` falsifies, if any.
    pub fn first_violated(&self, valuation: &Valuation) -> Result<Option<&Assertion>> {
        for entry in &self.entries {
            if !entry.formula.evaluate(valuation)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Whether `valuation` satisfies every assertion.
    pub fn is_satisfied_by(&self, valuation: &Valuation) -> Result<bool> {
        Ok(self.first_violated(valuation)?.is_none())
    }
}

impl<'a> IntoIterator for &'a AssertionSet {
    type Item = &'a Assertion;
    type IntoIter = std::slice::Iter<'a, Assertion>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstraintError;
    use crate::formula::{BoolVar, IntExpr, IntVar};

    #[test]
    fn test_register_and_filter_by_origin() {
        let mut set = AssertionSet::new();
        assert!(set.is_empty());

        let x = IntExpr::var(IntVar::new("x"));
        set.register(AssertionOrigin::Task(TaskId(0)), x.clone().ge(0));
        set.register(AssertionOrigin::Constraint(ConstraintId(0)), x.clone().le(5));
        set.register(AssertionOrigin::Formula, BoolExpr::TRUE);

        assert_eq!(set.len(), 3);
        let from_task: Vec<_> = set.from_origin(AssertionOrigin::Task(TaskId(0))).collect();
        assert_eq!(from_task, vec![&x.ge(0)]);
        assert_eq!(set.formulas().count(), 3);
    }

    #[test]
    fn test_satisfaction() {
        let mut set = AssertionSet::new();
        let v = IntVar::new("v");
        set.register(AssertionOrigin::Formula, IntExpr::var(v.clone()).ge(1));
        set.register(AssertionOrigin::Formula, IntExpr::var(v.clone()).le(3));

        assert_eq!(set.is_satisfied_by(&Valuation::new().with_int(&v, 2)), Ok(true));

        let bad = Valuation::new().with_int(&v, 4);
        let violated = set.first_violated(&bad).unwrap().unwrap();
        assert_eq!(violated.formula, IntExpr::var(v).le(3));
    }

    #[test]
    fn test_unbound_variable_propagates() {
        let mut set = AssertionSet::new();
        set.register(AssertionOrigin::Formula, BoolExpr::var(BoolVar::new("b")));
        assert_eq!(
            set.is_satisfied_by(&Valuation::new()),
            Err(ConstraintError::UnboundVariable("b".into()))
        );
    }
}
