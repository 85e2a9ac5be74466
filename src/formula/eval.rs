//! Checking formulas against a concrete valuation.
//!
//! A valuation is supplied by the caller, typically read back from a
//! solver model or enumerated in tests. Evaluation never searches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{BoolExpr, BoolVar, IntExpr, IntVar};
use crate::error::{ConstraintError, Result};

/// Concrete values for symbolic variables, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    ints: HashMap<String, i64>,
    bools: HashMap<String, bool>,
}

impl Valuation {
    /// Creates an empty valuation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: binds an integer variable.
    pub fn with_int(mut self, var: &IntVar, value: i64) -> Self {
        self.set_int(var, value);
        self
    }

    /// Builder: binds a boolean variable.
    pub fn with_bool(mut self, var: &BoolVar, value: bool) -> Self {
        self.set_bool(var, value);
        self
    }

    /// Binds (or rebinds) an integer variable.
    pub fn set_int(&mut self, var: &IntVar, value: i64) {
        self.ints.insert(var.name().to_string(), value);
    }

    /// Binds (or rebinds) a boolean variable.
    pub fn set_bool(&mut self, var: &BoolVar, value: bool) {
        self.bools.insert(var.name().to_string(), value);
    }

    /// Value of an integer variable, if bound.
    pub fn int(&self, var: &IntVar) -> Option<i64> {
        self.ints.get(var.name()).copied()
    }

    /// Value of a boolean variable, if bound.
    pub fn bool(&self, var: &BoolVar) -> Option<bool> {
        self.bools.get(var.name()).copied()
    }
}

impl IntExpr {
    /// Evaluates the expression under `valuation`.
    pub fn evaluate(&self, valuation: &Valuation) -> Result<i64> {
        match self {
            Self::Var(v) => valuation
                .int(v)
                .ok_or_else(|| ConstraintError::UnboundVariable(v.name().to_string())),
            Self::Const(c) => Ok(*c),
            Self::Add(a, b) => a
                .evaluate(valuation)?
                .checked_add(b.evaluate(valuation)?)
                .ok_or_else(|| ConstraintError::Overflow(self.to_string())),
        }
    }
}

impl BoolExpr {
    /// Evaluates the formula under `valuation`.
    ///
    /// Every variable reached must be bound; connectives evaluate all of
    /// their operands so an unbound variable is reported even when the
    /// result would not depend on it.
    pub fn evaluate(&self, valuation: &Valuation) -> Result<bool> {
        match self {
            Self::Const(b) => Ok(*b),
            Self::Var(v) => valuation
                .bool(v)
                .ok_or_else(|| ConstraintError::UnboundVariable(v.name().to_string())),
            Self::Compare { lhs, op, rhs } => {
                Ok(op.holds(lhs.evaluate(valuation)?, rhs.evaluate(valuation)?))
            }
            Self::Not(inner) => Ok(!inner.evaluate(valuation)?),
            Self::And(items) => {
                let mut all = true;
                for item in items {
                    all &= item.evaluate(valuation)?;
                }
                Ok(all)
            }
            Self::Or(items) => {
                let mut any = false;
                for item in items {
                    any |= item.evaluate(valuation)?;
                }
                Ok(any)
            }
            Self::Xor(a, b) => Ok(a.evaluate(valuation)? ^ b.evaluate(valuation)?),
            Self::Implies(a, b) => {
                let premise = a.evaluate(valuation)?;
                let conclusion = b.evaluate(valuation)?;
                Ok(!premise || conclusion)
            }
            Self::IfThenElse(c, t, e) => {
                let cond = c.evaluate(valuation)?;
                let then_value = t.evaluate(valuation)?;
                let else_value = e.evaluate(valuation)?;
                Ok(if cond { then_value } else { else_value })
            }
            Self::Cardinality { terms, kind, bound } => {
                let mut count = 0;
                for term in terms {
                    if term.evaluate(valuation)? {
                        count += 1;
                    }
                }
                Ok(kind.holds(count, *bound))
            }
        }
    }
}
