//! Symbolic formula language.
//!
//! Constraints are translated into formulas over integer and boolean
//! symbolic variables. Formulas are plain data: nothing here searches
//! for a solution. A backend receives the final assertion set and maps
//! each node onto its own terms.
//!
//! # Rendering
//!
//! `Display` prints formulas as SMT-LIB s-expressions:
//!
//! ```
//! use u_schedule_cp::formula::{BoolExpr, BoolVar, IntExpr, IntVar};
//!
//! let end = IntExpr::var(IntVar::new("a_end"));
//! let start = IntExpr::var(IntVar::new("b_start"));
//! let f = BoolExpr::var(BoolVar::new("a_scheduled")).implies(end.plus(2).le(start));
//! assert_eq!(f.to_string(), "(=> a_scheduled (<= (+ a_end 2) b_start))");
//! ```
//!
//! # Reference
//! Barrett, Fontaine, Tinelli (2017), "The SMT-LIB Standard, Version 2.6"

mod eval;

pub use eval::Valuation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConstraintError;

/// Integer-domain symbolic variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntVar(String);

/// Boolean symbolic variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoolVar(String);

impl IntVar {
    /// Creates a variable with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl BoolVar {
    /// Creates a variable with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Integer expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntExpr {
    Var(IntVar),
    Const(i64),
    Add(Box<IntExpr>, Box<IntExpr>),
}

/// Arithmetic comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparison {
    /// Applies the comparison to two concrete values.
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Eq => lhs == rhs,
            Self::Ge => lhs >= rhs,
            Self::Gt => lhs > rhs,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }
}

/// How a cardinality formula compares the number of true terms to its bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CardinalityKind {
    /// At least `bound` terms are true.
    AtLeast,
    /// At most `bound` terms are true.
    AtMost,
    /// Exactly `bound` terms are true.
    #[default]
    Exact,
}

impl CardinalityKind {
    /// Whether `count` true terms satisfy this kind against `bound`.
    pub fn holds(self, count: usize, bound: usize) -> bool {
        match self {
            Self::AtLeast => count >= bound,
            Self::AtMost => count <= bound,
            Self::Exact => count == bound,
        }
    }
}

impl FromStr for CardinalityKind {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atleast" => Ok(Self::AtLeast),
            "atmost" => Ok(Self::AtMost),
            "exact" => Ok(Self::Exact),
            other => Err(ConstraintError::parameter(
                "CardinalityKind",
                format!("unknown kind '{other}', expected 'atleast', 'atmost' or 'exact'"),
            )),
        }
    }
}

impl TryFrom<String> for CardinalityKind {
    type Error = ConstraintError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Boolean formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolExpr {
    Const(bool),
    Var(BoolVar),
    Compare {
        lhs: IntExpr,
        op: Comparison,
        rhs: IntExpr,
    },
    Not(Box<BoolExpr>),
    And(Vec<BoolExpr>),
    Or(Vec<BoolExpr>),
    Xor(Box<BoolExpr>, Box<BoolExpr>),
    Implies(Box<BoolExpr>, Box<BoolExpr>),
    IfThenElse(Box<BoolExpr>, Box<BoolExpr>, Box<BoolExpr>),
    /// Pseudo-boolean cardinality: the number of true `terms` compared
    /// with `bound` according to `kind`.
    Cardinality {
        terms: Vec<BoolExpr>,
        kind: CardinalityKind,
        bound: usize,
    },
}

impl IntExpr {
    /// Variable reference.
    pub fn var(v: IntVar) -> Self {
        Self::Var(v)
    }

    /// Integer literal.
    pub fn constant(value: i64) -> Self {
        Self::Const(value)
    }

    /// `self + offset`. A zero offset leaves the expression as is.
    pub fn plus(self, offset: i64) -> Self {
        if offset == 0 {
            self
        } else {
            Self::Add(Box::new(self), Box::new(Self::Const(offset)))
        }
    }

    fn compare(self, op: Comparison, rhs: impl Into<IntExpr>) -> BoolExpr {
        BoolExpr::Compare {
            lhs: self,
            op,
            rhs: rhs.into(),
        }
    }

    /// `self < rhs`.
    pub fn lt(self, rhs: impl Into<IntExpr>) -> BoolExpr {
        self.compare(Comparison::Lt, rhs)
    }

    /// `self <= rhs`.
    pub fn le(self, rhs: impl Into<IntExpr>) -> BoolExpr {
        self.compare(Comparison::Le, rhs)
    }

    /// `self == rhs`.
    pub fn equals(self, rhs: impl Into<IntExpr>) -> BoolExpr {
        self.compare(Comparison::Eq, rhs)
    }

    /// `self >= rhs`.
    pub fn ge(self, rhs: impl Into<IntExpr>) -> BoolExpr {
        self.compare(Comparison::Ge, rhs)
    }

    /// `self > rhs`.
    pub fn gt(self, rhs: impl Into<IntExpr>) -> BoolExpr {
        self.compare(Comparison::Gt, rhs)
    }
}

impl From<i64> for IntExpr {
    fn from(value: i64) -> Self {
        Self::Const(value)
    }
}

impl From<IntVar> for IntExpr {
    fn from(v: IntVar) -> Self {
        Self::Var(v)
    }
}

impl From<&IntVar> for IntExpr {
    fn from(v: &IntVar) -> Self {
        Self::Var(v.clone())
    }
}

impl BoolExpr {
    pub const TRUE: BoolExpr = BoolExpr::Const(true);
    pub const FALSE: BoolExpr = BoolExpr::Const(false);

    /// Variable reference.
    pub fn var(v: BoolVar) -> Self {
        Self::Var(v)
    }

    /// Conjunction. Nested conjunctions are flattened and `true` operands
    /// dropped; no operands gives `true`, one operand gives itself.
    pub fn and(items: impl IntoIterator<Item = BoolExpr>) -> Self {
        let mut flat = Vec::new();
        for item in items {
            match item {
                Self::Const(true) => {}
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::TRUE,
            1 => flat.remove(0),
            _ => Self::And(flat),
        }
    }

    /// Disjunction, simplified the same way as [`BoolExpr::and`] with `false`
    /// as the neutral operand.
    pub fn or(items: impl IntoIterator<Item = BoolExpr>) -> Self {
        let mut flat = Vec::new();
        for item in items {
            match item {
                Self::Const(false) => {}
                Self::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::FALSE,
            1 => flat.remove(0),
            _ => Self::Or(flat),
        }
    }

    /// Exclusive or.
    pub fn xor(self, other: BoolExpr) -> Self {
        Self::Xor(Box::new(self), Box::new(other))
    }

    /// `self => consequent`.
    pub fn implies(self, consequent: BoolExpr) -> Self {
        Self::Implies(Box::new(self), Box::new(consequent))
    }

    /// `if self then then_branch else else_branch`.
    pub fn if_then_else(self, then_branch: BoolExpr, else_branch: BoolExpr) -> Self {
        Self::IfThenElse(Box::new(self), Box::new(then_branch), Box::new(else_branch))
    }

    /// Cardinality formula over `terms`.
    pub fn cardinality(terms: Vec<BoolExpr>, kind: CardinalityKind, bound: usize) -> Self {
        Self::Cardinality { terms, kind, bound }
    }
}

impl std::ops::Not for BoolExpr {
    type Output = BoolExpr;

    fn not(self) -> BoolExpr {
        match self {
            BoolExpr::Const(b) => BoolExpr::Const(!b),
            other => BoolExpr::Not(Box::new(other)),
        }
    }
}

impl From<BoolVar> for BoolExpr {
    fn from(v: BoolVar) -> Self {
        Self::Var(v)
    }
}

impl fmt::Display for IntVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BoolVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for IntExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(v) => write!(f, "{v}"),
            Self::Const(c) if *c < 0 => write!(f, "(- {})", c.unsigned_abs()),
            Self::Const(c) => write!(f, "{c}"),
            Self::Add(a, b) => write!(f, "(+ {a} {b})"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, head: &str, items: &[BoolExpr]) -> fmt::Result {
    write!(f, "({head}")?;
    for item in items {
        write!(f, " {item}")?;
    }
    f.write_str(")")
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(b) => write!(f, "{b}"),
            Self::Var(v) => write!(f, "{v}"),
            Self::Compare { lhs, op, rhs } => write!(f, "({} {lhs} {rhs})", op.symbol()),
            Self::Not(inner) => write!(f, "(not {inner})"),
            Self::And(items) => write_list(f, "and", items),
            Self::Or(items) => write_list(f, "or", items),
            Self::Xor(a, b) => write!(f, "(xor {a} {b})"),
            Self::Implies(a, b) => write!(f, "(=> {a} {b})"),
            Self::IfThenElse(c, t, e) => write!(f, "(ite {c} {t} {e})"),
            Self::Cardinality { terms, kind, bound } => {
                let head = match kind {
                    CardinalityKind::AtLeast => format!("(_ at-least {bound})"),
                    CardinalityKind::AtMost => format!("(_ at-most {bound})"),
                    CardinalityKind::Exact => format!("(_ exactly {bound})"),
                };
                write_list(f, &head, terms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(name: &str) -> BoolExpr {
        BoolExpr::var(BoolVar::new(name))
    }

    #[test]
    fn test_and_flattens_and_drops_true() {
        let f = BoolExpr::and(vec![
            b("a"),
            BoolExpr::TRUE,
            BoolExpr::and(vec![b("b"), b("c")]),
        ]);
        assert_eq!(f, BoolExpr::And(vec![b("a"), b("b"), b("c")]));
        assert_eq!(BoolExpr::and(vec![BoolExpr::TRUE, b("x")]), b("x"));
        assert_eq!(BoolExpr::and(Vec::new()), BoolExpr::TRUE);
    }

    #[test]
    fn test_or_drops_false() {
        assert_eq!(BoolExpr::or(vec![BoolExpr::FALSE, b("x")]), b("x"));
        assert_eq!(BoolExpr::or(Vec::new()), BoolExpr::FALSE);
    }

    #[test]
    fn test_not_folds_constants() {
        assert_eq!(!BoolExpr::TRUE, BoolExpr::FALSE);
        assert_eq!((!b("x")).to_string(), "(not x)");
    }

    #[test]
    fn test_plus_zero_is_identity() {
        let e = IntExpr::var(IntVar::new("t_end"));
        assert_eq!(e.clone().plus(0), e);
        assert_eq!(e.plus(3).to_string(), "(+ t_end 3)");
    }

    #[test]
    fn test_display_smtlib() {
        let start = IntExpr::var(IntVar::new("t_start"));
        assert_eq!(start.clone().ge(-2).to_string(), "(>= t_start (- 2))");
        assert_eq!(start.equals(4).to_string(), "(= t_start 4)");

        let card = BoolExpr::cardinality(vec![b("x"), b("y")], CardinalityKind::AtMost, 1);
        assert_eq!(card.to_string(), "((_ at-most 1) x y)");

        let ite = b("c").if_then_else(b("x"), !b("y"));
        assert_eq!(ite.to_string(), "(ite c x (not y))");
    }

    #[test]
    fn test_cardinality_kind_from_str() {
        assert_eq!("atleast".parse::<CardinalityKind>(), Ok(CardinalityKind::AtLeast));
        assert_eq!("atmost".parse::<CardinalityKind>(), Ok(CardinalityKind::AtMost));
        assert_eq!("exact".parse::<CardinalityKind>(), Ok(CardinalityKind::Exact));
        assert!("most".parse::<CardinalityKind>().unwrap_err().is_parameter());
    }

    #[test]
    fn test_cardinality_kind_serde() {
        let kind: CardinalityKind = serde_json::from_str("\"atleast\"").unwrap();
        assert_eq!(kind, CardinalityKind::AtLeast);
        let err = serde_json::from_str::<CardinalityKind>("\"AtLeast\"").unwrap_err();
        assert!(err.to_string().contains("unknown kind 'AtLeast'"), "{err}");
        assert_eq!(serde_json::to_string(&CardinalityKind::Exact).unwrap(), "\"exact\"");
    }
}
