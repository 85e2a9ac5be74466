//! Applicability guards.
//!
//! A relation over optional tasks only binds when those tasks are
//! actually scheduled. The guard is the sole way optionality reaches the
//! model: `presence(t1) ∧ … ∧ presence(tn) ⇒ relation`.

use crate::formula::BoolExpr;
use crate::models::Task;

/// Guards `relation` on the presence of every task in `tasks`.
///
/// With only mandatory tasks the relation is returned unchanged.
pub(crate) fn when_scheduled(tasks: &[&Task], relation: BoolExpr) -> BoolExpr {
    if tasks.iter().any(|t| t.optional) {
        BoolExpr::and(tasks.iter().map(|t| t.presence())).implies(relation)
    } else {
        relation
    }
}
