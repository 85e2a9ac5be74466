//! Constraint-to-formula translation.
//!
//! One exhaustive match turns each [`ConstraintKind`] into the formulas it
//! contributes. Translation is pure: it reads the tasks and returns
//! formulas plus any fresh indicators; the context decides whether to
//! commit them.
//!
//! # Reference
//! Baptiste et al. (2001), "Constraint-Based Scheduling", Ch. 1

use log::warn;

use super::gating::when_scheduled;
use crate::error::Result;
use crate::formula::{BoolExpr, BoolVar, CardinalityKind, IntExpr};
use crate::models::{
    ConstraintKind, IntervalPolicy, PrecedenceKind, Task, TaskConstraint, TaskId, TimeInterval,
};
use crate::validation::lookup;

/// Formulas contributed by one constraint.
#[derive(Debug, Clone, Default)]
pub(crate) struct Translation {
    pub formulas: Vec<BoolExpr>,
    /// Fresh boolean variables introduced by the translation.
    pub indicators: Vec<BoolVar>,
}

impl Translation {
    fn single(formula: BoolExpr) -> Self {
        Self {
            formulas: vec![formula],
            indicators: Vec::new(),
        }
    }
}

fn start(task: &Task) -> IntExpr {
    IntExpr::var(task.start().clone())
}

fn end(task: &Task) -> IntExpr {
    IntExpr::var(task.end().clone())
}

/// Translates `constraint` over `tasks`.
///
/// `scope` makes fresh indicator names unique within the context.
/// The constraint is expected to have passed validation.
pub(crate) fn translate(
    tasks: &[Task],
    scope: &str,
    constraint: &TaskConstraint,
) -> Result<Translation> {
    let translation = match &constraint.kind {
        ConstraintKind::Precedence {
            before,
            after,
            offset,
            kind,
        } => {
            let before = lookup(tasks, *before)?;
            let after = lookup(tasks, *after)?;
            let lower = end(before).plus(*offset);
            let upper = start(after);
            let relation = match kind {
                PrecedenceKind::Lax => lower.le(upper),
                PrecedenceKind::Strict => lower.lt(upper),
                PrecedenceKind::Tight => lower.equals(upper),
            };
            Translation::single(when_scheduled(&[before, after], relation))
        }
        ConstraintKind::StartSynced { task_1, task_2 } => {
            let (t1, t2) = (lookup(tasks, *task_1)?, lookup(tasks, *task_2)?);
            Translation::single(when_scheduled(&[t1, t2], start(t1).equals(start(t2))))
        }
        ConstraintKind::EndSynced { task_1, task_2 } => {
            let (t1, t2) = (lookup(tasks, *task_1)?, lookup(tasks, *task_2)?);
            Translation::single(when_scheduled(&[t1, t2], end(t1).equals(end(t2))))
        }
        ConstraintKind::DontOverlap { task_1, task_2 } => {
            let (t1, t2) = (lookup(tasks, *task_1)?, lookup(tasks, *task_2)?);
            // exactly one ordering holds
            let relation = start(t2).ge(end(t1)).xor(start(t1).ge(end(t2)));
            Translation::single(when_scheduled(&[t1, t2], relation))
        }

        ConstraintKind::StartAt { task, value } => {
            bound(tasks, *task, |t| start(t).equals(*value))?
        }
        ConstraintKind::StartAfterStrict { task, value } => {
            bound(tasks, *task, |t| start(t).gt(*value))?
        }
        ConstraintKind::StartAfterLax { task, value } => {
            bound(tasks, *task, |t| start(t).ge(*value))?
        }
        ConstraintKind::EndAt { task, value } => bound(tasks, *task, |t| end(t).equals(*value))?,
        ConstraintKind::EndBeforeStrict { task, value } => {
            bound(tasks, *task, |t| end(t).lt(*value))?
        }
        ConstraintKind::EndBeforeLax { task, value } => bound(tasks, *task, |t| end(t).le(*value))?,

        ConstraintKind::ConditionSchedule { task, condition } => {
            let task = lookup(tasks, *task)?;
            Translation::single(condition.clone().implies(task.presence()))
        }
        ConstraintKind::TasksDependency { task_1, task_2 } => {
            let (t1, t2) = (lookup(tasks, *task_1)?, lookup(tasks, *task_2)?);
            Translation::single(t1.presence().implies(t2.presence()))
        }

        ConstraintKind::ForceScheduleN {
            tasks: listed,
            n,
            kind,
        } => {
            let mut terms = Vec::with_capacity(listed.len());
            for id in listed {
                terms.push(BoolExpr::var(lookup(tasks, *id)?.scheduled().clone()));
            }
            Translation::single(BoolExpr::cardinality(terms, *kind, *n))
        }
        ConstraintKind::ScheduleNInIntervals {
            tasks: listed,
            n,
            intervals,
            kind,
            policy,
        } => {
            let mut selected = Vec::with_capacity(listed.len());
            for id in listed {
                selected.push((*id, lookup(tasks, *id)?));
            }
            match policy {
                IntervalPolicy::Conjunctive => {
                    conjunctive_selection(&selected, scope, intervals, *kind, *n)
                }
                IntervalPolicy::PerInterval => {
                    per_interval_selection(&selected, scope, intervals, *kind, *n)
                }
            }
        }
    };
    Ok(translation)
}

fn bound(
    tasks: &[Task],
    id: TaskId,
    relation: impl FnOnce(&Task) -> BoolExpr,
) -> Result<Translation> {
    let task = lookup(tasks, id)?;
    Ok(Translation::single(when_scheduled(&[task], relation(task))))
}

/// `start` and `end` both within `[lower, upper]`, with no straddling of
/// either bound and no spanning of the whole interval.
fn within(task: &Task, interval: &TimeInterval) -> BoolExpr {
    let (lo, up) = (interval.lower, interval.upper);
    BoolExpr::and(vec![
        start(task).ge(lo),
        end(task).le(up),
        !BoolExpr::and(vec![start(task).lt(lo), end(task).gt(lo)]),
        !BoolExpr::and(vec![start(task).lt(up), end(task).gt(up)]),
        !BoolExpr::and(vec![start(task).lt(lo), end(task).gt(up)]),
    ])
}

/// Task variables end in `_start`, `_end` or `_scheduled`; indicator
/// names end in a digit, so the two never meet whatever the task names.
fn indicator(name: String) -> (BoolVar, BoolExpr) {
    let var = BoolVar::new(name);
    let expr = BoolExpr::var(var.clone());
    (var, expr)
}

fn conjunctive_selection(
    tasks: &[(TaskId, &Task)],
    scope: &str,
    intervals: &[TimeInterval],
    kind: CardinalityKind,
    n: usize,
) -> Translation {
    let disjoint_pair = intervals
        .iter()
        .enumerate()
        .any(|(i, a)| intervals[i + 1..].iter().any(|b| a.is_disjoint(b)));
    if disjoint_pair {
        warn!(
            "interval selection {scope}: a task cannot lie within disjoint intervals at once, \
             indicators under the conjunctive policy stay false"
        );
    }

    let mut out = Translation::default();
    let mut terms = Vec::with_capacity(tasks.len());
    for (id, task) in tasks {
        let (var, flag) = indicator(format!("in_intervals_{scope}_t{}", id.index()));
        let fits_all = BoolExpr::and(intervals.iter().map(|iv| within(task, iv)));
        out.formulas.push(flag.clone().implies(fits_all));
        out.indicators.push(var);
        terms.push(flag);
    }
    out.formulas.push(BoolExpr::cardinality(terms, kind, n));
    out
}

fn per_interval_selection(
    tasks: &[(TaskId, &Task)],
    scope: &str,
    intervals: &[TimeInterval],
    kind: CardinalityKind,
    n: usize,
) -> Translation {
    let mut out = Translation::default();
    let mut terms = Vec::with_capacity(tasks.len() * intervals.len());
    for (id, task) in tasks {
        let mut own = Vec::with_capacity(intervals.len());
        for (i, interval) in intervals.iter().enumerate() {
            let (var, flag) = indicator(format!("in_interval_{scope}_t{}_{i}", id.index()));
            out.formulas.push(flag.clone().implies(within(task, interval)));
            out.indicators.push(var);
            own.push(flag);
        }
        if own.len() > 1 {
            // a task counts once even if intervals overlap
            out.formulas
                .push(BoolExpr::cardinality(own.clone(), CardinalityKind::AtMost, 1));
        }
        terms.extend(own);
    }
    out.formulas.push(BoolExpr::cardinality(terms, kind, n));
    out
}
