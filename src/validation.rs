//! Parameter and precondition checks for constraints.
//!
//! Runs before translation so that a rejected constraint leaves the
//! context untouched. Detects:
//! - Task handles not issued by the context
//! - Negative precedence offsets
//! - Mandatory tasks where an optional one is required
//! - Empty or inverted interval lists
//! - Non-positive horizons

use crate::error::{ConstraintError, Result};
use crate::models::{ConstraintKind, Task, TaskConstraint, TaskId};

/// Validates a constraint against the tasks of its context.
///
/// Checks:
/// 1. Every referenced task exists
/// 2. Precedence offsets are non-negative
/// 3. `ConditionSchedule` targets an optional task
/// 4. `TasksDependency` has an optional dependent task
/// 5. `ForceScheduleN` only lists optional tasks
/// 6. `ScheduleNInIntervals` has at least one interval, each with
///    `lower <= upper`
///
/// The first failing check is returned.
pub fn validate_constraint(tasks: &[Task], constraint: &TaskConstraint) -> Result<()> {
    let label = constraint.label();

    for id in constraint.tasks() {
        lookup(tasks, id)?;
    }

    match &constraint.kind {
        ConstraintKind::Precedence { offset, .. } if *offset < 0 => {
            Err(ConstraintError::parameter(
                label,
                format!("offset must be a non-negative integer, got {offset}"),
            ))
        }
        ConstraintKind::ConditionSchedule { task, .. } => require_optional(tasks, label, *task),
        ConstraintKind::TasksDependency { task_2, .. } => require_optional(tasks, label, *task_2),
        ConstraintKind::ForceScheduleN { tasks: listed, .. } => {
            for id in listed {
                require_optional(tasks, label, *id)?;
            }
            Ok(())
        }
        ConstraintKind::ScheduleNInIntervals { intervals, .. } => {
            if intervals.is_empty() {
                return Err(ConstraintError::parameter(
                    label,
                    "list of time intervals must not be empty",
                ));
            }
            for interval in intervals {
                if interval.lower > interval.upper {
                    return Err(ConstraintError::parameter(
                        label,
                        format!(
                            "time interval [{}, {}] has lower bound above upper bound",
                            interval.lower, interval.upper
                        ),
                    ));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Validates a context horizon: when present it must be positive.
pub fn validate_horizon(context: &str, horizon: Option<i64>) -> Result<()> {
    match horizon {
        Some(h) if h <= 0 => Err(ConstraintError::parameter(
            context,
            format!("horizon must be a positive integer, got {h}"),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn lookup(tasks: &[Task], id: TaskId) -> Result<&Task> {
    tasks.get(id.index()).ok_or(ConstraintError::UnknownTask(id))
}

fn require_optional(tasks: &[Task], label: &str, id: TaskId) -> Result<()> {
    let task = lookup(tasks, id)?;
    if task.optional {
        Ok(())
    } else {
        Err(ConstraintError::precondition(
            label,
            format!("task {} must be optional", task.name),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{BoolExpr, CardinalityKind};
    use crate::models::{PrecedenceKind, TimeInterval};

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::fixed_duration("t0", 2),
            Task::fixed_duration("t1", 3).optional(),
            Task::fixed_duration("t2", 1).optional(),
        ]
    }

    #[test]
    fn test_valid_constraints() {
        let tasks = sample_tasks();
        for c in [
            TaskConstraint::precedence(TaskId(0), TaskId(1), 0, PrecedenceKind::Lax),
            TaskConstraint::dont_overlap(TaskId(0), TaskId(2)),
            TaskConstraint::start_at(TaskId(0), 4),
            TaskConstraint::condition_schedule(TaskId(1), BoolExpr::TRUE),
            TaskConstraint::tasks_dependency(TaskId(0), TaskId(2)),
            TaskConstraint::force_schedule_n(vec![TaskId(1), TaskId(2)], 1, CardinalityKind::Exact),
        ] {
            assert!(validate_constraint(&tasks, &c).is_ok(), "{}", c.label());
        }
    }

    #[test]
    fn test_unknown_task() {
        let tasks = sample_tasks();
        let c = TaskConstraint::start_synced(TaskId(0), TaskId(9));
        assert_eq!(
            validate_constraint(&tasks, &c),
            Err(ConstraintError::UnknownTask(TaskId(9)))
        );
    }

    #[test]
    fn test_negative_offset() {
        let tasks = sample_tasks();
        let c = TaskConstraint::precedence(TaskId(0), TaskId(1), -1, PrecedenceKind::Lax);
        assert!(validate_constraint(&tasks, &c).unwrap_err().is_parameter());
    }

    #[test]
    fn test_condition_schedule_requires_optional() {
        let tasks = sample_tasks();
        let c = TaskConstraint::condition_schedule(TaskId(0), BoolExpr::TRUE);
        let err = validate_constraint(&tasks, &c).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("t0 must be optional"));
    }

    #[test]
    fn test_dependency_requires_optional_second_task() {
        let tasks = sample_tasks();
        // first task may be mandatory
        let forward = TaskConstraint::tasks_dependency(TaskId(0), TaskId(1));
        assert!(validate_constraint(&tasks, &forward).is_ok());
        let backward = TaskConstraint::tasks_dependency(TaskId(1), TaskId(0));
        let err = validate_constraint(&tasks, &backward).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_force_schedule_n_requires_all_optional() {
        let tasks = sample_tasks();
        let c = TaskConstraint::force_schedule_n(
            vec![TaskId(1), TaskId(0), TaskId(2)],
            2,
            CardinalityKind::AtMost,
        );
        assert!(validate_constraint(&tasks, &c).unwrap_err().is_precondition());
    }

    #[test]
    fn test_interval_list_checks() {
        let tasks = sample_tasks();
        let empty = TaskConstraint::schedule_n_in_intervals(
            vec![TaskId(0)],
            1,
            Vec::new(),
            CardinalityKind::Exact,
        );
        assert!(validate_constraint(&tasks, &empty).unwrap_err().is_parameter());

        let inverted = TaskConstraint::schedule_n_in_intervals(
            vec![TaskId(0)],
            1,
            vec![TimeInterval::new(0, 4), TimeInterval::new(9, 6)],
            CardinalityKind::Exact,
        );
        assert!(validate_constraint(&tasks, &inverted).unwrap_err().is_parameter());

        // mandatory tasks are fine here
        let ok = TaskConstraint::schedule_n_in_intervals(
            vec![TaskId(0), TaskId(1)],
            1,
            vec![TimeInterval::new(0, 4)],
            CardinalityKind::AtLeast,
        );
        assert!(validate_constraint(&tasks, &ok).is_ok());
    }

    #[test]
    fn test_horizon() {
        assert!(validate_horizon("pb", None).is_ok());
        assert!(validate_horizon("pb", Some(10)).is_ok());
        assert!(validate_horizon("pb", Some(0)).unwrap_err().is_parameter());
        assert!(validate_horizon("pb", Some(-2)).unwrap_err().is_parameter());
    }
}
