//! Task constraints.
//!
//! A closed catalog of the relationships a scheduling model can state
//! between tasks: precedence, synchronization, non-overlap, bounds on a
//! single task, optional-task gating and cardinality selection. A
//! constraint value is inert data; it contributes formulas only when
//! registered with a [`SchedulingContext`](crate::cp::SchedulingContext).
//!
//! # Reference
//! Brucker (2007), "Scheduling Algorithms", Ch. 2

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::TaskId;
use crate::error::ConstraintError;
use crate::formula::{BoolExpr, CardinalityKind};

/// How the end of the first task relates to the start of the second in a
/// precedence constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PrecedenceKind {
    /// `before.end + offset <= after.start`
    #[default]
    Lax,
    /// `before.end + offset < after.start`
    Strict,
    /// `before.end + offset == after.start`
    Tight,
}

impl FromStr for PrecedenceKind {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lax" => Ok(Self::Lax),
            "strict" => Ok(Self::Strict),
            "tight" => Ok(Self::Tight),
            other => Err(ConstraintError::parameter(
                "TaskPrecedence",
                format!("kind must either be 'lax', 'strict' or 'tight', got '{other}'"),
            )),
        }
    }
}

impl TryFrom<String> for PrecedenceKind {
    type Error = ConstraintError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// How tasks are matched against the interval list of
/// [`ConstraintKind::ScheduleNInIntervals`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPolicy {
    /// One indicator per task, implying the task fits every listed
    /// interval at once. With two or more disjoint intervals the
    /// indicator can never be true.
    #[default]
    Conjunctive,
    /// One indicator per task and interval, each implying the task fits
    /// that interval; a task counts at most once.
    PerInterval,
}

/// Closed time interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub lower: i64,
    pub upper: i64,
}

impl TimeInterval {
    /// Creates an interval.
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    /// Whether two intervals share no point.
    pub fn is_disjoint(&self, other: &TimeInterval) -> bool {
        self.upper < other.lower || other.upper < self.lower
    }
}

impl From<(i64, i64)> for TimeInterval {
    fn from((lower, upper): (i64, i64)) -> Self {
        Self::new(lower, upper)
    }
}

/// Parameters of each constraint kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `after` starts once `before` is finished, `offset` periods later at
    /// the earliest (lax), strictly later (strict) or exactly then (tight).
    Precedence {
        before: TaskId,
        after: TaskId,
        offset: i64,
        kind: PrecedenceKind,
    },
    /// Both tasks start at the same time.
    StartSynced { task_1: TaskId, task_2: TaskId },
    /// Both tasks end at the same time.
    EndSynced { task_1: TaskId, task_2: TaskId },
    /// One task completes before the other begins.
    DontOverlap { task_1: TaskId, task_2: TaskId },

    /// `task.start == value`
    StartAt { task: TaskId, value: i64 },
    /// `task.start > value`
    StartAfterStrict { task: TaskId, value: i64 },
    /// `task.start >= value`
    StartAfterLax { task: TaskId, value: i64 },
    /// `task.end == value`
    EndAt { task: TaskId, value: i64 },
    /// `task.end < value`
    EndBeforeStrict { task: TaskId, value: i64 },
    /// `task.end <= value`
    EndBeforeLax { task: TaskId, value: i64 },

    /// An optional task is scheduled whenever `condition` holds.
    ConditionSchedule { task: TaskId, condition: BoolExpr },
    /// Scheduling `task_1` forces the optional `task_2` to be scheduled.
    TasksDependency { task_1: TaskId, task_2: TaskId },

    /// Among optional `tasks`, schedule at least/at most/exactly `n`.
    ForceScheduleN {
        tasks: Vec<TaskId>,
        n: usize,
        kind: CardinalityKind,
    },
    /// Among `tasks`, at least/at most/exactly `n` lie within `intervals`.
    ScheduleNInIntervals {
        tasks: Vec<TaskId>,
        n: usize,
        intervals: Vec<TimeInterval>,
        kind: CardinalityKind,
        policy: IntervalPolicy,
    },
}

/// Which side of a task a bound constraint limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundSide {
    Lower,
    Upper,
}

/// A constraint on one or more tasks.
///
/// # Example
/// ```
/// use u_schedule_cp::cp::SchedulingContext;
/// use u_schedule_cp::models::{PrecedenceKind, Task, TaskConstraint};
///
/// let mut ctx = SchedulingContext::named("demo");
/// let a = ctx.add_task(Task::fixed_duration("a", 2)).unwrap();
/// let b = ctx.add_task(Task::fixed_duration("b", 3)).unwrap();
/// ctx.add_constraint(TaskConstraint::precedence(a, b, 1, PrecedenceKind::Strict))
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConstraint {
    /// Kind and parameters.
    pub kind: ConstraintKind,
    /// Whether the constraint may be excluded from the active model. Stored
    /// for collaborators; translation does not interpret it.
    pub optional: bool,
}

impl TaskConstraint {
    fn of(kind: ConstraintKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    /// Precedence with an offset and kind.
    pub fn precedence(before: TaskId, after: TaskId, offset: i64, kind: PrecedenceKind) -> Self {
        Self::of(ConstraintKind::Precedence {
            before,
            after,
            offset,
            kind,
        })
    }

    /// Zero-offset lax precedence.
    pub fn lax_precedence(before: TaskId, after: TaskId) -> Self {
        Self::precedence(before, after, 0, PrecedenceKind::Lax)
    }

    /// Start synchronization.
    pub fn start_synced(task_1: TaskId, task_2: TaskId) -> Self {
        Self::of(ConstraintKind::StartSynced { task_1, task_2 })
    }

    /// End synchronization.
    pub fn end_synced(task_1: TaskId, task_2: TaskId) -> Self {
        Self::of(ConstraintKind::EndSynced { task_1, task_2 })
    }

    /// Non-overlap.
    pub fn dont_overlap(task_1: TaskId, task_2: TaskId) -> Self {
        Self::of(ConstraintKind::DontOverlap { task_1, task_2 })
    }

    /// Fixes the start: `start == value`.
    pub fn start_at(task: TaskId, value: i64) -> Self {
        Self::of(ConstraintKind::StartAt { task, value })
    }

    /// `start > value`.
    pub fn start_after_strict(task: TaskId, value: i64) -> Self {
        Self::of(ConstraintKind::StartAfterStrict { task, value })
    }

    /// `start >= value`.
    pub fn start_after_lax(task: TaskId, value: i64) -> Self {
        Self::of(ConstraintKind::StartAfterLax { task, value })
    }

    /// Fixes the end: `end == value`.
    pub fn end_at(task: TaskId, value: i64) -> Self {
        Self::of(ConstraintKind::EndAt { task, value })
    }

    /// `end < value`.
    pub fn end_before_strict(task: TaskId, value: i64) -> Self {
        Self::of(ConstraintKind::EndBeforeStrict { task, value })
    }

    /// `end <= value`.
    pub fn end_before_lax(task: TaskId, value: i64) -> Self {
        Self::of(ConstraintKind::EndBeforeLax { task, value })
    }

    /// Schedules the optional `task` whenever `condition` holds.
    pub fn condition_schedule(task: TaskId, condition: BoolExpr) -> Self {
        Self::of(ConstraintKind::ConditionSchedule { task, condition })
    }

    /// Scheduling `task_1` forces the optional `task_2`.
    pub fn tasks_dependency(task_1: TaskId, task_2: TaskId) -> Self {
        Self::of(ConstraintKind::TasksDependency { task_1, task_2 })
    }

    /// Cardinality over the `scheduled` indicators of optional tasks.
    pub fn force_schedule_n(tasks: Vec<TaskId>, n: usize, kind: CardinalityKind) -> Self {
        Self::of(ConstraintKind::ForceScheduleN { tasks, n, kind })
    }

    /// Cardinality over tasks lying within `intervals`, using the
    /// conjunctive policy.
    pub fn schedule_n_in_intervals(
        tasks: Vec<TaskId>,
        n: usize,
        intervals: Vec<TimeInterval>,
        kind: CardinalityKind,
    ) -> Self {
        Self::of(ConstraintKind::ScheduleNInIntervals {
            tasks,
            n,
            intervals,
            kind,
            policy: IntervalPolicy::default(),
        })
    }

    /// Sets the interval-matching policy. Has no effect on other kinds.
    pub fn with_interval_policy(mut self, new_policy: IntervalPolicy) -> Self {
        if let ConstraintKind::ScheduleNInIntervals { policy, .. } = &mut self.kind {
            *policy = new_policy;
        }
        self
    }

    /// Marks the constraint itself as optional.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Name of the constraint kind, used in errors and log lines.
    pub fn label(&self) -> &'static str {
        match self.kind {
            ConstraintKind::Precedence { .. } => "TaskPrecedence",
            ConstraintKind::StartSynced { .. } => "TasksStartSynced",
            ConstraintKind::EndSynced { .. } => "TasksEndSynced",
            ConstraintKind::DontOverlap { .. } => "TasksDontOverlap",
            ConstraintKind::StartAt { .. } => "TaskStartAt",
            ConstraintKind::StartAfterStrict { .. } => "TaskStartAfterStrict",
            ConstraintKind::StartAfterLax { .. } => "TaskStartAfterLax",
            ConstraintKind::EndAt { .. } => "TaskEndAt",
            ConstraintKind::EndBeforeStrict { .. } => "TaskEndBeforeStrict",
            ConstraintKind::EndBeforeLax { .. } => "TaskEndBeforeLax",
            ConstraintKind::ConditionSchedule { .. } => "OptionalTaskConditionSchedule",
            ConstraintKind::TasksDependency { .. } => "OptionalTasksDependency",
            ConstraintKind::ForceScheduleN { .. } => "ForceScheduleNOptionalTasks",
            ConstraintKind::ScheduleNInIntervals { .. } => "ScheduleNTasksInTimeIntervals",
        }
    }

    /// Every task handle the constraint refers to, in parameter order.
    pub fn tasks(&self) -> Vec<TaskId> {
        match &self.kind {
            ConstraintKind::Precedence { before, after, .. } => vec![*before, *after],
            ConstraintKind::StartSynced { task_1, task_2 }
            | ConstraintKind::EndSynced { task_1, task_2 }
            | ConstraintKind::DontOverlap { task_1, task_2 }
            | ConstraintKind::TasksDependency { task_1, task_2 } => vec![*task_1, *task_2],
            ConstraintKind::StartAt { task, .. }
            | ConstraintKind::StartAfterStrict { task, .. }
            | ConstraintKind::StartAfterLax { task, .. }
            | ConstraintKind::EndAt { task, .. }
            | ConstraintKind::EndBeforeStrict { task, .. }
            | ConstraintKind::EndBeforeLax { task, .. }
            | ConstraintKind::ConditionSchedule { task, .. } => vec![*task],
            ConstraintKind::ForceScheduleN { tasks, .. }
            | ConstraintKind::ScheduleNInIntervals { tasks, .. } => tasks.clone(),
        }
    }

    /// Task whose bound flag this constraint sets once registered.
    pub(crate) fn bound_effect(&self) -> Option<(TaskId, BoundSide)> {
        match self.kind {
            ConstraintKind::StartAfterStrict { task, .. }
            | ConstraintKind::StartAfterLax { task, .. } => Some((task, BoundSide::Lower)),
            ConstraintKind::EndBeforeStrict { task, .. }
            | ConstraintKind::EndBeforeLax { task, .. } => Some((task, BoundSide::Upper)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_constraint() {
        let c = TaskConstraint::precedence(TaskId(0), TaskId(1), 2, PrecedenceKind::Tight);
        match c.kind {
            ConstraintKind::Precedence {
                before,
                after,
                offset,
                kind,
            } => {
                assert_eq!(before, TaskId(0));
                assert_eq!(after, TaskId(1));
                assert_eq!(offset, 2);
                assert_eq!(kind, PrecedenceKind::Tight);
            }
            _ => panic!("wrong variant"),
        }
        assert!(!c.optional);
    }

    #[test]
    fn test_lax_precedence_defaults() {
        let c = TaskConstraint::lax_precedence(TaskId(0), TaskId(1));
        match c.kind {
            ConstraintKind::Precedence { offset, kind, .. } => {
                assert_eq!(offset, 0);
                assert_eq!(kind, PrecedenceKind::Lax);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_precedence_kind_from_str() {
        assert_eq!("lax".parse::<PrecedenceKind>(), Ok(PrecedenceKind::Lax));
        assert_eq!("strict".parse::<PrecedenceKind>(), Ok(PrecedenceKind::Strict));
        assert_eq!("tight".parse::<PrecedenceKind>(), Ok(PrecedenceKind::Tight));
        let err = "loose".parse::<PrecedenceKind>().unwrap_err();
        assert!(err.is_parameter());
        assert!(err.to_string().contains("'loose'"));
    }

    #[test]
    fn test_kinds_from_json() {
        let kind: PrecedenceKind = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(kind, PrecedenceKind::Strict);
        let policy: IntervalPolicy = serde_json::from_str("\"per_interval\"").unwrap();
        assert_eq!(policy, IntervalPolicy::PerInterval);
        let err = serde_json::from_str::<PrecedenceKind>("\"sloppy\"").unwrap_err();
        assert!(err.to_string().contains("'sloppy'"), "{err}");
        assert!(err.to_string().contains("'lax', 'strict' or 'tight'"), "{err}");
        assert_eq!(serde_json::to_string(&PrecedenceKind::Tight).unwrap(), "\"tight\"");
    }

    #[test]
    fn test_interval_policy_builder() {
        let c = TaskConstraint::schedule_n_in_intervals(
            vec![TaskId(0)],
            1,
            vec![TimeInterval::new(0, 10)],
            CardinalityKind::Exact,
        );
        match &c.kind {
            ConstraintKind::ScheduleNInIntervals { policy, .. } => {
                assert_eq!(*policy, IntervalPolicy::Conjunctive);
            }
            _ => panic!("wrong variant"),
        }

        let c = c.with_interval_policy(IntervalPolicy::PerInterval);
        match &c.kind {
            ConstraintKind::ScheduleNInIntervals { policy, .. } => {
                assert_eq!(*policy, IntervalPolicy::PerInterval);
            }
            _ => panic!("wrong variant"),
        }

        // ignored elsewhere
        let p = TaskConstraint::start_at(TaskId(0), 1)
            .with_interval_policy(IntervalPolicy::PerInterval);
        assert_eq!(p, TaskConstraint::start_at(TaskId(0), 1));
    }

    #[test]
    fn test_optional_flag() {
        let c = TaskConstraint::dont_overlap(TaskId(0), TaskId(1)).with_optional(true);
        assert!(c.optional);
    }

    #[test]
    fn test_tasks_and_labels() {
        let c = TaskConstraint::force_schedule_n(
            vec![TaskId(2), TaskId(0), TaskId(1)],
            2,
            CardinalityKind::AtLeast,
        );
        assert_eq!(c.tasks(), vec![TaskId(2), TaskId(0), TaskId(1)]);
        assert_eq!(c.label(), "ForceScheduleNOptionalTasks");

        let c = TaskConstraint::end_synced(TaskId(4), TaskId(5));
        assert_eq!(c.tasks(), vec![TaskId(4), TaskId(5)]);
        assert_eq!(c.label(), "TasksEndSynced");
    }

    #[test]
    fn test_bound_effects() {
        let t = TaskId(0);
        assert_eq!(TaskConstraint::start_at(t, 1).bound_effect(), None);
        assert_eq!(TaskConstraint::end_at(t, 1).bound_effect(), None);
        assert_eq!(
            TaskConstraint::start_after_strict(t, 1).bound_effect(),
            Some((t, BoundSide::Lower))
        );
        assert_eq!(
            TaskConstraint::start_after_lax(t, 1).bound_effect(),
            Some((t, BoundSide::Lower))
        );
        assert_eq!(
            TaskConstraint::end_before_strict(t, 1).bound_effect(),
            Some((t, BoundSide::Upper))
        );
        assert_eq!(
            TaskConstraint::end_before_lax(t, 1).bound_effect(),
            Some((t, BoundSide::Upper))
        );
    }

    #[test]
    fn test_time_interval_disjoint() {
        let a = TimeInterval::new(0, 5);
        assert!(a.is_disjoint(&TimeInterval::new(6, 9)));
        assert!(!a.is_disjoint(&TimeInterval::new(5, 9)));
        assert_eq!(TimeInterval::from((1, 2)), TimeInterval::new(1, 2));
    }
}
