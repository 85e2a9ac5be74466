//! Task model.
//!
//! A task is a unit of work placed on the time line by the solver. It
//! exposes three symbolic variables (`start`, `end`, `scheduled`) that
//! constraints relate to each other, plus an optionality flag fixed at
//! creation.
//!
//! # Time Representation
//! Times are integer periods relative to t=0. The horizon, when the
//! context has one, bounds every task's end.
//!
//! # Reference
//! Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling",
//! optional interval variables

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConstraintError, Result};
use crate::formula::{BoolExpr, BoolVar, IntExpr, IntVar};

/// Handle to a task owned by a [`SchedulingContext`](crate::cp::SchedulingContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    /// Position of the task in its context.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a task's length relates its start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskDuration {
    /// `end == start` (milestone).
    Zero,
    /// `end == start + d`, `d > 0`.
    Fixed(i64),
    /// `end >= start`, optionally bounded in length.
    Variable {
        at_least: Option<i64>,
        at_most: Option<i64>,
    },
}

impl Default for TaskDuration {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl TaskDuration {
    /// Fixed-length task.
    pub fn fixed(duration: i64) -> Self {
        Self::Fixed(duration)
    }

    /// Variable-length task with no length bounds.
    pub fn unbounded() -> Self {
        Self::Variable {
            at_least: None,
            at_most: None,
        }
    }

    /// Variable-length task with optional length bounds.
    pub fn variable(at_least: Option<i64>, at_most: Option<i64>) -> Self {
        Self::Variable { at_least, at_most }
    }

    /// Checks the duration parameters of the task named `task`.
    pub(crate) fn validate(&self, task: &str) -> Result<()> {
        match *self {
            Self::Zero => Ok(()),
            Self::Fixed(d) if d <= 0 => Err(ConstraintError::parameter(
                task,
                format!("fixed duration must be a positive integer, got {d}"),
            )),
            Self::Fixed(_) => Ok(()),
            Self::Variable { at_least, at_most } => {
                for (label, bound) in [("length_at_least", at_least), ("length_at_most", at_most)] {
                    if let Some(b) = bound {
                        if b < 0 {
                            return Err(ConstraintError::parameter(
                                task,
                                format!("{label} must be non-negative, got {b}"),
                            ));
                        }
                    }
                }
                if let (Some(lo), Some(hi)) = (at_least, at_most) {
                    if lo > hi {
                        return Err(ConstraintError::parameter(
                            task,
                            format!("length_at_least ({lo}) exceeds length_at_most ({hi})"),
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

/// A task to be scheduled.
///
/// Build with [`Task::new`] and the `with_*` methods, then hand it to
/// [`SchedulingContext::add_task`](crate::cp::SchedulingContext::add_task),
/// which issues its [`TaskId`] and registers its own assertions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Task name, unique within its context.
    pub name: String,
    /// Length policy.
    pub duration: TaskDuration,
    /// Whether the solver may leave this task unscheduled.
    pub optional: bool,
    start: IntVar,
    end: IntVar,
    scheduled: BoolVar,
    lower_bounded: bool,
    upper_bounded: bool,
}

impl Task {
    /// Creates a mandatory, variable-length task.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            start: IntVar::new(format!("{name}_start")),
            end: IntVar::new(format!("{name}_end")),
            scheduled: BoolVar::new(format!("{name}_scheduled")),
            name,
            duration: TaskDuration::default(),
            optional: false,
            lower_bounded: false,
            upper_bounded: false,
        }
    }

    /// Zero-duration task (milestone).
    pub fn zero_duration(name: impl Into<String>) -> Self {
        Self::new(name).with_duration(TaskDuration::Zero)
    }

    /// Fixed-duration task.
    pub fn fixed_duration(name: impl Into<String>, duration: i64) -> Self {
        Self::new(name).with_duration(TaskDuration::fixed(duration))
    }

    /// Sets the length policy.
    pub fn with_duration(mut self, duration: TaskDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Marks the task optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Start time variable.
    pub fn start(&self) -> &IntVar {
        &self.start
    }

    /// End time variable.
    pub fn end(&self) -> &IntVar {
        &self.end
    }

    /// Scheduled indicator. Only meaningful for optional tasks.
    pub fn scheduled(&self) -> &BoolVar {
        &self.scheduled
    }

    /// Whether the task is actually executed: the `scheduled` variable for
    /// optional tasks, constant `true` for mandatory ones.
    pub fn presence(&self) -> BoolExpr {
        if self.optional {
            BoolExpr::var(self.scheduled.clone())
        } else {
            BoolExpr::TRUE
        }
    }

    /// Whether a start-after constraint applies to this task.
    pub fn lower_bounded(&self) -> bool {
        self.lower_bounded
    }

    /// Whether an end-before constraint applies to this task.
    pub fn upper_bounded(&self) -> bool {
        self.upper_bounded
    }

    pub(crate) fn mark_lower_bounded(&mut self) {
        self.lower_bounded = true;
    }

    pub(crate) fn mark_upper_bounded(&mut self) {
        self.upper_bounded = true;
    }

    /// The task's own assertions: non-negative start, the duration
    /// relation and, with a horizon, `end <= horizon`. Together they
    /// guarantee `end >= start`.
    pub(crate) fn assertions(&self, horizon: Option<i64>) -> Vec<BoolExpr> {
        let start = || IntExpr::var(self.start.clone());
        let end = || IntExpr::var(self.end.clone());

        let mut out = vec![start().ge(0)];
        match self.duration {
            TaskDuration::Zero => out.push(end().equals(start())),
            TaskDuration::Fixed(d) => out.push(end().equals(start().plus(d))),
            TaskDuration::Variable { at_least, at_most } => {
                out.push(end().ge(start()));
                if let Some(lo) = at_least {
                    out.push(end().ge(start().plus(lo)));
                }
                if let Some(hi) = at_most {
                    out.push(end().le(start().plus(hi)));
                }
            }
        }
        if let Some(h) = horizon {
            out.push(end().le(h));
        }
        out
    }
}
