//! Scheduling domain models.
//!
//! Provides the entities constraints are stated over: tasks with
//! symbolic start/end/scheduled variables, and the closed catalog of
//! task constraints.
//!
//! # Constraint Catalog
//!
//! | Group | Kinds |
//! |-------|-------|
//! | Relational | `Precedence`, `StartSynced`, `EndSynced`, `DontOverlap` |
//! | Single-task bounds | `StartAt`, `StartAfterStrict`, `StartAfterLax`, `EndAt`, `EndBeforeStrict`, `EndBeforeLax` |
//! | Optional-task gating | `ConditionSchedule`, `TasksDependency` |
//! | Counting / selection | `ForceScheduleN`, `ScheduleNInIntervals` |

mod constraint;
mod task;

pub(crate) use constraint::BoundSide;
pub use constraint::{ConstraintKind, IntervalPolicy, PrecedenceKind, TaskConstraint, TimeInterval};
pub use task::{Task, TaskDuration, TaskId};
