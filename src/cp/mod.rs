//! Scheduling context and constraint registration.
//!
//! The context owns tasks, registered constraints and the append-only
//! [`AssertionSet`]. Registering a constraint validates it, translates it
//! into formulas and only then appends them, so a failing call leaves the
//! context as it was. The collected assertions are handed as-is to an
//! external solver backend; nothing here searches.
//!
//! # Example
//! ```
//! use u_schedule_cp::cp::{ContextConfig, SchedulingContext};
//! use u_schedule_cp::formula::CardinalityKind;
//! use u_schedule_cp::models::{Task, TaskConstraint};
//!
//! let mut ctx = SchedulingContext::new(ContextConfig::new("demo").with_horizon(20)).unwrap();
//! let a = ctx.add_task(Task::fixed_duration("a", 3).optional()).unwrap();
//! let b = ctx.add_task(Task::fixed_duration("b", 2).optional()).unwrap();
//! ctx.add_constraint(TaskConstraint::dont_overlap(a, b)).unwrap();
//! ctx.add_constraint(TaskConstraint::force_schedule_n(vec![a, b], 1, CardinalityKind::AtLeast))
//!     .unwrap();
//! assert!(!ctx.assertions().is_empty());
//! ```
//!
//! # Reference
//! Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"

mod assertions;
mod gating;
mod translate;

pub use assertions::{Assertion, AssertionOrigin, AssertionSet};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ConstraintError, Result};
use crate::formula::{BoolExpr, BoolVar};
use crate::models::{BoundSide, Task, TaskConstraint, TaskId};
use crate::validation::{validate_constraint, validate_horizon};
use translate::{translate, Translation};

/// Handle to a constraint registered in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {
    /// Position of the constraint in its context.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Context configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Problem name, used in log lines and errors.
    pub name: String,
    /// Upper bound on every task's end. `None` = unbounded.
    pub horizon: Option<i64>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name: "scheduling".into(),
            horizon: None,
        }
    }
}

impl ContextConfig {
    /// Creates a configuration without horizon.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the horizon.
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = Some(horizon);
        self
    }
}

/// A constraint together with what it contributed.
#[derive(Debug, Clone)]
pub struct RegisteredConstraint {
    pub id: ConstraintId,
    pub constraint: TaskConstraint,
    /// Formulas appended to the assertion set, in order.
    pub formulas: Vec<BoolExpr>,
    /// Fresh indicators introduced by the translation.
    pub indicators: Vec<BoolVar>,
}

/// Owner of tasks, constraints and the assertion set of one problem.
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    config: ContextConfig,
    tasks: Vec<Task>,
    task_names: HashMap<String, TaskId>,
    constraints: Vec<RegisteredConstraint>,
    assertions: AssertionSet,
    /// Counts translations, including unregistered ones from `formula_of`.
    scopes: usize,
}

impl SchedulingContext {
    /// Creates a context, validating the configuration.
    pub fn new(config: ContextConfig) -> Result<Self> {
        validate_horizon(&config.name, config.horizon)?;
        debug!(
            "new scheduling context '{}' (horizon: {:?})",
            config.name, config.horizon
        );
        Ok(Self::from_config(config))
    }

    /// Creates a context without horizon.
    pub fn named(name: impl Into<String>) -> Self {
        Self::from_config(ContextConfig::new(name))
    }

    fn from_config(config: ContextConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
            task_names: HashMap::new(),
            constraints: Vec::new(),
            assertions: AssertionSet::new(),
            scopes: 0,
        }
    }

    /// Configuration the context was built from.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Problem name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Upper bound on task ends, if any.
    pub fn horizon(&self) -> Option<i64> {
        self.config.horizon
    }

    /// Adds a task and registers its own assertions.
    ///
    /// Fails on a duplicate name or invalid duration parameters.
    pub fn add_task(&mut self, task: Task) -> Result<TaskId> {
        if self.task_names.contains_key(&task.name) {
            return Err(ConstraintError::DuplicateName(task.name));
        }
        task.duration.validate(&task.name)?;

        let id = TaskId(self.tasks.len());
        let own = task.assertions(self.config.horizon);
        debug!(
            "{}: task '{}' {} ({} assertion(s), optional: {})",
            self.config.name,
            task.name,
            id,
            own.len(),
            task.optional
        );
        for formula in own {
            trace!("  {formula}");
            self.assertions.register(AssertionOrigin::Task(id), formula);
        }
        self.task_names.insert(task.name.clone(), id);
        self.tasks.push(task);
        Ok(id)
    }

    /// Task by handle.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    /// Handle of the task with the given name.
    pub fn task_id(&self, name: &str) -> Option<TaskId> {
        self.task_names.get(name).copied()
    }

    /// All tasks in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn next_scope(&mut self) -> String {
        let scope = format!("s{}", self.scopes);
        self.scopes += 1;
        scope
    }

    fn prepare(&mut self, constraint: &TaskConstraint) -> Result<Translation> {
        validate_constraint(&self.tasks, constraint)?;
        let scope = self.next_scope();
        translate(&self.tasks, &scope, constraint)
    }

    /// Validates, translates and registers a constraint.
    ///
    /// Nothing is appended unless every step succeeds.
    pub fn add_constraint(&mut self, constraint: TaskConstraint) -> Result<ConstraintId> {
        let Translation {
            formulas,
            indicators,
        } = self.prepare(&constraint)?;

        let id = ConstraintId(self.constraints.len());
        debug!(
            "{}: {} {} ({} assertion(s){})",
            self.config.name,
            constraint.label(),
            id,
            formulas.len(),
            if constraint.optional { ", optional" } else { "" }
        );
        for formula in &formulas {
            trace!("  {formula}");
            self.assertions
                .register(AssertionOrigin::Constraint(id), formula.clone());
        }

        if let Some((task, side)) = constraint.bound_effect() {
            if let Some(task) = self.tasks.get_mut(task.index()) {
                match side {
                    BoundSide::Lower => task.mark_lower_bounded(),
                    BoundSide::Upper => task.mark_upper_bounded(),
                }
            }
        }

        self.constraints.push(RegisteredConstraint {
            id,
            constraint,
            formulas,
            indicators,
        });
        Ok(id)
    }

    /// Translates a constraint into a single formula without registering
    /// it, for use inside boolean combinations.
    ///
    /// Bound flags are not touched. Fresh indicators still get names
    /// unique within this context.
    pub fn formula_of(&mut self, constraint: &TaskConstraint) -> Result<BoolExpr> {
        let translation = self.prepare(constraint)?;
        Ok(BoolExpr::and(translation.formulas))
    }

    /// Registers a caller-built formula.
    pub fn add_formula(&mut self, formula: BoolExpr) {
        debug!("{}: formula assertion", self.config.name);
        trace!("  {formula}");
        self.assertions.register(AssertionOrigin::Formula, formula);
    }

    /// Registered constraint by handle.
    pub fn constraint(&self, id: ConstraintId) -> Option<&RegisteredConstraint> {
        self.constraints.get(id.index())
    }

    /// All registered constraints in registration order.
    pub fn constraints(&self) -> &[RegisteredConstraint] {
        &self.constraints
    }

    /// The committed assertions.
    pub fn assertions(&self) -> &AssertionSet {
        &self.assertions
    }
}
