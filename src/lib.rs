//! Constraint-translation layer for scheduling problems.
//!
//! Turns scheduling relationships between tasks into formulas over
//! per-task symbolic variables, ready to hand to an external constraint
//! solver. Optional tasks are handled through applicability guards and
//! selection problems through pseudo-boolean cardinality formulas.
//!
//! # Modules
//!
//! - **`formula`**: Symbolic variables, integer/boolean formulas, SMT-LIB
//!   rendering, valuation checking
//! - **`models`**: Domain types: `Task`, `TaskConstraint`, kind enums
//! - **`cp`**: `SchedulingContext`, which owns tasks and the append-only
//!   assertion set and registers constraints
//! - **`validation`**: Parameter and precondition checks
//! - **`error`**: `ConstraintError` and the crate `Result`
//!
//! # Architecture
//!
//! Registration is all-or-nothing: a constraint is validated and
//! translated before anything is appended. This crate never searches for
//! or ranks solutions; the assertion set is the whole output.
//!
//! # References
//!
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Barrett et al. (2017), "The SMT-LIB Standard, Version 2.6"

pub mod cp;
pub mod error;
pub mod formula;
pub mod models;
pub mod validation;

pub use error::{ConstraintError, Result};
