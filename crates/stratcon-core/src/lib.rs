//! StratCon Core - variable space model and constraint compiler
//!
//! This crate provides the engine behind StratCon:
//! - The tagged variable space parsed from objective-file columns
//! - Lint checks for raw names, delimiters, and group names
//! - Constraint setups and their compilation into concrete equations
//! - Versioned project persistence with one-step migrations
//! - Repair passes reconciling setups with a changed variable space

pub mod compile;
pub mod equation;
pub mod lint;
pub mod project;
pub mod render;
pub mod repair;
pub mod setup;
pub mod space;

#[cfg(test)]
pub mod test_utils;

pub use compile::{compile, count_equations};
pub use equation::{ConstraintGroup, Equation, Term};
pub use lint::LintError;
pub use project::{LoadError, ProjectState, SaveError, SCHEMA_VERSION};
pub use repair::{prune_stale_selections, remap_to_space};
pub use setup::{
    Comparison, ConstraintSetup, ParseComparisonError, SelectionError, TagSelection,
};
pub use space::{Variable, VariableSpace};
