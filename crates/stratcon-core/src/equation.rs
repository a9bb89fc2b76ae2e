//! Compiled constraint output.
//!
//! These types are produced by [`crate::compile`] and consumed by previews
//! and exporters. They are never persisted; the project file stores only the
//! setups they were expanded from.

use crate::setup::Comparison;
use crate::space::Variable;

/// One weighted variable occurrence on one side of an equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub variable: Variable,
    pub coef: f64,
}

/// A single concrete (in)equality over variables that exist in the space.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    /// Name prefix shared with every sibling from the same setup.
    pub name_prefix: String,
    /// Delimiter-joined split values; empty when the setup splits nothing.
    pub name_suffix: String,
    /// Constant on the right side.
    pub constant: f64,
    pub comparison: Comparison,
    pub left: Vec<Term>,
    pub right: Vec<Term>,
}

impl Equation {
    /// Full equation name: the prefix, plus the suffix when one exists.
    pub fn name(&self, delimiter: char) -> String {
        if self.name_suffix.is_empty() {
            self.name_prefix.clone()
        } else {
            format!("{}{}{}", self.name_prefix, delimiter, self.name_suffix)
        }
    }
}

/// The compiled form of one setup: its equations plus the defaults they
/// were stamped from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintGroup {
    /// The owning setup's name prefix.
    pub group_name: String,
    pub equations: Vec<Equation>,
    /// Defaults carried over from the setup, kept alongside the equations
    /// so a front end can show how the group was derived.
    pub split_by: Vec<String>,
    pub comparison: Comparison,
    pub left_coef: f64,
    pub right_coef: f64,
}
