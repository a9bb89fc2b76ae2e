//! Constraint setups: the compact, editable specification of one
//! constraint family.
//!
//! A setup holds what the operator chose, not what the compiler produced.
//! Equations are expanded from it on demand by [`crate::compile`], so edits
//! here never have to be reconciled against stored output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::space::VariableSpace;

/// Comparison operator between the two sides of an equation.
///
/// # Example
///
/// ```
/// use stratcon_core::Comparison;
///
/// let comp: Comparison = ">=".parse().unwrap();
/// assert_eq!(comp, Comparison::Ge);
/// assert_eq!(comp.export_name(), "ge");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Left side at least the right side.
    #[serde(rename = ">=")]
    Ge,
    /// Left side at most the right side.
    #[serde(rename = "<=")]
    Le,
    /// Both sides equal.
    #[serde(rename = "==")]
    Eq,
}

impl Comparison {
    /// The symbol form used in rendered equations and project files.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
        }
    }

    /// The lowercase name used in exported matrices.
    pub fn export_name(self) -> &'static str {
        match self {
            Comparison::Ge => "ge",
            Comparison::Le => "le",
            Comparison::Eq => "eq",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error parsing a comparison from its symbol form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown comparison \"{0}\". Expected \">=\", \"<=\" or \"==\"")]
pub struct ParseComparisonError(pub String);

impl FromStr for Comparison {
    type Err = ParseComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">=" => Ok(Comparison::Ge),
            "<=" => Ok(Comparison::Le),
            "==" => Ok(Comparison::Eq),
            other => Err(ParseComparisonError(other.to_owned())),
        }
    }
}

/// Selected tag values per group, for one side of a setup.
pub type TagSelection = BTreeMap<String, Vec<String>>;

/// Rejected setup edit: the group or value does not exist in the current
/// variable space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The named tag group is not part of the space.
    #[error("No tag group named \"{0}\" in the current variable space")]
    UnknownGroup(String),

    /// The value is not a member of the named group.
    #[error("\"{value}\" is not a member of tag group \"{group}\"")]
    NotAMember { group: String, value: String },
}

/// The compact, operator-editable specification of one constraint family.
///
/// Every edit goes through a `with_*` method that validates against the
/// variable space and returns the updated setup, so a stored setup can only
/// reference groups and values that existed at edit time. Values that later
/// fall out of the space are handled by [`crate::repair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSetup {
    /// Leading part of every compiled equation name.
    pub name_prefix: String,
    /// Tag groups along which compilation splits into separate equations.
    pub split_by: Vec<String>,
    /// Comparison stamped onto every compiled equation.
    pub comparison: Comparison,
    /// Coefficient applied to every left-side variable.
    pub left_coef: f64,
    /// Coefficient applied to every right-side variable.
    pub right_coef: f64,
    /// Constant added to the right side.
    pub constant: f64,
    /// Selected tag values per group for the left side.
    pub left_selection: TagSelection,
    /// Selected tag values per group for the right side.
    pub right_selection: TagSelection,
}

impl ConstraintSetup {
    /// Creates a setup with nothing selected, named `unnamed`.
    ///
    /// Both selections carry one entry per tag group of the space, each
    /// empty. Compiling it yields zero equations.
    pub fn empty(space: &VariableSpace) -> ConstraintSetup {
        let blank: TagSelection = space
            .tag_order
            .iter()
            .map(|group| (group.clone(), Vec::new()))
            .collect();

        ConstraintSetup {
            name_prefix: "unnamed".to_owned(),
            split_by: Vec::new(),
            comparison: Comparison::Eq,
            left_coef: 1.0,
            right_coef: 1.0,
            constant: 0.0,
            left_selection: blank.clone(),
            right_selection: blank,
        }
    }

    /// Creates a setup with every member selected on both sides and every
    /// group split, with non-trivial defaults throughout.
    ///
    /// Compiling it touches the whole space, which makes it a convenient
    /// smoke fixture for demos and tests.
    pub fn full(space: &VariableSpace) -> ConstraintSetup {
        let everything: TagSelection = space
            .tag_order
            .iter()
            .map(|group| {
                let members = space.members_of(group).unwrap_or(&[]).to_vec();
                (group.clone(), members)
            })
            .collect();

        ConstraintSetup {
            name_prefix: "unnamed_full".to_owned(),
            split_by: space.tag_order.clone(),
            comparison: Comparison::Eq,
            left_coef: 2.0,
            right_coef: 1.0,
            constant: 10.0,
            left_selection: everything.clone(),
            right_selection: everything,
        }
    }

    /// Returns the setup with a new name prefix.
    ///
    /// The prefix is not checked here; run it through
    /// [`crate::lint::constraint_name`] at the input boundary.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> ConstraintSetup {
        self.name_prefix = prefix.into();
        self
    }

    /// Returns the setup with a new comparison operator.
    pub fn with_comparison(mut self, comparison: Comparison) -> ConstraintSetup {
        self.comparison = comparison;
        self
    }

    /// Returns the setup with new side coefficients.
    pub fn with_coefficients(mut self, left: f64, right: f64) -> ConstraintSetup {
        self.left_coef = left;
        self.right_coef = right;
        self
    }

    /// Returns the setup with a new right-side constant.
    pub fn with_constant(mut self, constant: f64) -> ConstraintSetup {
        self.constant = constant;
        self
    }

    /// Replaces one group's selected values on the left side.
    ///
    /// Fails if the group or any value is unknown to the space. Duplicate
    /// values collapse, keeping first appearance order.
    pub fn with_left_selection(
        mut self,
        space: &VariableSpace,
        group: &str,
        values: Vec<String>,
    ) -> Result<ConstraintSetup, SelectionError> {
        let values = checked_values(space, group, values)?;
        self.left_selection.insert(group.to_owned(), values);
        Ok(self)
    }

    /// Replaces one group's selected values on the right side.
    pub fn with_right_selection(
        mut self,
        space: &VariableSpace,
        group: &str,
        values: Vec<String>,
    ) -> Result<ConstraintSetup, SelectionError> {
        let values = checked_values(space, group, values)?;
        self.right_selection.insert(group.to_owned(), values);
        Ok(self)
    }

    /// Adds or removes one tag group from the split set.
    ///
    /// Newly split groups go to the end of the set; the split order itself
    /// does not affect compilation, which always works in tag order.
    pub fn with_split(
        mut self,
        space: &VariableSpace,
        group: &str,
        split: bool,
    ) -> Result<ConstraintSetup, SelectionError> {
        if !space.tag_order.iter().any(|g| g == group) {
            return Err(SelectionError::UnknownGroup(group.to_owned()));
        }
        self.split_by.retain(|g| g != group);
        if split {
            self.split_by.push(group.to_owned());
        }
        Ok(self)
    }
}

fn checked_values(
    space: &VariableSpace,
    group: &str,
    values: Vec<String>,
) -> Result<Vec<String>, SelectionError> {
    let Some(members) = space.members_of(group) else {
        return Err(SelectionError::UnknownGroup(group.to_owned()));
    };

    let mut checked: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !members.contains(&value) {
            return Err(SelectionError::NotAMember {
                group: group.to_owned(),
                value,
            });
        }
        if !checked.contains(&value) {
            checked.push(value);
        }
    }
    Ok(checked)
}
