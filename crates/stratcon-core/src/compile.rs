//! Expansion of constraint setups into concrete equations.
//!
//! Compilation is a pure function of one setup and the variable space:
//!
//! 1. Expand each side's selections into candidate variables (cartesian
//!    product over the selected values, in tag order).
//! 2. Keep only candidates that exist in the space.
//! 3. Build one split axis per tag group: the union of both sides' selected
//!    values for split groups, a single wildcard otherwise.
//! 4. For every combination of axis values, partition the survivors into
//!    that equation's sides, skipping combinations nothing matched.
//!
//! Selections are sparse in the cartesian sense, so the candidate count can
//! be far larger than the variables that actually exist. Step 2 keeps the
//! rest of the pipeline proportional to real data.

use std::collections::HashSet;

use tracing::debug;

use crate::equation::{ConstraintGroup, Equation, Term};
use crate::setup::ConstraintSetup;
use crate::space::{Variable, VariableSpace};

/// Compiles one setup into its constraint group.
///
/// Deterministic for a given setup and space: candidates expand in tag
/// order with the first group varying slowest, and equations come out in
/// the same axis order.
pub fn compile(setup: &ConstraintSetup, space: &VariableSpace) -> ConstraintGroup {
    // Selected values per tag position. Groups the setup does not mention
    // select nothing.
    let left_axes: Vec<&[String]> = selection_axes(setup, space, Side::Left);
    let right_axes: Vec<&[String]> = selection_axes(setup, space, Side::Right);

    let exists: HashSet<&Variable> = space.variables.iter().collect();
    let left_candidates = existing_candidates(&left_axes, &exists);
    let right_candidates = existing_candidates(&right_axes, &exists);

    // One axis per tag group: for split groups the union of both sides'
    // values, first appearance left then right; otherwise a lone wildcard.
    let split_axes: Vec<Vec<Option<&str>>> = space
        .tag_order
        .iter()
        .enumerate()
        .map(|(position, group)| {
            if !setup.split_by.contains(group) {
                return vec![None];
            }
            let mut union: Vec<Option<&str>> = Vec::new();
            for value in left_axes[position].iter().chain(right_axes[position]) {
                if !union.contains(&Some(value.as_str())) {
                    union.push(Some(value.as_str()));
                }
            }
            union
        })
        .collect();

    let no_split = !space
        .tag_order
        .iter()
        .any(|group| setup.split_by.contains(group));
    let delimiter = space.delimiter.to_string();

    let mut equations = Vec::new();
    for bucket in product(&split_axes) {
        let left: Vec<Term> = bucket_terms(&left_candidates, &bucket, setup.left_coef);
        let right: Vec<Term> = bucket_terms(&right_candidates, &bucket, setup.right_coef);

        if left.is_empty() && right.is_empty() {
            continue;
        }

        let name_suffix = if no_split {
            String::new()
        } else {
            bucket
                .iter()
                .filter_map(|slot| *slot)
                .collect::<Vec<_>>()
                .join(delimiter.as_str())
        };

        equations.push(Equation {
            name_prefix: setup.name_prefix.clone(),
            name_suffix,
            constant: setup.constant,
            comparison: setup.comparison,
            left,
            right,
        });
    }

    debug!(
        event = "setup_compiled",
        setup = %setup.name_prefix,
        equations = equations.len(),
        left_candidates = left_candidates.len(),
        right_candidates = right_candidates.len(),
    );

    ConstraintGroup {
        group_name: setup.name_prefix.clone(),
        equations,
        split_by: setup.split_by.clone(),
        comparison: setup.comparison,
        left_coef: setup.left_coef,
        right_coef: setup.right_coef,
    }
}

/// Number of equations [`compile`] would emit for this setup.
///
/// Counted by actually compiling, so the number can never drift from the
/// compiler's output.
pub fn count_equations(setup: &ConstraintSetup, space: &VariableSpace) -> usize {
    compile(setup, space).equations.len()
}

enum Side {
    Left,
    Right,
}

fn selection_axes<'a>(
    setup: &'a ConstraintSetup,
    space: &VariableSpace,
    side: Side,
) -> Vec<&'a [String]> {
    let selection = match side {
        Side::Left => &setup.left_selection,
        Side::Right => &setup.right_selection,
    };
    space
        .tag_order
        .iter()
        .map(|group| selection.get(group).map(Vec::as_slice).unwrap_or_default())
        .collect()
}

fn existing_candidates(axes: &[&[String]], exists: &HashSet<&Variable>) -> Vec<Variable> {
    product(axes)
        .into_iter()
        .map(Variable::new)
        .filter(|candidate| exists.contains(candidate))
        .collect()
}

fn bucket_terms(candidates: &[Variable], bucket: &[Option<&str>], coef: f64) -> Vec<Term> {
    candidates
        .iter()
        .filter(|variable| selected_for_bucket(variable, bucket))
        .map(|variable| Term {
            variable: variable.clone(),
            coef,
        })
        .collect()
}

/// A variable belongs to a bucket when every non-wildcard slot matches its
/// tag at that position.
fn selected_for_bucket(variable: &Variable, bucket: &[Option<&str>]) -> bool {
    bucket
        .iter()
        .enumerate()
        .all(|(position, slot)| slot.map_or(true, |value| variable.tag(position) == Some(value)))
}

/// Cartesian product over the axes, first axis varying slowest.
///
/// Zero axes yield one empty combination; any empty axis yields none.
fn product<T, A>(axes: &[A]) -> Vec<Vec<T>>
where
    T: Clone,
    A: AsRef<[T]>,
{
    let mut combos: Vec<Vec<T>> = vec![Vec::new()];
    for axis in axes {
        let axis = axis.as_ref();
        let mut grown = Vec::with_capacity(combos.len() * axis.len());
        for combo in &combos {
            for value in axis {
                let mut next = combo.clone();
                next.push(value.clone());
                grown.push(next);
            }
        }
        combos = grown;
    }
    combos
}
