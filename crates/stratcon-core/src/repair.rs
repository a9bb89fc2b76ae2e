//! Repair passes reconciling setups with their variable space.
//!
//! Two situations leave a project's setups pointing at values the space
//! cannot back: a project file edited or corrupted outside the tool, and an
//! objective swap that replaced the space wholesale. Both passes here are
//! pure transformations; the caller decides what to do with the result.
//!
//! Neither pass guarantees a valid state from garbage input. They polish
//! what they know how to polish, nothing more.

use tracing::{debug, info};

use crate::project::ProjectState;
use crate::setup::{ConstraintSetup, TagSelection};
use crate::space::VariableSpace;

/// Drops selected values that are not members of their tag group.
///
/// Also normalizes each selection's key set to exactly the space's tag
/// order: missing groups become empty selections, unknown groups disappear.
/// Runs automatically at the end of [`ProjectState::load`].
pub fn prune_stale_selections(state: &ProjectState) -> ProjectState {
    let space = &state.variable_space;

    let setups: Vec<ConstraintSetup> = state
        .setups
        .iter()
        .map(|setup| {
            let mut pruned = setup.clone();
            pruned.left_selection = prune_selection(&setup.left_selection, space);
            pruned.right_selection = prune_selection(&setup.right_selection, space);
            pruned
        })
        .collect();

    let removed = selection_size(&state.setups) - selection_size(&setups);
    if removed > 0 {
        debug!(event = "stale_selections_pruned", removed);
    }

    ProjectState {
        variable_space: space.clone(),
        setups,
        schema_version: state.schema_version,
    }
}

/// Rebuilds the project around a replacement variable space.
///
/// Selections keep only values that are members of the matching group in
/// the new space; groups new to the space start unselected; split sets drop
/// groups the new space does not have. Name prefixes, comparisons, and
/// coefficients carry over untouched.
pub fn remap_to_space(new_space: VariableSpace, state: &ProjectState) -> ProjectState {
    let setups: Vec<ConstraintSetup> = state
        .setups
        .iter()
        .map(|setup| remap_setup(setup, &new_space))
        .collect();

    info!(
        event = "project_remapped",
        setups = setups.len(),
        variables = new_space.variables.len(),
        groups = new_space.group_count(),
    );

    ProjectState {
        variable_space: new_space,
        setups,
        schema_version: state.schema_version,
    }
}

fn remap_setup(setup: &ConstraintSetup, new_space: &VariableSpace) -> ConstraintSetup {
    let split_by = setup
        .split_by
        .iter()
        .filter(|group| new_space.tag_order.contains(group))
        .cloned()
        .collect();

    ConstraintSetup {
        name_prefix: setup.name_prefix.clone(),
        split_by,
        comparison: setup.comparison,
        left_coef: setup.left_coef,
        right_coef: setup.right_coef,
        constant: setup.constant,
        left_selection: prune_selection(&setup.left_selection, new_space),
        right_selection: prune_selection(&setup.right_selection, new_space),
    }
}

/// Keeps only values still backed by their group, keyed exactly by the
/// space's tag order. Serves both passes: pruning against the current space
/// and remapping onto a new one are the same membership filter.
fn prune_selection(selection: &TagSelection, space: &VariableSpace) -> TagSelection {
    space
        .tag_order
        .iter()
        .map(|group| {
            let members = space.members_of(group).unwrap_or_default();
            let values = selection
                .get(group)
                .map(|values| {
                    values
                        .iter()
                        .filter(|value| members.contains(value))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            (group.clone(), values)
        })
        .collect()
}

fn selection_size(setups: &[ConstraintSetup]) -> usize {
    setups
        .iter()
        .flat_map(|setup| {
            setup
                .left_selection
                .values()
                .chain(setup.right_selection.values())
        })
        .map(Vec::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mini_state, names};

    #[test]
    fn test_prune_drops_values_outside_the_space_on_both_sides() {
        let mut state = mini_state();
        state.setups[0]
            .left_selection
            .insert("species".to_owned(), names(&["OAK", "BIRCH"]));
        state.setups[0]
            .right_selection
            .insert("species".to_owned(), names(&["BIRCH", "OAK"]));

        let pruned = prune_stale_selections(&state);
        let setup = &pruned.setups[0];
        assert_eq!(setup.left_selection.get("species").unwrap(), &names(&["OAK"]));
        assert_eq!(setup.right_selection.get("species").unwrap(), &names(&["OAK"]));

        // Everything the space still backs is untouched.
        assert_eq!(setup.left_selection.get("year"), state.setups[0].left_selection.get("year"));
        assert_eq!(setup.name_prefix, state.setups[0].name_prefix);
    }

    #[test]
    fn test_prune_normalizes_selection_keys_to_tag_order() {
        let mut state = mini_state();
        state.setups[0].left_selection.remove("year");
        state.setups[0]
            .left_selection
            .insert("region".to_owned(), names(&["north"]));

        let pruned = prune_stale_selections(&state);
        let keys: Vec<&String> = pruned.setups[0].left_selection.keys().collect();
        assert_eq!(keys, vec!["species", "year"]);
        assert!(pruned.setups[0].left_selection.get("year").unwrap().is_empty());
    }

    #[test]
    fn test_prune_leaves_valid_state_untouched() {
        let state = mini_state();
        assert_eq!(prune_stale_selections(&state), state);
    }

    #[test]
    fn test_remap_keeps_surviving_values_only() {
        let state = mini_state();
        // New objective: PINE is gone, SPRUCE appeared.
        let new_space = VariableSpace::build(
            &names(&["OAK_2020", "OAK_2021", "SPRUCE_2021"]),
            '_',
            names(&["species", "year"]),
        );

        let remapped = remap_to_space(new_space, &state);
        let selection = &remapped.setups[0].left_selection;
        assert_eq!(selection.get("species").unwrap(), &names(&["OAK"]));
        assert_eq!(selection.get("year").unwrap(), &names(&["2020", "2021"]));
    }

    #[test]
    fn test_remap_drops_vanished_groups_and_adds_new_ones_unselected() {
        let mut state = mini_state();
        state.setups[0].split_by = vec!["species".to_owned(), "year".to_owned()];

        // Species axis disappears, a management axis appears.
        let new_space = VariableSpace::build(
            &names(&["2020_NM", "2021_PLSQ"]),
            '_',
            names(&["year", "mng"]),
        );

        let remapped = remap_to_space(new_space, &state);
        let setup = &remapped.setups[0];
        assert_eq!(setup.split_by, vec!["year"]);
        let keys: Vec<&String> = setup.left_selection.keys().collect();
        assert_eq!(keys, vec!["mng", "year"]);
        assert!(setup.left_selection.get("mng").unwrap().is_empty());
    }

    #[test]
    fn test_remap_preserves_defaults() {
        let state = mini_state();
        let new_space = state.variable_space.clone();

        let remapped = remap_to_space(new_space, &state);
        let before = &state.setups[0];
        let after = &remapped.setups[0];
        assert_eq!(after.name_prefix, before.name_prefix);
        assert_eq!(after.comparison, before.comparison);
        assert_eq!(after.left_coef, before.left_coef);
        assert_eq!(after.right_coef, before.right_coef);
        assert_eq!(after.constant, before.constant);
    }

    #[test]
    fn test_remap_onto_identical_space_is_identity() {
        let state = mini_state();
        let remapped = remap_to_space(state.variable_space.clone(), &state);
        assert_eq!(remapped, state);
    }
}
