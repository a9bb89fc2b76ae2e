//! Shared fixtures for stratcon-core tests.

use crate::project::ProjectState;
use crate::setup::ConstraintSetup;
use crate::space::VariableSpace;

/// Converts string literals into owned names.
pub fn names(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

/// Columns of a miniature objective file: two species by two years, with
/// PINE_2021 missing.
pub fn mini_names() -> Vec<String> {
    names(&["OAK_2020", "OAK_2021", "PINE_2020"])
}

/// The space built from [`mini_names`].
pub fn mini_space() -> VariableSpace {
    VariableSpace::build(&mini_names(), '_', names(&["species", "year"]))
}

/// A project around [`mini_space`] with one setup selecting most of it.
pub fn mini_state() -> ProjectState {
    let space = mini_space();
    let setup = ConstraintSetup::empty(&space)
        .with_name_prefix("total_area")
        .with_left_selection(&space, "species", names(&["OAK", "PINE"]))
        .unwrap()
        .with_left_selection(&space, "year", names(&["2020", "2021"]))
        .unwrap()
        .with_right_selection(&space, "species", names(&["OAK"]))
        .unwrap()
        .with_right_selection(&space, "year", names(&["2020"]))
        .unwrap();

    let mut state = ProjectState::new(space);
    state.setups.push(setup);
    state
}

/// Columns shaped like the forest objective files the tool targets:
/// forest type, period, management regime. A few grid combinations are
/// deliberately absent.
pub fn forest_names() -> Vec<String> {
    names(&[
        "167N_2021_NM",
        "167N_2021_PLSQ",
        "167N_2021_THNB",
        "167N_2025_NM",
        "167N_2025_PLSQ",
        "167N_2030_NM",
        "167N_2030_PLSQ",
        "167N_2030_THNB",
        "167S_2021_NM",
        "167S_2021_PLSQ",
        "167S_2021_THNB",
        "167S_2025_NM",
        "167S_2025_PLSQ",
        "167S_2025_THNB",
        "167S_2030_NM",
    ])
}

/// The space built from [`forest_names`].
pub fn forest_space() -> VariableSpace {
    VariableSpace::build(&forest_names(), '_', names(&["for_type", "year", "mng"]))
}
