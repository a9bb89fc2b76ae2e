//! StratCon command line interface.
//!
//! Thin wrappers over the core's operations; no constraint logic lives
//! here. Every command that touches a project file goes through the
//! versioned load protocol, so legacy files are upgraded and repaired
//! before any edit sees them.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stratcon_core::{
    compile, count_equations, lint, remap_to_space, render, space, Comparison, ConstraintGroup,
    ConstraintSetup, ProjectState, VariableSpace,
};
use stratcon_io::{read_variable_columns, write_matrix};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stratcon",
    version,
    about = "Builds linear constraint sets over tagged forest-inventory variables"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lint an objective file and show what each tag position contains
    Inspect {
        /// Objective CSV whose header row names the variables
        objective: PathBuf,
        /// Character separating tags inside a variable name
        #[arg(short, long)]
        delimiter: String,
    },
    /// Create a project file around an objective file
    New {
        /// Project file to create
        project: PathBuf,
        /// Objective CSV whose header row names the variables
        #[arg(long)]
        objective: PathBuf,
        /// Character separating tags inside a variable name
        #[arg(short, long)]
        delimiter: String,
        /// Tag group names, comma separated, one per tag position
        #[arg(short, long, value_delimiter = ',')]
        groups: Vec<String>,
    },
    /// Show a project's variable space and setups
    Show {
        project: PathBuf,
    },
    /// Add an empty constraint setup
    AddSetup {
        project: PathBuf,
        /// Name prefix for the new setup
        prefix: String,
    },
    /// Remove a constraint setup
    RemoveSetup {
        project: PathBuf,
        prefix: String,
    },
    /// Change one tag group's selections or split flag in a setup
    Select {
        project: PathBuf,
        prefix: String,
        /// Tag group to edit
        #[arg(long)]
        group: String,
        /// Replace the left-side selection, comma separated
        #[arg(long, value_delimiter = ',')]
        left: Option<Vec<String>>,
        /// Replace the right-side selection, comma separated
        #[arg(long, value_delimiter = ',')]
        right: Option<Vec<String>>,
        /// Split compiled equations along this group
        #[arg(long, conflicts_with = "no_split")]
        split: bool,
        /// Stop splitting along this group
        #[arg(long)]
        no_split: bool,
    },
    /// Change a setup's name, comparison, coefficients, or constant
    Edit {
        project: PathBuf,
        prefix: String,
        /// New name prefix
        #[arg(long)]
        rename: Option<String>,
        /// New comparison operator: ">=", "<=" or "=="
        #[arg(long)]
        comparison: Option<String>,
        /// New coefficient for every left-side variable
        #[arg(long)]
        left_coef: Option<f64>,
        /// New coefficient for every right-side variable
        #[arg(long)]
        right_coef: Option<f64>,
        /// New right-side constant
        #[arg(long)]
        constant: Option<f64>,
    },
    /// Compile one setup and print its equations
    Preview {
        project: PathBuf,
        prefix: String,
        /// Print every equation instead of the first few
        #[arg(long)]
        full: bool,
    },
    /// Compile every setup and export the coefficient matrix
    Export {
        project: PathBuf,
        /// Matrix CSV to write
        output: PathBuf,
    },
    /// Replace the objective file behind a project, keeping its setups
    SwapObjective {
        project: PathBuf,
        /// Objective CSV whose header row names the variables
        #[arg(long)]
        objective: PathBuf,
        /// Character separating tags inside a variable name
        #[arg(short, long)]
        delimiter: String,
        /// Tag group names, comma separated, one per tag position
        #[arg(short, long, value_delimiter = ',')]
        groups: Vec<String>,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Inspect {
            objective,
            delimiter,
        } => run_inspect(&objective, &delimiter),
        Command::New {
            project,
            objective,
            delimiter,
            groups,
        } => run_new(&project, &objective, &delimiter, &groups),
        Command::Show { project } => run_show(&project),
        Command::AddSetup { project, prefix } => run_add_setup(&project, &prefix),
        Command::RemoveSetup { project, prefix } => run_remove_setup(&project, &prefix),
        Command::Select {
            project,
            prefix,
            group,
            left,
            right,
            split,
            no_split,
        } => run_select(&project, &prefix, &group, left, right, split, no_split),
        Command::Edit {
            project,
            prefix,
            rename,
            comparison,
            left_coef,
            right_coef,
            constant,
        } => run_edit(
            &project, &prefix, rename, comparison, left_coef, right_coef, constant,
        ),
        Command::Preview {
            project,
            prefix,
            full,
        } => run_preview(&project, &prefix, full),
        Command::Export { project, output } => run_export(&project, &output),
        Command::SwapObjective {
            project,
            objective,
            delimiter,
            groups,
        } => run_swap_objective(&project, &objective, &delimiter, &groups),
    }
}

/// Lints an objective file and builds its space, or explains why it can't.
fn build_space(
    objective: &Path,
    delimiter: &str,
    groups: &[String],
) -> Result<VariableSpace, Box<dyn Error>> {
    let raw_names = read_variable_columns(objective)?;
    let delimiter = lint::delimiter(delimiter)?;
    lint::variable_names(&raw_names, delimiter)?;
    lint::tag_group_names(groups)?;

    let positions = raw_names[0].split(delimiter).count();
    if groups.len() != positions {
        return Err(format!(
            "Variables have {positions} tag positions but {} group names were given",
            groups.len()
        )
        .into());
    }

    Ok(VariableSpace::build(&raw_names, delimiter, groups.to_vec()))
}

fn setup_index(state: &ProjectState, prefix: &str) -> Result<usize, Box<dyn Error>> {
    state
        .setups
        .iter()
        .position(|setup| setup.name_prefix == prefix)
        .ok_or_else(|| format!("No setup named \"{prefix}\"").into())
}

fn run_inspect(objective: &Path, delimiter: &str) -> Result<(), Box<dyn Error>> {
    let raw_names = read_variable_columns(objective)?;
    let delimiter = lint::delimiter(delimiter)?;
    lint::variable_names(&raw_names, delimiter)?;

    let positions = space::member_lists(&raw_names, delimiter);
    println!(
        "{} variables, {} tag positions",
        raw_names.len(),
        positions.len()
    );
    for (index, members) in positions.iter().enumerate() {
        println!(
            "  position {}: {} members: {}",
            index + 1,
            members.len(),
            render::trim_ellipsis_right(&members.join(", "), 60)
        );
    }
    Ok(())
}

fn run_new(
    project: &Path,
    objective: &Path,
    delimiter: &str,
    groups: &[String],
) -> Result<(), Box<dyn Error>> {
    let state = ProjectState::new(build_space(objective, delimiter, groups)?);
    state.save(project, true)?;
    println!(
        "Created {} with {} variables across {} tag groups",
        project.display(),
        state.variable_space.variables.len(),
        state.variable_space.group_count()
    );
    Ok(())
}

fn run_show(project: &Path) -> Result<(), Box<dyn Error>> {
    let state = ProjectState::load(project)?;
    let space = &state.variable_space;

    println!(
        "{} variables, delimiter {:?}",
        space.variables.len(),
        space.delimiter
    );
    for group in &space.tag_order {
        let members = space.members_of(group).unwrap_or_default();
        println!(
            "  {}: {}",
            group,
            render::trim_ellipsis_right(&members.join(", "), 60)
        );
    }

    if state.setups.is_empty() {
        println!("no setups");
        return Ok(());
    }
    println!("setups:");
    for setup in &state.setups {
        let splits = if setup.split_by.is_empty() {
            "-".to_owned()
        } else {
            setup.split_by.join(",")
        };
        println!(
            "  {:<32} {:<2}  split: {:<24} equations: {}",
            render::trim_ellipsis_right(&setup.name_prefix, 30),
            setup.comparison,
            render::trim_ellipsis_right(&splits, 24),
            count_equations(setup, space)
        );
    }
    Ok(())
}

fn run_add_setup(project: &Path, prefix: &str) -> Result<(), Box<dyn Error>> {
    let mut state = ProjectState::load(project)?;
    lint::constraint_name(prefix)?;

    let mut prefixes: Vec<String> = state
        .setups
        .iter()
        .map(|setup| setup.name_prefix.clone())
        .collect();
    prefixes.push(prefix.to_owned());
    lint::constraint_names(&prefixes)?;

    let setup = ConstraintSetup::empty(&state.variable_space).with_name_prefix(prefix);
    state.setups.push(setup);
    state.save(project, true)?;
    println!("Added setup \"{prefix}\"");
    Ok(())
}

fn run_remove_setup(project: &Path, prefix: &str) -> Result<(), Box<dyn Error>> {
    let mut state = ProjectState::load(project)?;
    let before = state.setups.len();
    state.setups.retain(|setup| setup.name_prefix != prefix);
    if state.setups.len() == before {
        return Err(format!("No setup named \"{prefix}\"").into());
    }
    state.save(project, true)?;
    println!("Removed setup \"{prefix}\"");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_select(
    project: &Path,
    prefix: &str,
    group: &str,
    left: Option<Vec<String>>,
    right: Option<Vec<String>>,
    split: bool,
    no_split: bool,
) -> Result<(), Box<dyn Error>> {
    if left.is_none() && right.is_none() && !split && !no_split {
        return Err("Nothing to change: pass --left, --right, --split or --no-split".into());
    }

    let mut state = ProjectState::load(project)?;
    let index = setup_index(&state, prefix)?;
    let space = &state.variable_space;

    let mut setup = state.setups[index].clone();
    if let Some(values) = left {
        setup = setup.with_left_selection(space, group, values)?;
    }
    if let Some(values) = right {
        setup = setup.with_right_selection(space, group, values)?;
    }
    if split {
        setup = setup.with_split(space, group, true)?;
    } else if no_split {
        setup = setup.with_split(space, group, false)?;
    }

    let equations = count_equations(&setup, space);
    state.setups[index] = setup;
    state.save(project, true)?;
    println!("\"{prefix}\" now compiles to {equations} equations");
    Ok(())
}

fn run_edit(
    project: &Path,
    prefix: &str,
    rename: Option<String>,
    comparison: Option<String>,
    left_coef: Option<f64>,
    right_coef: Option<f64>,
    constant: Option<f64>,
) -> Result<(), Box<dyn Error>> {
    if rename.is_none()
        && comparison.is_none()
        && left_coef.is_none()
        && right_coef.is_none()
        && constant.is_none()
    {
        return Err(
            "Nothing to change: pass --rename, --comparison, --left-coef, --right-coef or --constant"
                .into(),
        );
    }

    let mut state = ProjectState::load(project)?;
    let index = setup_index(&state, prefix)?;

    let mut setup = state.setups[index].clone();
    if let Some(name) = rename {
        lint::constraint_name(&name)?;
        let mut prefixes: Vec<String> = state
            .setups
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, s)| s.name_prefix.clone())
            .collect();
        prefixes.push(name.clone());
        lint::constraint_names(&prefixes)?;
        setup = setup.with_name_prefix(name);
    }
    if let Some(symbols) = comparison {
        setup = setup.with_comparison(symbols.parse::<Comparison>()?);
    }
    if left_coef.is_some() || right_coef.is_some() {
        let left = left_coef.unwrap_or(setup.left_coef);
        let right = right_coef.unwrap_or(setup.right_coef);
        setup = setup.with_coefficients(left, right);
    }
    if let Some(value) = constant {
        setup = setup.with_constant(value);
    }

    let name = setup.name_prefix.clone();
    state.setups[index] = setup;
    state.save(project, true)?;
    println!("Updated setup \"{name}\"");
    Ok(())
}

fn run_preview(project: &Path, prefix: &str, full: bool) -> Result<(), Box<dyn Error>> {
    let state = ProjectState::load(project)?;
    let index = setup_index(&state, prefix)?;
    let space = &state.variable_space;

    let group = compile(&state.setups[index], space);
    println!("{} equations", group.equations.len());
    if full {
        for eq in &group.equations {
            println!("{}", render::equation(eq, space.delimiter));
        }
    } else {
        println!("{}", render::group_preview(&group, space.delimiter));
    }
    Ok(())
}

fn run_export(project: &Path, output: &Path) -> Result<(), Box<dyn Error>> {
    let state = ProjectState::load(project)?;
    let prefixes: Vec<String> = state
        .setups
        .iter()
        .map(|setup| setup.name_prefix.clone())
        .collect();
    lint::constraint_names(&prefixes)?;

    let space = &state.variable_space;
    let groups: Vec<ConstraintGroup> = state
        .setups
        .iter()
        .map(|setup| compile(setup, space))
        .collect();
    let total: usize = groups.iter().map(|group| group.equations.len()).sum();

    write_matrix(output, &groups, space)?;
    println!(
        "Exported {} constraints over {} variables to {}",
        total,
        space.variables.len(),
        output.display()
    );
    Ok(())
}

fn run_swap_objective(
    project: &Path,
    objective: &Path,
    delimiter: &str,
    groups: &[String],
) -> Result<(), Box<dyn Error>> {
    let state = ProjectState::load(project)?;
    let new_space = build_space(objective, delimiter, groups)?;

    let remapped = remap_to_space(new_space, &state);
    remapped.save(project, true)?;
    println!(
        "Remapped {} setups onto {} variables",
        remapped.setups.len(),
        remapped.variable_space.variables.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_objective(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("objective.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "OAK_2020,OAK_2021,PINE_2020").unwrap();
        writeln!(file, "1.0,2.0,3.0").unwrap();
        path
    }

    fn write_replacement_objective(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("replacement.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "OAK_2020,OAK_2021,SPRUCE_2021").unwrap();
        writeln!(file, "4.0,5.0,6.0").unwrap();
        path
    }

    fn species_year() -> Vec<String> {
        vec!["species".to_owned(), "year".to_owned()]
    }

    #[test]
    fn test_new_select_export_workflow() {
        let dir = tempfile::TempDir::new().unwrap();
        let objective = write_objective(&dir);
        let project = dir.path().join("forest.cproj");
        let matrix = dir.path().join("matrix.csv");

        run_new(&project, &objective, "_", &species_year()).unwrap();
        run_add_setup(&project, "total_area").unwrap();
        run_select(
            &project,
            "total_area",
            "species",
            Some(vec!["OAK".to_owned(), "PINE".to_owned()]),
            None,
            false,
            false,
        )
        .unwrap();
        run_select(
            &project,
            "total_area",
            "year",
            Some(vec!["2020".to_owned(), "2021".to_owned()]),
            None,
            false,
            false,
        )
        .unwrap();
        run_export(&project, &matrix).unwrap();

        let written = std::fs::read_to_string(&matrix).unwrap();
        assert!(
            written.starts_with("constraint,OAK_2020,OAK_2021,PINE_2020,op,rhs"),
            "{written}"
        );
        assert!(written.contains("total_area,1,1,1,eq,0"), "{written}");
    }

    #[test]
    fn test_edit_changes_defaults_and_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let objective = write_objective(&dir);
        let project = dir.path().join("forest.cproj");

        run_new(&project, &objective, "_", &species_year()).unwrap();
        run_add_setup(&project, "area_cap").unwrap();
        run_edit(
            &project,
            "area_cap",
            None,
            Some("<=".to_owned()),
            Some(2.0),
            None,
            Some(50.0),
        )
        .unwrap();

        let state = ProjectState::load(&project).unwrap();
        assert_eq!(state.setups[0].comparison, Comparison::Le);
        assert_eq!(state.setups[0].left_coef, 2.0);
        assert_eq!(state.setups[0].right_coef, 1.0);
        assert_eq!(state.setups[0].constant, 50.0);
    }

    #[test]
    fn test_swap_objective_remaps_persisted_setups() {
        let dir = tempfile::TempDir::new().unwrap();
        let objective = write_objective(&dir);
        let project = dir.path().join("forest.cproj");

        run_new(&project, &objective, "_", &species_year()).unwrap();
        run_add_setup(&project, "total_area").unwrap();
        run_select(
            &project,
            "total_area",
            "species",
            Some(vec!["OAK".to_owned(), "PINE".to_owned()]),
            None,
            false,
            false,
        )
        .unwrap();

        let replacement = write_replacement_objective(&dir);
        run_swap_objective(&project, &replacement, "_", &species_year()).unwrap();

        let state = ProjectState::load(&project).unwrap();
        assert_eq!(state.setups.len(), 1);
        assert_eq!(state.setups[0].name_prefix, "total_area");
        assert_eq!(
            state.variable_space.members_of("species"),
            Some(&["OAK".to_owned(), "SPRUCE".to_owned()][..])
        );
        // PINE fell out of the replacement data, so the selection keeps only OAK.
        assert_eq!(
            state.setups[0].left_selection["species"],
            vec!["OAK".to_owned()]
        );
    }

    #[test]
    fn test_add_setup_rejects_duplicate_prefix() {
        let dir = tempfile::TempDir::new().unwrap();
        let objective = write_objective(&dir);
        let project = dir.path().join("forest.cproj");

        run_new(&project, &objective, "_", &species_year()).unwrap();
        run_add_setup(&project, "area_cap").unwrap();

        let err = run_add_setup(&project, "area_cap").unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");
    }

    #[test]
    fn test_build_space_rejects_wrong_group_count() {
        let dir = tempfile::TempDir::new().unwrap();
        let objective = write_objective(&dir);

        let err = build_space(&objective, "_", &["species".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("2 tag positions"), "{err}");
    }
}
