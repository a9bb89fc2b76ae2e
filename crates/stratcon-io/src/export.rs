//! Solver-ready matrix export of compiled constraint groups.

use std::collections::HashMap;
use std::path::Path;

use stratcon_core::{ConstraintGroup, Variable, VariableSpace};
use tracing::info;

use crate::IoError;

/// Writes one coefficient row per compiled equation.
///
/// Header: `constraint`, one column per variable in space order, `op`,
/// `rhs`. A cell holds the variable's left-side coefficient sum minus its
/// right-side sum, so each row reads as a single left-hand expression
/// against the constant. Absent variables get an explicit 0.
pub fn write_matrix(
    path: impl AsRef<Path>,
    groups: &[ConstraintGroup],
    space: &VariableSpace,
) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path.as_ref()).map_err(IoError::Write)?;

    let mut header = Vec::with_capacity(space.variables.len() + 3);
    header.push("constraint".to_owned());
    header.extend(space.variables.iter().map(|v| v.name(space.delimiter)));
    header.push("op".to_owned());
    header.push("rhs".to_owned());
    writer.write_record(&header).map_err(IoError::Write)?;

    let column: HashMap<&Variable, usize> = space
        .variables
        .iter()
        .enumerate()
        .map(|(index, variable)| (variable, index))
        .collect();

    let mut rows = 0usize;
    for group in groups {
        for eq in &group.equations {
            let mut coefs = vec![0.0_f64; space.variables.len()];
            // Compiled equations only reference variables of this space;
            // terms from a mismatched space are silently left out.
            for term in &eq.left {
                if let Some(&index) = column.get(&term.variable) {
                    coefs[index] += term.coef;
                }
            }
            for term in &eq.right {
                if let Some(&index) = column.get(&term.variable) {
                    coefs[index] -= term.coef;
                }
            }

            let mut record = Vec::with_capacity(coefs.len() + 3);
            record.push(eq.name(space.delimiter));
            record.extend(coefs.iter().map(f64::to_string));
            record.push(eq.comparison.export_name().to_owned());
            record.push(eq.constant.to_string());
            writer.write_record(&record).map_err(IoError::Write)?;
            rows += 1;
        }
    }

    writer.flush().map_err(IoError::Flush)?;
    info!(
        event = "matrix_exported",
        path = %path.as_ref().display(),
        constraints = rows,
        variables = space.variables.len(),
    );
    Ok(())
}
