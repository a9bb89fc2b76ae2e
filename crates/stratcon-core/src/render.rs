//! Plain-text rendering of compiled equations.
//!
//! Previews only. Exports that feed a solver go through `stratcon-io`,
//! which writes coefficients instead of prose.

use crate::equation::{ConstraintGroup, Equation, Term};

/// Number of equations shown in a group preview.
const PREVIEW_EQUATIONS: usize = 5;

/// Renders one equation as a name line followed by the relation line.
///
/// Coefficients of exactly 1 are omitted; other integral coefficients
/// render without a fractional part. The right side always ends with the
/// constant, even when it is zero, so the line shape stays predictable.
pub fn equation(eq: &Equation, delimiter: char) -> String {
    let mut out = eq.name(delimiter);
    out.push('\n');
    out.push_str(&side_terms(&eq.left, delimiter));
    out.push(' ');
    out.push_str(eq.comparison.symbol());
    out.push(' ');
    out.push_str(&side_terms(&eq.right, delimiter));
    out.push_str(" + ");
    out.push_str(&eq.constant.to_string());
    out.push('\n');
    out
}

/// Renders the first few equations of a group, one blank line apart.
///
/// A group that compiled to nothing renders as `No Constraints Exist`.
pub fn group_preview(group: &ConstraintGroup, delimiter: char) -> String {
    if group.equations.is_empty() {
        return "No Constraints Exist".to_owned();
    }

    let mut out = String::new();
    for eq in group.equations.iter().take(PREVIEW_EQUATIONS) {
        out.push_str(&equation(eq, delimiter));
        out.push('\n');
    }
    out
}

/// Truncates from the left, keeping the tail: `... N_2030_PLSQ`.
pub fn trim_ellipsis_left(base: &str, max_len: usize) -> String {
    const ELLIPSIS: &str = "... ";
    let chars: Vec<char> = base.chars().collect();
    if chars.len() <= max_len {
        return base.to_owned();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{ELLIPSIS}{tail}")
}

/// Truncates from the right, keeping the head: `167N_2030_P ...`.
pub fn trim_ellipsis_right(base: &str, max_len: usize) -> String {
    const ELLIPSIS: &str = " ...";
    let chars: Vec<char> = base.chars().collect();
    if chars.len() <= max_len {
        return base.to_owned();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    let head: String = chars[..keep].iter().collect();
    format!("{head}{ELLIPSIS}")
}

fn side_terms(terms: &[Term], delimiter: char) -> String {
    terms
        .iter()
        .map(|term| {
            let name = term.variable.name(delimiter);
            if term.coef == 1.0 {
                name
            } else {
                format!("{}*{}", term.coef, name)
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::Comparison;
    use crate::space::Variable;

    fn term(name: &str, coef: f64) -> Term {
        Term {
            variable: Variable::parse(name, '_'),
            coef,
        }
    }

    fn sample_equation() -> Equation {
        Equation {
            name_prefix: "area".to_owned(),
            name_suffix: "OAK".to_owned(),
            constant: 0.0,
            comparison: Comparison::Ge,
            left: vec![term("OAK_2020", 1.0), term("OAK_2021", 2.0)],
            right: vec![term("PINE_2020", 2.5)],
        }
    }

    #[test]
    fn test_equation_renders_name_and_relation() {
        let text = equation(&sample_equation(), '_');
        assert_eq!(text, "area_OAK\nOAK_2020 + 2*OAK_2021 >= 2.5*PINE_2020 + 0\n");
    }

    #[test]
    fn test_equation_coef_one_is_omitted() {
        let text = equation(&sample_equation(), '_');
        assert!(text.contains("OAK_2020 +"), "{text}");
        assert!(!text.contains("1*OAK_2020"), "{text}");
    }

    #[test]
    fn test_equation_without_suffix_keeps_bare_prefix() {
        let mut eq = sample_equation();
        eq.name_suffix = String::new();
        let text = equation(&eq, '_');
        assert!(text.starts_with("area\n"), "{text}");
    }

    #[test]
    fn test_empty_side_renders_as_blank() {
        let mut eq = sample_equation();
        eq.left = Vec::new();
        let text = equation(&eq, '_');
        assert!(text.contains("\n >= 2.5*PINE_2020 + 0\n"), "{text}");
    }

    #[test]
    fn test_group_preview_caps_at_five_equations() {
        let equations: Vec<Equation> = (0..8)
            .map(|n| {
                let mut eq = sample_equation();
                eq.name_suffix = format!("202{n}");
                eq
            })
            .collect();
        let group = ConstraintGroup {
            group_name: "area".to_owned(),
            equations,
            split_by: vec!["year".to_owned()],
            comparison: Comparison::Ge,
            left_coef: 1.0,
            right_coef: 2.5,
        };

        let text = group_preview(&group, '_');
        assert_eq!(text.matches("area_202").count(), 5, "{text}");
    }

    #[test]
    fn test_group_preview_reports_empty_groups() {
        let group = ConstraintGroup {
            group_name: "area".to_owned(),
            equations: Vec::new(),
            split_by: Vec::new(),
            comparison: Comparison::Eq,
            left_coef: 1.0,
            right_coef: 1.0,
        };
        assert_eq!(group_preview(&group, '_'), "No Constraints Exist");
    }

    #[test]
    fn test_trim_ellipsis_left_keeps_tail() {
        assert_eq!(trim_ellipsis_left("1234567890", 7), "... 890");
        assert_eq!(trim_ellipsis_left("123", 7), "123");
    }

    #[test]
    fn test_trim_ellipsis_right_keeps_head() {
        assert_eq!(trim_ellipsis_right("1234567890", 7), "123 ...");
        assert_eq!(trim_ellipsis_right("123", 7), "123");
    }
}
