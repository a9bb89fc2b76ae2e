//! The tagged variable space parsed from an objective data source.
//!
//! Decision-variable names like `167N_PLSQ_2021` encode one tag per
//! classification axis. Splitting every column name on the delimiter yields
//! the taxonomy this module models: the ordered tag groups, the distinct
//! members of each group, and the exact set of variables the compiler is
//! allowed to reference.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One decision variable: an ordered tuple of tags, one per tag group.
///
/// # Example
///
/// ```
/// use stratcon_core::Variable;
///
/// let var = Variable::parse("OAK_2021", '_');
/// assert_eq!(var.tag(0), Some("OAK"));
/// assert_eq!(var.name('_'), "OAK_2021");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(Vec<String>);

impl Variable {
    /// Creates a variable directly from its tag tuple.
    pub fn new(tags: Vec<String>) -> Self {
        Variable(tags)
    }

    /// Splits a raw delimited column name into a variable.
    pub fn parse(raw: &str, delimiter: char) -> Self {
        Variable(raw.split(delimiter).map(str::to_owned).collect())
    }

    /// Returns the tag at one position of the tuple.
    pub fn tag(&self, position: usize) -> Option<&str> {
        self.0.get(position).map(String::as_str)
    }

    /// Returns every tag in position order.
    pub fn tags(&self) -> &[String] {
        &self.0
    }

    /// Reassembles the delimited column name this variable came from.
    pub fn name(&self, delimiter: char) -> String {
        self.0.join(delimiter.to_string().as_str())
    }
}

/// The full tag taxonomy derived from one objective data source.
///
/// A space is built once per data import and never edited afterwards.
/// Importing a different source builds a fresh space and the project's
/// setups are carried over by [`crate::repair::remap_to_space`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpace {
    /// The single character separating tags inside a variable name.
    pub delimiter: char,
    /// Tag group names, in the order their tags appear inside names.
    pub tag_order: Vec<String>,
    /// Every variable present in the data, sorted by column name.
    pub variables: Vec<Variable>,
    /// Tag group name to its sorted distinct member values.
    pub members: BTreeMap<String, Vec<String>>,
}

impl VariableSpace {
    /// Builds the taxonomy from raw column names.
    ///
    /// `tag_group_names` labels the tag positions in order; duplicate column
    /// names collapse to one variable. Callers are expected to have run the
    /// input through [`crate::lint`] first. Nothing is re-validated here and
    /// malformed input produces an equally malformed space.
    pub fn build(
        raw_names: &[String],
        delimiter: char,
        tag_group_names: Vec<String>,
    ) -> VariableSpace {
        let members = tag_group_names
            .iter()
            .cloned()
            .zip(member_lists(raw_names, delimiter))
            .collect();

        let mut sorted_names: Vec<&String> = raw_names.iter().collect();
        sorted_names.sort();
        sorted_names.dedup();
        let variables = sorted_names
            .into_iter()
            .map(|name| Variable::parse(name, delimiter))
            .collect();

        VariableSpace {
            delimiter,
            tag_order: tag_group_names,
            variables,
            members,
        }
    }

    /// Returns the sorted member values of one tag group, if it exists.
    pub fn members_of(&self, group: &str) -> Option<&[String]> {
        self.members.get(group).map(Vec::as_slice)
    }

    /// Number of tag positions in every variable name.
    pub fn group_count(&self) -> usize {
        self.tag_order.len()
    }
}

/// Collects the sorted distinct tag values found at each name position.
///
/// This is the first half of [`VariableSpace::build`], exposed separately so
/// a front end can show what each position contains before the operator has
/// named the tag groups.
pub fn member_lists(raw_names: &[String], delimiter: char) -> Vec<Vec<String>> {
    let positions = raw_names
        .first()
        .map(|name| name.split(delimiter).count())
        .unwrap_or(0);

    let mut sets: Vec<BTreeSet<String>> = vec![BTreeSet::new(); positions];
    for name in raw_names {
        for (position, tag) in name.split(delimiter).enumerate() {
            if let Some(set) = sets.get_mut(position) {
                set.insert(tag.to_owned());
            }
        }
    }

    sets.into_iter()
        .map(|set| set.into_iter().collect())
        .collect()
}
