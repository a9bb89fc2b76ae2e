//! Validation of raw operator input.
//!
//! Every check here is stateless and returns a descriptive error instead of
//! panicking, so a front end can surface the message directly. The space
//! builder and the compiler assume their input already passed these checks
//! and do not re-validate.

use std::collections::BTreeSet;

use thiserror::Error;

/// Characters accepted as the tag delimiter inside variable names.
pub const ALLOWED_DELIMITERS: [char; 4] = ['_', '-', '=', ' '];

const TAG_GROUP_NAME_MIN: usize = 3;
const TAG_GROUP_NAME_MAX: usize = 15;
const CONSTRAINT_NAME_MIN: usize = 3;
const CONSTRAINT_NAME_MAX: usize = 30;

/// A validation failure, worded for direct display to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintError {
    /// The delimiter field was left empty.
    #[error("Empty delimiter is not allowed")]
    EmptyDelimiter,

    /// More than one character was given as the delimiter.
    #[error("Delimiter \"{0}\" must be a single character")]
    DelimiterTooLong(String),

    /// The character is not in [`ALLOWED_DELIMITERS`].
    #[error("Delimiter {0:?} is invalid. It must be one of \"_\", \"-\", \"=\", \" \"")]
    DelimiterNotAllowed(char),

    /// No variable names were given at all.
    #[error("Empty variable list passed in")]
    EmptyVariableList,

    /// The first variable name does not contain the delimiter.
    #[error("Delimiter {delimiter:?} not found inside variable \"{name}\"")]
    DelimiterMissing { delimiter: char, name: String },

    /// A tag contains something other than letters and digits.
    #[error("Found invalid tag \"{tag}\" in variable \"{name}\". Tags must contain only letters and numbers")]
    InvalidTag { tag: String, name: String },

    /// A variable splits into a different number of tags than the first one.
    #[error("Variable \"{name}\" has {count} tags, but \"{first}\" has {first_count}")]
    TagCountMismatch {
        name: String,
        count: usize,
        first: String,
        first_count: usize,
    },

    /// A tag group or constraint name is under the minimum length.
    #[error("Name \"{name}\" is too short. Must be at least {min} characters")]
    NameTooShort { name: String, min: usize },

    /// A tag group or constraint name is over the maximum length.
    #[error("Name \"{name}\" is {length} characters long, but the maximum is {max}")]
    NameTooLong {
        name: String,
        length: usize,
        max: usize,
    },

    /// A name contains a character outside letters, digits, '_' and '-'.
    #[error("Invalid name \"{name}\". Illegal character {character:?}")]
    IllegalCharacter { name: String, character: char },

    /// The tag group name list was empty.
    #[error("No groups are named")]
    NoGroupNames,

    /// At least one tag group was left without a name.
    #[error("Not all groups are named")]
    UnnamedGroups,

    /// Two tag groups share a name.
    #[error("Found duplicate names")]
    DuplicateTagGroupNames,

    /// Two or more constraint setups share a name prefix.
    #[error("Found duplicate constraint names {}", .0.join(", "))]
    DuplicateConstraintNames(Vec<String>),
}

/// Parses the delimiter out of its raw text form.
///
/// Exactly one character, drawn from [`ALLOWED_DELIMITERS`].
pub fn delimiter(raw: &str) -> Result<char, LintError> {
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return Err(LintError::EmptyDelimiter);
    };
    if chars.next().is_some() {
        return Err(LintError::DelimiterTooLong(raw.to_owned()));
    }
    if !ALLOWED_DELIMITERS.contains(&first) {
        return Err(LintError::DelimiterNotAllowed(first));
    }
    Ok(first)
}

/// Checks a raw variable-name list against an already parsed delimiter.
///
/// The list must be non-empty, the delimiter must appear in the first name,
/// every tag must be purely alphanumeric, and every name must split into as
/// many tags as the first one does.
pub fn variable_names(names: &[String], delimiter: char) -> Result<(), LintError> {
    let Some(first) = names.first() else {
        return Err(LintError::EmptyVariableList);
    };
    if !first.contains(delimiter) {
        return Err(LintError::DelimiterMissing {
            delimiter,
            name: first.clone(),
        });
    }

    let first_count = first.split(delimiter).count();
    for name in names {
        let mut count = 0;
        for tag in name.split(delimiter) {
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(LintError::InvalidTag {
                    tag: tag.to_owned(),
                    name: name.clone(),
                });
            }
            count += 1;
        }
        if count != first_count {
            return Err(LintError::TagCountMismatch {
                name: name.clone(),
                count,
                first: first.clone(),
                first_count,
            });
        }
    }
    Ok(())
}

/// Checks one tag group name: 3 to 15 characters from letters, digits,
/// '_' and '-'.
pub fn tag_group_name(name: &str) -> Result<(), LintError> {
    name_token(name, TAG_GROUP_NAME_MIN, TAG_GROUP_NAME_MAX)
}

/// Checks a full tag group name list: every position named, every name
/// valid, no duplicates.
pub fn tag_group_names(names: &[String]) -> Result<(), LintError> {
    if names.is_empty() {
        return Err(LintError::NoGroupNames);
    }
    if names.iter().any(|name| name.is_empty()) {
        return Err(LintError::UnnamedGroups);
    }
    for name in names {
        tag_group_name(name)?;
    }
    let distinct: BTreeSet<&String> = names.iter().collect();
    if distinct.len() != names.len() {
        return Err(LintError::DuplicateTagGroupNames);
    }
    Ok(())
}

/// Checks one constraint name prefix: 3 to 30 characters from letters,
/// digits, '_' and '-'.
pub fn constraint_name(name: &str) -> Result<(), LintError> {
    name_token(name, CONSTRAINT_NAME_MIN, CONSTRAINT_NAME_MAX)
}

/// Checks a constraint name prefix list, reporting the actual duplicates.
pub fn constraint_names(names: &[String]) -> Result<(), LintError> {
    for name in names {
        constraint_name(name)?;
    }
    let duplicates: BTreeSet<String> = names
        .iter()
        .filter(|name| names.iter().filter(|other| other == name).count() > 1)
        .cloned()
        .collect();
    if !duplicates.is_empty() {
        return Err(LintError::DuplicateConstraintNames(
            duplicates.into_iter().collect(),
        ));
    }
    Ok(())
}

fn name_token(name: &str, min: usize, max: usize) -> Result<(), LintError> {
    let length = name.chars().count();
    if length < min {
        return Err(LintError::NameTooShort {
            name: name.to_owned(),
            min,
        });
    }
    if length > max {
        return Err(LintError::NameTooLong {
            name: name.to_owned(),
            length,
            max,
        });
    }
    if let Some(character) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
    {
        return Err(LintError::IllegalCharacter {
            name: name.to_owned(),
            character,
        });
    }
    Ok(())
}
