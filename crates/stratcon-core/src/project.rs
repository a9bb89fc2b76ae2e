//! Persisted project state and its versioned load protocol.
//!
//! A project file is JSON. The on-disk shape has changed once: the original
//! files carried no version marker, current ones do. Loading probes the
//! known shapes newest to oldest, upgrades whatever matched one step at a
//! time, and finishes by pruning selections the variable space no longer
//! backs, so callers always receive a current, internally consistent state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::repair;
use crate::setup::ConstraintSetup;
use crate::space::VariableSpace;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Failure loading a project file. Every case carries the exact message
/// shown to the operator.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read at all.
    #[error("Unable to read file")]
    Unreadable(#[source] std::io::Error),

    /// No known schema shape matched the file's structure.
    #[error("Not a valid project file, unable to parse")]
    Unparsable,

    /// An upgrade step failed to advance the version chain. This is a bug
    /// in the migration code, not a problem with the file.
    #[error("Conversion code is messed up")]
    MigrationStalled,
}

/// Failure writing a project file.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The serialized state could not be written to disk.
    #[error("Unable to write file")]
    Unwritable(#[source] std::io::Error),

    /// The state could not be serialized at all.
    #[error("Unable to encode project state")]
    Encode(#[source] serde_json::Error),
}

/// The persisted aggregate root: one variable space plus its setups.
///
/// Compiled equations are never stored; they are re-expanded from the
/// setups whenever needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectState {
    pub variable_space: VariableSpace,
    pub setups: Vec<ConstraintSetup>,
    /// Schema marker distinguishing this shape from older project files.
    pub schema_version: u32,
}

/// The original project shape, from before the version marker existed.
///
/// Only the loader knows about it; everything else works with the current
/// [`ProjectState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectStateV0 {
    variable_space: VariableSpace,
    setups: Vec<ConstraintSetup>,
}

impl ProjectStateV0 {
    /// Upgrades one step, to the shape that introduced the version marker.
    fn upgrade(self) -> ProjectState {
        ProjectState {
            variable_space: self.variable_space,
            setups: self.setups,
            schema_version: SCHEMA_VERSION,
        }
    }
}

/// One parsed project file, at whichever schema version matched.
///
/// Shapes are probed newest to oldest and the first structural match wins.
/// `deny_unknown_fields` on every shape keeps the probe unambiguous: a file
/// with the version marker can only match the current shape, one without it
/// can only match the legacy shape.
enum VersionedState {
    V1(ProjectState),
    V0(ProjectStateV0),
}

impl VersionedState {
    fn parse(text: &str) -> Option<VersionedState> {
        if let Ok(state) = serde_json::from_str::<ProjectState>(text) {
            return Some(VersionedState::V1(state));
        }
        if let Ok(state) = serde_json::from_str::<ProjectStateV0>(text) {
            return Some(VersionedState::V0(state));
        }
        None
    }

    /// Advances one schema version; the current shape passes through as is.
    fn upgrade(self) -> VersionedState {
        match self {
            VersionedState::V0(state) => VersionedState::V1(state.upgrade()),
            current @ VersionedState::V1(_) => current,
        }
    }

    fn version(&self) -> u32 {
        match self {
            VersionedState::V1(_) => 1,
            VersionedState::V0(_) => 0,
        }
    }
}

impl ProjectState {
    /// Creates a project around a freshly built space, with no setups.
    pub fn new(variable_space: VariableSpace) -> ProjectState {
        ProjectState {
            variable_space,
            setups: Vec::new(),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Serializes to the current schema's JSON form.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Decodes the current schema only. Older files must go through
    /// [`ProjectState::load`], which knows the whole version chain.
    pub fn from_json(text: &str) -> Result<ProjectState, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads a project file of any known schema version.
    ///
    /// Reads the file, probes the version chain, upgrades step by step to
    /// the current shape, and prunes selections that reference values no
    /// longer in the variable space. A stalled upgrade chain is reported as
    /// [`LoadError::MigrationStalled`] rather than looping forever.
    pub fn load(path: impl AsRef<Path>) -> Result<ProjectState, LoadError> {
        let text = fs::read_to_string(path.as_ref()).map_err(LoadError::Unreadable)?;
        let mut state = VersionedState::parse(&text).ok_or(LoadError::Unparsable)?;

        loop {
            match state {
                VersionedState::V1(current) => {
                    return Ok(repair::prune_stale_selections(&current));
                }
                older => {
                    let from = older.version();
                    state = older.upgrade();
                    if state.version() == from {
                        return Err(LoadError::MigrationStalled);
                    }
                    info!(event = "project_migrated", from, to = state.version());
                }
            }
        }
    }

    /// Writes the serialized current shape to disk.
    pub fn save(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), SaveError> {
        let text = self.to_json(pretty).map_err(SaveError::Encode)?;
        fs::write(path.as_ref(), text).map_err(SaveError::Unwritable)?;
        info!(
            event = "project_saved",
            path = %path.as_ref().display(),
            setups = self.setups.len(),
        );
        Ok(())
    }
}
