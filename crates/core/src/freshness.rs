//! Up-to-date checks for file targets
//!
//! A file target is fresh when its output exists and is not older than any
//! of its prerequisite paths: the outputs of its prerequisite targets and its
//! declared inputs, where those exist as files.

use std::fmt;
use std::path::Path;
use std::time::SystemTime;

use crate::graph::{Target, TargetGraph};

/// Whether a target needs to run and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// No output declared; always runs
    Phony,
    /// The declared output does not exist yet
    MissingOutput,
    /// A prerequisite executed commands earlier in this run
    PrerequisiteRebuilt(String),
    /// A declared input does not exist
    MissingInput(String),
    /// The given prerequisite path is newer than the output
    Stale(String),
    /// Output exists and is at least as new as every prerequisite path
    UpToDate,
}

impl Freshness {
    pub fn needs_run(&self) -> bool {
        !matches!(self, Freshness::UpToDate)
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Phony => write!(f, "phony"),
            Freshness::MissingOutput => write!(f, "output missing"),
            Freshness::PrerequisiteRebuilt(name) => write!(f, "prerequisite '{}' was rebuilt", name),
            Freshness::MissingInput(path) => write!(f, "input '{}' missing", path),
            Freshness::Stale(path) => write!(f, "'{}' is newer than output", path),
            Freshness::UpToDate => write!(f, "up to date"),
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Decide whether `target` must run. `rebuilt` reports whether a
/// prerequisite ran commands earlier in the current run.
pub fn check_freshness(
    target: &Target,
    graph: &TargetGraph,
    rebuilt: impl Fn(&str) -> bool,
) -> Freshness {
    let Some(output) = &target.output else {
        return Freshness::Phony;
    };

    let Some(output_time) = modified(output) else {
        return Freshness::MissingOutput;
    };

    for dep_name in &target.dependencies {
        if rebuilt(dep_name.as_str()) {
            return Freshness::PrerequisiteRebuilt(dep_name.clone());
        }

        let dep_output = graph.get(dep_name).and_then(|dep| dep.output.as_deref());
        if let Some(dep_time) = dep_output.and_then(modified) {
            if dep_time > output_time {
                return Freshness::Stale(dep_name.clone());
            }
        }
    }

    for input in &target.inputs {
        match modified(input) {
            Some(input_time) if input_time > output_time => {
                return Freshness::Stale(input.display().to_string());
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    "Input '{}' of target '{}' does not exist",
                    input.display(),
                    target.name
                );
                return Freshness::MissingInput(input.display().to_string());
            }
        }
    }

    Freshness::UpToDate
}
