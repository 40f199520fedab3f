//! Result types for target manager operations
//!
//! This module contains the output structures returned by [`crate::TargetManager`],
//! kept separate so the CLI only deals with plain data.

use std::path::PathBuf;

use crate::execution::Run;
use crate::freshness::Freshness;
use crate::graph::Target;

/// Information about a declared target
#[derive(Debug, Clone)]
pub struct TargetInfo {
    pub name: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    pub output: Option<PathBuf>,
    pub command_count: usize,
    pub is_default: bool,
}

impl TargetInfo {
    pub fn is_phony(&self) -> bool {
        self.output.is_none()
    }
}

impl From<&Target> for TargetInfo {
    fn from(target: &Target) -> Self {
        Self {
            name: target.name.clone(),
            description: target.description.clone(),
            dependencies: target.dependencies.clone(),
            output: target.output.clone(),
            command_count: target.commands.len(),
            is_default: false, // Set by the manager, which knows the default
        }
    }
}

/// Result of listing targets
#[derive(Debug)]
pub struct TargetListResult {
    pub name: Option<String>,
    pub description: Option<String>,
    pub targets: Vec<TargetInfo>,
}

/// Result of getting the dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    pub graph: petgraph::Graph<String, ()>,
    pub cycles: Vec<Vec<String>>,
    /// (target, missing prerequisite) pairs
    pub undefined: Vec<(String, String)>,
}

/// One entry of an execution plan
#[derive(Debug, Clone)]
pub struct PlannedTarget {
    pub name: String,
    pub freshness: Freshness,
    pub will_run: bool,
    /// Commands after variable expansion
    pub commands: Vec<String>,
}

impl PlannedTarget {
    /// True when the target will be skipped as up to date
    pub fn is_up_to_date(&self) -> bool {
        !self.will_run
    }
}

/// Result of planning a run without executing it
#[derive(Debug)]
pub struct ExecutionPlan {
    pub requested: Vec<String>,
    pub targets: Vec<PlannedTarget>,
}

/// Summary of a finished run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
    pub commands_run: usize,
}

impl From<&Run> for RunSummary {
    fn from(run: &Run) -> Self {
        Self {
            executed: run.executed().to_vec(),
            skipped: run.skipped().to_vec(),
            commands_run: run.commands_run(),
        }
    }
}
