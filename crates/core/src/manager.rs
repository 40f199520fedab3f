//! High-level target management interface
//!
//! This module provides the [`TargetManager`], the primary interface the CLI
//! uses. It encapsulates locating and loading the targets file, building the
//! target graph, planning, and running.
//!
//! ## Example
//!
//! ```rust,no_run
//! use marshal_core::execution::{ShellCommandRunner, TargetRunnerConfig};
//! use marshal_core::manager::{TargetManager, TargetManagerConfig};
//! use std::collections::HashMap;
//! use std::path::PathBuf;
//!
//! # async fn example() -> marshal_core::types::MarshalResult<()> {
//! let manager = TargetManager::new(TargetManagerConfig {
//!     working_dir: PathBuf::from("."),
//!     config_file: None,
//! })?;
//!
//! let variables = manager.variables(HashMap::new());
//! let summary = manager
//!     .run_targets(
//!         &["run-tests".to_string()],
//!         &ShellCommandRunner::new(),
//!         &variables,
//!         TargetRunnerConfig::default(),
//!     )
//!     .await?;
//! println!("{} commands run", summary.commands_run);
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::configs::targets::{find_targets_file, load_targets_config, TargetsFileConfig};
use crate::execution::{CommandRunner, Invocation, Run, TargetRunner, TargetRunnerConfig};
use crate::freshness::check_freshness;
use crate::graph::TargetGraph;
use crate::interpolation::Variables;
use crate::results::{
    DependencyGraphResult, ExecutionPlan, PlannedTarget, RunSummary, TargetInfo, TargetListResult,
};
use crate::types::{MarshalError, MarshalResult};

/// High-level manager that owns the loaded target graph
pub struct TargetManager {
    pub graph: TargetGraph,
    pub config_path: PathBuf,
    name: Option<String>,
    description: Option<String>,
}

/// Configuration for initializing a target manager
pub struct TargetManagerConfig {
    /// Directory searched for a targets file and used to resolve `config_file`
    pub working_dir: PathBuf,
    /// Explicit targets file, overriding the search
    pub config_file: Option<PathBuf>,
}

impl TargetManager {
    /// Locate and load the targets file and build the graph
    pub fn new(config: TargetManagerConfig) -> MarshalResult<Self> {
        let config_path = match config.config_file {
            Some(path) if path.is_absolute() => path,
            Some(path) => config.working_dir.join(path),
            None => find_targets_file(&config.working_dir)?,
        };

        let targets_config = load_targets_config(&config_path)?;
        let root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or(config.working_dir);

        tracing::debug!(
            "Loaded {} targets from {}",
            targets_config.targets.len(),
            config_path.display()
        );

        Self::from_config(targets_config, &root, config_path)
    }

    /// Build a manager from an already parsed targets file
    pub fn from_config(
        targets_config: TargetsFileConfig,
        root: &Path,
        config_path: PathBuf,
    ) -> MarshalResult<Self> {
        let graph = TargetGraph::from_config(&targets_config, root)?;
        Ok(Self {
            graph,
            config_path,
            name: targets_config.name,
            description: targets_config.description,
        })
    }

    /// Variable lookup for this graph with the given command-line definitions
    pub fn variables(&self, overrides: HashMap<String, String>) -> Variables {
        Variables::from_process_env(overrides, self.graph.variables().clone())
    }

    /// The requested targets, or the default target when none were given
    pub fn requested_or_default(&self, targets: &[String]) -> MarshalResult<Vec<String>> {
        if !targets.is_empty() {
            return Ok(targets.to_vec());
        }

        self.graph
            .default_target()
            .map(|name| vec![name.to_string()])
            .ok_or_else(|| MarshalError::Config("No targets defined".to_string()))
    }

    /// List all targets in declaration order
    pub fn list_targets(&self) -> TargetListResult {
        let default = self.graph.default_target();
        let targets = self
            .graph
            .targets()
            .iter()
            .map(|target| TargetInfo {
                is_default: Some(target.name.as_str()) == default,
                ..TargetInfo::from(target)
            })
            .collect();

        TargetListResult {
            name: self.name.clone(),
            description: self.description.clone(),
            targets,
        }
    }

    /// Work out what a run would do without executing anything
    pub fn get_execution_plan(
        &self,
        targets: &[String],
        variables: &Variables,
        always_make: bool,
    ) -> MarshalResult<ExecutionPlan> {
        let requested = self.requested_or_default(targets)?;
        let mut satisfied = HashSet::new();
        let mut would_run: HashSet<String> = HashSet::new();
        let mut planned = Vec::new();

        for name in &requested {
            for target in self.graph.resolve(name, &satisfied)? {
                let freshness = check_freshness(target, &self.graph, |dep| would_run.contains(dep));
                let will_run = always_make || freshness.needs_run();

                let commands = target
                    .commands
                    .iter()
                    .map(|command| {
                        Invocation::prepare(&target.name, command, variables, self.graph.root())
                            .map(|invocation| invocation.display())
                    })
                    .collect::<MarshalResult<Vec<_>>>()?;

                let rebuilds = !commands.is_empty()
                    || target.dependencies.iter().any(|d| would_run.contains(d));
                if will_run && rebuilds {
                    would_run.insert(target.name.clone());
                }
                satisfied.insert(target.name.clone());
                planned.push(PlannedTarget {
                    name: target.name.clone(),
                    freshness,
                    will_run,
                    commands,
                });
            }
        }

        Ok(ExecutionPlan {
            requested,
            targets: planned,
        })
    }

    /// Run the requested targets (or the default) through `runner`
    pub async fn run_targets<R: CommandRunner>(
        &self,
        targets: &[String],
        runner: &R,
        variables: &Variables,
        config: TargetRunnerConfig,
    ) -> MarshalResult<RunSummary> {
        let requested = self.requested_or_default(targets)?;
        let mut run = Run::new();

        TargetRunner::new(&self.graph, runner, variables)
            .with_config(config)
            .run_targets(&requested, &mut run)
            .await?;

        Ok(RunSummary::from(&run))
    }

    /// Get dependency graph information
    pub fn get_dependency_graph(&self) -> DependencyGraphResult {
        DependencyGraphResult {
            graph: self.graph.to_dependency_graph(),
            cycles: self.graph.find_cycles(),
            undefined: self.graph.undefined_dependencies(),
        }
    }
}
