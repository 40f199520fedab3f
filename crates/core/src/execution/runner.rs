//! High-level target runner
//!
//! This module walks a resolved target order, applies the freshness policy,
//! and executes commands one at a time, stopping at the first failure.

use std::collections::HashSet;

use colored::*;

use crate::execution::command::{CommandRunner, Invocation};
use crate::freshness::{check_freshness, Freshness};
use crate::graph::{Target, TargetGraph};
use crate::interpolation::Variables;
use crate::style::get_target_color;
use crate::types::{MarshalError, MarshalResult};

/// Configuration for the target runner
#[derive(Debug, Clone, Default)]
pub struct TargetRunnerConfig {
    /// Ignore freshness and run every reached target
    pub always_make: bool,
    /// Print commands instead of running them
    pub dry_run: bool,
}

/// State of one invocation: which targets are done and which actually ran.
/// Created fresh per invocation and passed explicitly to the runner.
#[derive(Debug, Default)]
pub struct Run {
    satisfied: HashSet<String>,
    executed: Vec<String>,
    /// Targets that ran commands, or whose prerequisites did
    rebuilt: HashSet<String>,
    skipped: Vec<String>,
    commands_run: usize,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_satisfied(&self, name: &str) -> bool {
        self.satisfied.contains(name)
    }

    pub fn satisfied(&self) -> &HashSet<String> {
        &self.satisfied
    }

    /// Whether the target was (re)made in this run
    pub fn was_executed(&self, name: &str) -> bool {
        self.executed.iter().any(|n| n == name)
    }

    /// Whether the target changed anything in this run. A target without
    /// commands counts only when one of its prerequisites did.
    pub fn was_rebuilt(&self, name: &str) -> bool {
        self.rebuilt.contains(name)
    }

    /// Targets that were made, in execution order
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// Targets skipped as up to date
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn commands_run(&self) -> usize {
        self.commands_run
    }
}

/// Runs targets of a graph through a [`CommandRunner`]
pub struct TargetRunner<'a, R: CommandRunner> {
    graph: &'a TargetGraph,
    runner: &'a R,
    variables: &'a Variables,
    config: TargetRunnerConfig,
}

impl<'a, R: CommandRunner> TargetRunner<'a, R> {
    pub fn new(graph: &'a TargetGraph, runner: &'a R, variables: &'a Variables) -> Self {
        Self {
            graph,
            runner,
            variables,
            config: TargetRunnerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TargetRunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run each requested target in order, sharing one [`Run`].
    ///
    /// Every name is resolved and every command expanded before the first
    /// command starts, so an unknown target, a cycle or a bad variable
    /// reference anywhere in the request executes nothing.
    pub async fn run_targets(&self, names: &[String], run: &mut Run) -> MarshalResult<()> {
        let mut planned = run.satisfied().clone();
        for name in names {
            for target in self.graph.resolve(name, &planned)? {
                self.prepare(target)?;
                planned.insert(target.name.clone());
            }
        }

        for name in names {
            self.run_target(name, run).await?;
        }

        Ok(())
    }

    /// Run a target and its transitive prerequisites, each at most once per [`Run`]
    pub async fn run_target(&self, name: &str, run: &mut Run) -> MarshalResult<()> {
        let order = self.graph.resolve(name, run.satisfied())?;
        tracing::debug!(
            "Execution order for '{}': {:?}",
            name,
            order.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );

        let prepared = order
            .into_iter()
            .map(|target| self.prepare(target).map(|invocations| (target, invocations)))
            .collect::<MarshalResult<Vec<_>>>()?;

        for (target, invocations) in prepared {
            self.run_single(target, &invocations, run).await?;
        }

        Ok(())
    }

    fn prepare(&self, target: &Target) -> MarshalResult<Vec<Invocation>> {
        target
            .commands
            .iter()
            .map(|command| {
                Invocation::prepare(&target.name, command, self.variables, self.graph.root())
            })
            .collect()
    }

    async fn run_single(
        &self,
        target: &Target,
        invocations: &[Invocation],
        run: &mut Run,
    ) -> MarshalResult<()> {
        let freshness = check_freshness(target, self.graph, |dep| run.was_rebuilt(dep));

        if !self.config.always_make && !freshness.needs_run() {
            tracing::info!("Target '{}' is up to date", target.name);
            println!(
                "{} {}",
                "✓".green().bold(),
                format!("'{}' is up to date", target.name).dimmed()
            );
            run.satisfied.insert(target.name.clone());
            run.skipped.push(target.name.clone());
            return Ok(());
        }

        tracing::info!("Running target '{}' ({})", target.name, freshness);
        self.print_header(target, &freshness);

        for invocation in invocations {
            if invocation.echo || self.config.dry_run {
                println!("  {} {}", "$".bright_black(), invocation.display());
            }

            if self.config.dry_run {
                continue;
            }

            let code = self.runner.run(invocation).await?;
            run.commands_run += 1;

            if code != 0 {
                tracing::error!(
                    "Command '{}' in target '{}' exited with {}",
                    invocation.display(),
                    target.name,
                    code
                );
                return Err(MarshalError::CommandFailure {
                    target: target.name.clone(),
                    command: invocation.display(),
                    code,
                });
            }
        }

        if !invocations.is_empty() || target.dependencies.iter().any(|d| run.was_rebuilt(d)) {
            run.rebuilt.insert(target.name.clone());
        }
        run.satisfied.insert(target.name.clone());
        run.executed.push(target.name.clone());
        Ok(())
    }

    fn print_header(&self, target: &Target, freshness: &Freshness) {
        let color = get_target_color(&target.name);
        println!();
        println!(
            "┌─ {} {}",
            "Running target".bold(),
            target.name.color(color).bold()
        );
        println!("└─ {} {}", "Reason:".bright_black(), freshness);
    }
}
