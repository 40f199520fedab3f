//! Target execution module
//!
//! This module handles the actual execution of targets: the command runner
//! abstraction, the per-invocation run state, and the runner that walks the graph.

pub mod command;
pub mod runner;

pub use command::{CommandRunner, Invocation, ShellCommandRunner};
pub use runner::{Run, TargetRunner, TargetRunnerConfig};
