//! Command execution utilities
//!
//! Every process the runner starts goes through the [`CommandRunner`] trait.
//! [`ShellCommandRunner`] is the real implementation; tests substitute a
//! recording runner so graph behavior can be checked without spawning anything.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use async_trait::async_trait;

use crate::configs::targets::Command;
use crate::interpolation::{expand, Variables};
use crate::types::{MarshalError, MarshalResult};

/// Environment variable holding the name of the running target
pub const TARGET_ENV_VAR: &str = "MARSHAL_TARGET";

/// A command with variables expanded, ready to hand to a [`CommandRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: String,
    pub command: Command,
    /// False when the command was written with a leading `@`
    pub echo: bool,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Expand variables in `command` and strip the `@` echo marker
    pub fn prepare(
        target: &str,
        command: &Command,
        vars: &Variables,
        working_dir: &Path,
    ) -> MarshalResult<Self> {
        let (command, echo) = match command {
            Command::Single(cmd) => {
                let (cmd, echo) = match cmd.trim_start().strip_prefix('@') {
                    Some(rest) => (rest, false),
                    None => (cmd.as_str(), true),
                };
                (Command::Single(expand(cmd, vars)?), echo)
            }
            // Arguments are never word-split; one that expands to nothing is dropped
            Command::Multiple(args) => {
                let mut expanded = Vec::with_capacity(args.len());
                for arg in args {
                    let value = expand(arg, vars)?;
                    if value.is_empty() && !arg.is_empty() {
                        continue;
                    }
                    expanded.push(value);
                }
                (Command::Multiple(expanded), true)
            }
        };

        Ok(Self {
            target: target.to_string(),
            command,
            echo,
            working_dir: working_dir.to_path_buf(),
        })
    }

    pub fn display(&self) -> String {
        self.command.to_string()
    }
}

/// The single capability used to run external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion and return its exit code
    async fn run(&self, invocation: &Invocation) -> MarshalResult<i32>;
}

/// Runs shell strings through `sh -c` and argument vectors directly
#[derive(Debug, Default, Clone)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn build(invocation: &Invocation) -> MarshalResult<tokio::process::Command> {
        let mut command = match &invocation.command {
            Command::Single(cmd) => {
                let mut command = tokio::process::Command::new("sh");
                command.arg("-c").arg(cmd);
                command
            }
            Command::Multiple(args) => {
                let Some((program, rest)) = args.split_first() else {
                    return Err(MarshalError::Config(format!(
                        "Target '{}' has an empty command list",
                        invocation.target
                    )));
                };
                let mut command = tokio::process::Command::new(program);
                command.args(rest);
                command
            }
        };

        command
            .current_dir(&invocation.working_dir)
            .env(TARGET_ENV_VAR, &invocation.target)
            .kill_on_drop(true);
        Ok(command)
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, invocation: &Invocation) -> MarshalResult<i32> {
        let mut child = Self::build(invocation)?
            .spawn()
            .map_err(|source| MarshalError::CommandSpawn {
                command: invocation.display(),
                source,
            })?;

        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupt received, stopping '{}'", invocation.display());
                if let Err(e) = child.kill().await {
                    tracing::debug!("Failed to kill interrupted command: {}", e);
                }
                Err(MarshalError::Interrupted {
                    target: invocation.target.clone(),
                    command: invocation.display(),
                })
            }
            status = child.wait() => {
                let status = status.map_err(|source| MarshalError::CommandSpawn {
                    command: invocation.display(),
                    source,
                })?;
                Ok(exit_code(status))
            }
        }
    }
}

/// Exit code of a finished process; signal deaths map to 128 + signal on unix
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    fn vars() -> Variables {
        let file: BTreeMap<String, String> = [("VENV".to_string(), ".venv".to_string())]
            .into_iter()
            .collect();
        Variables::new(HashMap::new(), HashMap::new(), file)
    }

    fn invocation(command: Command, dir: &Path) -> Invocation {
        Invocation::prepare("demo", &command, &vars(), dir).unwrap()
    }

    #[test]
    fn test_prepare_strips_echo_marker() {
        let inv = invocation(Command::Single("@echo $(VENV)".to_string()), Path::new("/"));
        assert!(!inv.echo);
        assert_eq!(inv.command, Command::Single("echo .venv".to_string()));

        let inv = invocation(
            Command::Multiple(vec!["$(VENV)/bin/pip".to_string(), "install".to_string()]),
            Path::new("/"),
        );
        assert!(inv.echo);
        assert_eq!(inv.display(), ".venv/bin/pip install");
    }

    #[test]
    fn test_argv_drops_arguments_that_expand_to_nothing() {
        let inv = invocation(
            Command::Multiple(vec![
                "pytest".to_string(),
                "$(OPTS)".to_string(),
                String::new(),
                "$(VENV)".to_string(),
            ]),
            Path::new("/"),
        );
        assert_eq!(
            inv.command,
            Command::Multiple(vec!["pytest".to_string(), String::new(), ".venv".to_string()])
        );
    }

    #[tokio::test]
    async fn test_shell_runner_reports_exit_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        let runner = ShellCommandRunner::new();

        let ok = invocation(Command::Single("true".to_string()), temp_dir.path());
        assert_eq!(runner.run(&ok).await.unwrap(), 0);

        let failing = invocation(Command::Single("exit 3".to_string()), temp_dir.path());
        assert_eq!(runner.run(&failing).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_shell_runner_sets_directory_and_env() {
        let temp_dir = tempfile::tempdir().unwrap();
        let runner = ShellCommandRunner::new();

        let inv = invocation(
            Command::Single("echo \"$MARSHAL_TARGET\" > marker.txt".to_string()),
            temp_dir.path(),
        );
        assert_eq!(runner.run(&inv).await.unwrap(), 0);

        let marker = std::fs::read_to_string(temp_dir.path().join("marker.txt")).unwrap();
        assert_eq!(marker.trim(), "demo");
    }

    #[tokio::test]
    async fn test_argv_runner_and_spawn_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let runner = ShellCommandRunner::new();

        let inv = invocation(
            Command::Multiple(vec!["sh".to_string(), "-c".to_string(), "exit 7".to_string()]),
            temp_dir.path(),
        );
        assert_eq!(runner.run(&inv).await.unwrap(), 7);

        let missing = invocation(
            Command::Multiple(vec!["definitely-not-a-real-program-xyz".to_string()]),
            temp_dir.path(),
        );
        let err = runner.run(&missing).await.unwrap_err();
        assert!(matches!(err, MarshalError::CommandSpawn { .. }));

        let empty = invocation(Command::Multiple(Vec::new()), temp_dir.path());
        assert!(runner.run(&empty).await.is_err());
    }
}
