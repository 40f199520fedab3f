use anyhow::Result;
use colored::*;
use marshal_core::execution::{ShellCommandRunner, TargetRunnerConfig};
use marshal_core::manager::TargetManager;

use super::parse_defines;

pub async fn execute(
    manager: &TargetManager,
    targets: &[String],
    defines: &[String],
    dry_run: bool,
    always_make: bool,
) -> Result<()> {
    let variables = manager.variables(parse_defines(defines)?);

    let summary = manager
        .run_targets(
            targets,
            &ShellCommandRunner::new(),
            &variables,
            TargetRunnerConfig {
                always_make,
                dry_run,
            },
        )
        .await?;

    println!();
    if dry_run {
        println!(
            "{} {} target(s) would run",
            "Dry run:".bold(),
            summary.executed.len()
        );
    } else {
        println!(
            "{} {} target(s) made, {} up to date, {} command(s) run",
            "✓".green().bold(),
            summary.executed.len(),
            summary.skipped.len(),
            summary.commands_run
        );
    }

    Ok(())
}
