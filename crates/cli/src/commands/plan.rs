use anyhow::Result;
use colored::*;
use marshal_core::manager::TargetManager;

use super::parse_defines;

pub fn execute(
    manager: &TargetManager,
    targets: &[String],
    defines: &[String],
    always_make: bool,
) -> Result<()> {
    let variables = manager.variables(parse_defines(defines)?);
    let plan = manager.get_execution_plan(targets, &variables, always_make)?;

    println!(
        "{} {}",
        "Execution plan for".bold(),
        plan.requested.join(", ").cyan()
    );

    println!("\n{}:", "Execution order".bold());
    for (i, target) in plan.targets.iter().enumerate() {
        if target.is_up_to_date() {
            println!("  {}. {} {}", i + 1, target.name.dimmed(), "(up to date)".dimmed());
            continue;
        }

        println!(
            "  {}. {} {}",
            i + 1,
            target.name,
            format!("({})", target.freshness).bright_black()
        );
        for command in &target.commands {
            println!("       {} {}", "$".bright_black(), command);
        }
    }

    Ok(())
}
