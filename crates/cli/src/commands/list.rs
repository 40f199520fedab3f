use anyhow::Result;
use colored::*;
use marshal_core::manager::TargetManager;
use marshal_core::style::get_target_color;

pub fn execute(manager: &TargetManager) -> Result<()> {
    let result = manager.list_targets();

    let heading = match &result.name {
        Some(name) => format!("Targets ({})", name),
        None => "Targets".to_string(),
    };
    println!("{}", heading.bold().underline());
    if let Some(description) = &result.description {
        println!("{}", description.dimmed());
    }

    if result.targets.is_empty() {
        println!("  {}", "No targets found".dimmed());
        return Ok(());
    }

    for target in &result.targets {
        let mut line = format!("{}", target.name.color(get_target_color(&target.name)).bold());
        if target.is_default {
            line.push_str(&format!(" {}", "[default]".green()));
        }
        if target.is_phony() {
            line.push_str(&format!(" {}", "phony".dimmed()));
        }
        println!("{}", line);

        if let Some(description) = &target.description {
            println!("  {}", description);
        }
        if !target.dependencies.is_empty() {
            println!(
                "  {} {}",
                "depends on:".dimmed(),
                target.dependencies.join(", ")
            );
        }
        if let Some(output) = &target.output {
            let shown = output
                .strip_prefix(manager.graph.root())
                .unwrap_or(output.as_path());
            println!("  {} {}", "output:".dimmed(), shown.display());
        }
    }

    Ok(())
}
