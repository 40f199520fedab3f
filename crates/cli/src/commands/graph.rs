use anyhow::Result;
use colored::*;
use marshal_core::manager::TargetManager;

pub fn execute(manager: &TargetManager) -> Result<()> {
    println!("{}", "Target Dependency Graph:".bold().underline());

    let result = manager.get_dependency_graph();
    let graph = &result.graph;

    if graph.node_count() == 0 {
        println!("No targets defined");
        return Ok(());
    }

    if !result.cycles.is_empty() {
        let cycles_description = result
            .cycles
            .iter()
            .map(|cycle| {
                let mut path = cycle.clone();
                if let Some(first) = path.first().cloned() {
                    path.push(first);
                }
                path.join(" -> ")
            })
            .collect::<Vec<_>>()
            .join("; ");

        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!("Circular dependencies detected: {}", cycles_description).yellow()
        );
    }

    for (target, missing) in &result.undefined {
        println!(
            "{} {}",
            "Warning:".yellow().bold(),
            format!("'{}' depends on undefined target '{}'", target, missing).yellow()
        );
    }

    for node_index in graph.node_indices() {
        println!("{}", graph[node_index].blue().bold());

        // petgraph yields neighbors newest-edge first; reverse to declaration order
        let mut deps: Vec<&str> = graph
            .neighbors(node_index)
            .map(|neighbor| graph[neighbor].as_str())
            .collect();
        deps.reverse();

        if !deps.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), deps.join(", "));
        } else {
            println!("  {}", "no dependencies".dimmed());
        }
        println!();
    }

    Ok(())
}
