use anyhow::Result;
use colored::*;
use fastkit_core::project_manager::ProjectManager;

pub fn execute(manager: &ProjectManager, task: &str) -> Result<()> {
    let plan = manager.plan(task)?;

    println!("{} {}", "Execution plan for".bold(), plan.target.cyan());
    println!("\n{}:", "Execution order".bold());

    for (i, planned) in plan.tasks.iter().enumerate() {
        println!("  {}. {}", i + 1, planned.name.blue().bold());

        if let Some(reason) = &planned.blocked_by {
            println!("     {} {}", "blocked:".yellow().bold(), reason.yellow());
            continue;
        }
        for step in &planned.steps {
            println!("     {} {}", "$".dimmed(), step);
        }
    }

    Ok(())
}
