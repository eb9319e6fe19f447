use anyhow::Result;
use colored::*;
use fastkit_core::project_manager::ProjectManager;

pub fn execute(manager: &ProjectManager, task: &str) -> Result<()> {
    println!("{} {}", "Running task".bold(), task.cyan());

    let report = manager.run(task)?;

    println!();
    if let Some(pid) = report.detached_pid() {
        println!(
            "{} {}",
            "✓".green().bold(),
            format!("Application running in the background (pid {})", pid)
                .green()
                .bold()
        );
    } else {
        println!(
            "{} {}",
            "✓".green().bold(),
            "All tasks completed successfully!".green().bold()
        );
    }

    Ok(())
}
