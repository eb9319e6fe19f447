use anyhow::Result;
use colored::*;
use fastkit_core::project_manager::ProjectManager;

/// Print the static task table. Touches no files.
pub fn execute() -> Result<()> {
    let table = ProjectManager::help_table()?;

    println!("{}", "Tasks".bold().underline());

    let width = table
        .iter()
        .map(|task| command_name(&task.name, &task.aliases).len())
        .max()
        .unwrap_or(0);

    for task in &table {
        let name = command_name(&task.name, &task.aliases);
        print!("  {:<width$}  {}", name.blue().bold(), task.description, width = width);
        if !task.dependencies.is_empty() {
            print!(" {}", format!("(after {})", task.dependencies.join(", ")).dimmed());
        }
        println!();
    }

    println!();
    for (name, description) in [
        ("help", "Show this table"),
        ("plan", "Show the execution order for a task"),
        ("schema", "Print the JSON schema of fastkit.yml"),
    ] {
        println!("  {:<width$}  {}", name.blue().bold(), description, width = width);
    }

    Ok(())
}

/// The short CLI name when the task has one
fn command_name<'a>(name: &'a str, aliases: &'a [String]) -> &'a str {
    aliases.first().map(String::as_str).unwrap_or(name)
}
