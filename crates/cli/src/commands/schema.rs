use anyhow::Result;
use fastkit_core::configs::project_config_schema;

pub fn execute() -> Result<()> {
    println!("{}", project_config_schema()?);
    Ok(())
}
