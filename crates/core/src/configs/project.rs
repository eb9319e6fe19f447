use schemars::JsonSchema;
use serde::Deserialize;

use crate::platform::Platform;
use crate::types::{FastkitError, FastkitResult};

/// File name of the optional per-project configuration
pub const PROJECT_CONFIG_FILE: &str = "fastkit.yml";

#[derive(Debug, Default, Deserialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Log file receiving the production server's stdout and stderr
    pub server_log: Option<String>,
    /// Source root the test suite runs from
    pub source_dir: Option<String>,
    pub dockerhub_user: Option<String>,
    pub release_name: Option<String>,
    pub tag: Option<String>,
    /// Force a cleanup platform instead of detecting the host
    pub platform: Option<Platform>,
    pub tools: Option<ToolsConfig>,
}

/// Overrides for the external programs tasks invoke
#[derive(Debug, Default, Deserialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolsConfig {
    pub package_manager: Option<String>,
    pub migration_tool: Option<String>,
    pub python: Option<String>,
    pub entrypoint: Option<String>,
    pub lint_tool: Option<String>,
    pub coverage: Option<String>,
    pub container: Option<String>,
}

pub fn parse_project_config(yaml_str: &str) -> FastkitResult<ProjectConfig> {
    let config: ProjectConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

/// JSON schema of `fastkit.yml`, pretty-printed
pub fn project_config_schema() -> FastkitResult<String> {
    let schema = schemars::schema_for!(ProjectConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| FastkitError::Config(format!("Failed to render schema: {}", e)))
}
