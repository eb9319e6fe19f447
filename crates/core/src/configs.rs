//! Configuration parsing and resolution
//!
//! - [`project`] - the optional `fastkit.yml` file in the project root
//! - [`runner`] - the resolved configuration handed to every task invocation

pub mod project;
pub mod runner;

pub use project::{
    parse_project_config, project_config_schema, ProjectConfig, ToolsConfig, PROJECT_CONFIG_FILE,
};
pub use runner::{Environment, ImageNaming, RunnerConfig, Tools};
