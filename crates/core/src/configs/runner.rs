//! Resolved runner configuration
//!
//! Values are layered from built-in defaults, then `fastkit.yml`, then the
//! process environment. The resulting [`RunnerConfig`] is passed explicitly to
//! everything that needs the log path, source root or image naming.

use std::fs;
use std::path::{Path, PathBuf};

use crate::configs::project::{parse_project_config, ProjectConfig, PROJECT_CONFIG_FILE};
use crate::platform::Platform;
use crate::types::{FastkitError, FastkitResult};

pub const DEFAULT_SERVER_LOG: &str = "fast-web.log";
pub const DEFAULT_SOURCE_DIR: &str = "src";

pub const SERVER_LOG_VAR: &str = "SERVER_LOG";
pub const SOURCE_DIR_VAR: &str = "SOURCE_DIR";
pub const DOCKERHUB_USER_VAR: &str = "DOCKERHUB_USER";
pub const RELEASE_NAME_VAR: &str = "RELEASE_NAME";
pub const TAG_VAR: &str = "TAG";

/// Which flavour of launch a start task performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Value passed to the application's `--env` flag
    pub const fn flag(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prod",
        }
    }

    /// Production output goes to the server log instead of the terminal
    pub const fn redirects_output(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// External programs the built-in tasks shell out to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub package_manager: String,
    pub migration_tool: String,
    pub python: String,
    pub entrypoint: String,
    pub lint_tool: String,
    pub coverage: String,
    pub container: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            package_manager: "uv".to_string(),
            migration_tool: "alembic".to_string(),
            python: "python".to_string(),
            entrypoint: "main.py".to_string(),
            lint_tool: "pre-commit".to_string(),
            coverage: "coverage".to_string(),
            container: "docker".to_string(),
        }
    }
}

/// Container image naming; none of these have defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageNaming {
    pub user: Option<String>,
    pub release: Option<String>,
    pub tag: Option<String>,
}

impl ImageNaming {
    /// Build `<user>/<release>:<tag>`, rejecting unset or malformed parts.
    pub fn reference(&self) -> FastkitResult<String> {
        let user = require(DOCKERHUB_USER_VAR, self.user.as_deref())?;
        let release = require(RELEASE_NAME_VAR, self.release.as_deref())?;
        let tag = require(TAG_VAR, self.tag.as_deref())?;

        if !is_valid_repository_component(user) {
            return Err(FastkitError::Config(format!(
                "{} '{}' is not a valid image namespace (lowercase letters, digits, '.', '_' or '-')",
                DOCKERHUB_USER_VAR, user
            )));
        }
        if !is_valid_repository_component(release) {
            return Err(FastkitError::Config(format!(
                "{} '{}' is not a valid image name (lowercase letters, digits, '.', '_' or '-')",
                RELEASE_NAME_VAR, release
            )));
        }
        if !is_valid_tag(tag) {
            return Err(FastkitError::Config(format!(
                "{} '{}' is not a valid image tag",
                TAG_VAR, tag
            )));
        }

        Ok(format!("{}/{}:{}", user, release, tag))
    }
}

fn require<'a>(var: &str, value: Option<&'a str>) -> FastkitResult<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(FastkitError::Config(format!(
            "{} must be set to build or push an image",
            var
        ))),
    }
}

fn is_valid_repository_component(value: &str) -> bool {
    let bytes = value.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes.iter().all(|b| {
            b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'-')
        })
}

fn is_valid_tag(value: &str) -> bool {
    let bytes = value.as_bytes();
    match bytes.first() {
        Some(first) if first.is_ascii_alphanumeric() || *first == b'_' => {}
        _ => return false,
    }

    bytes.len() <= 128
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Configuration handed to every task invocation
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub project_root: PathBuf,
    /// Relative paths resolve against `project_root`
    pub server_log: PathBuf,
    /// Relative paths resolve against `project_root`
    pub source_dir: PathBuf,
    pub image: ImageNaming,
    pub platform: Platform,
    pub tools: Tools,
}

impl RunnerConfig {
    /// Defaults only, with the platform detected from the host
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            server_log: PathBuf::from(DEFAULT_SERVER_LOG),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            image: ImageNaming::default(),
            platform: Platform::current(),
            tools: Tools::default(),
        }
    }

    /// Load defaults, `fastkit.yml` and the process environment
    pub fn load(project_root: &Path) -> FastkitResult<Self> {
        Self::load_with_env(project_root, |key| std::env::var(key).ok())
    }

    /// Same as [`RunnerConfig::load`] with an injectable environment lookup
    pub fn load_with_env<F>(project_root: &Path, lookup: F) -> FastkitResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(project_root);

        let config_path = project_root.join(PROJECT_CONFIG_FILE);
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let file_config = parse_project_config(&content).map_err(|e| {
                FastkitError::Config(format!(
                    "Failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?;
            tracing::debug!(path = %config_path.display(), "loaded project config");
            config.apply_file(file_config);
        }

        config.apply_env(lookup);
        Ok(config)
    }

    /// Overlay values from a parsed `fastkit.yml`
    pub fn apply_file(&mut self, file: ProjectConfig) {
        if let Some(server_log) = file.server_log {
            self.server_log = PathBuf::from(server_log);
        }
        if let Some(source_dir) = file.source_dir {
            self.source_dir = PathBuf::from(source_dir);
        }
        if file.dockerhub_user.is_some() {
            self.image.user = file.dockerhub_user;
        }
        if file.release_name.is_some() {
            self.image.release = file.release_name;
        }
        if file.tag.is_some() {
            self.image.tag = file.tag;
        }
        if let Some(platform) = file.platform {
            self.platform = platform;
        }
        if let Some(tools) = file.tools {
            let defaults = &mut self.tools;
            overlay(&mut defaults.package_manager, tools.package_manager);
            overlay(&mut defaults.migration_tool, tools.migration_tool);
            overlay(&mut defaults.python, tools.python);
            overlay(&mut defaults.entrypoint, tools.entrypoint);
            overlay(&mut defaults.lint_tool, tools.lint_tool);
            overlay(&mut defaults.coverage, tools.coverage);
            overlay(&mut defaults.container, tools.container);
        }
    }

    /// Overlay environment variables; empty values count as unset
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(server_log) = get(SERVER_LOG_VAR) {
            self.server_log = PathBuf::from(server_log);
        }
        if let Some(source_dir) = get(SOURCE_DIR_VAR) {
            self.source_dir = PathBuf::from(source_dir);
        }
        if let Some(user) = get(DOCKERHUB_USER_VAR) {
            self.image.user = Some(user);
        }
        if let Some(release) = get(RELEASE_NAME_VAR) {
            self.image.release = Some(release);
        }
        if let Some(tag) = get(TAG_VAR) {
            self.image.tag = Some(tag);
        }
    }

    pub fn image_reference(&self) -> FastkitResult<String> {
        self.image.reference()
    }

    pub fn server_log_path(&self) -> PathBuf {
        self.project_root.join(&self.server_log)
    }

    pub fn source_path(&self) -> PathBuf {
        self.project_root.join(&self.source_dir)
    }
}

fn overlay(slot: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *slot = value;
    }
}
