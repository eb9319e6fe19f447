use thiserror::Error;

/// Exit code reported when a step was terminated without one (e.g. by a signal)
pub const UNKNOWN_EXIT_CODE: i32 = 1;
/// Exit code reported for configuration and task-resolution errors
pub const CONFIG_EXIT_CODE: i32 = 2;
/// Exit code reported when an external tool could not be started at all
pub const SPAWN_EXIT_CODE: i32 = 127;

/// The main error type for fastkit operations
#[derive(Debug, Error)]
pub enum FastkitError {
    #[error("Dependency resolution failed: `{step}` exited with code {code}")]
    DependencyResolution { step: String, code: i32 },

    #[error("Migration generation failed: `{step}` exited with code {code}")]
    MigrationGeneration { step: String, code: i32 },

    #[error("Migration apply failed: `{step}` exited with code {code}")]
    MigrationApply { step: String, code: i32 },

    #[error("Lint violations found: `{step}` exited with code {code}")]
    LintViolation { step: String, code: i32 },

    #[error("Test run failed: `{step}` exited with code {code}")]
    TestFailure { step: String, code: i32 },

    #[error("Image build failed: `{step}` exited with code {code}")]
    ImageBuild { step: String, code: i32 },

    #[error("Image push failed: `{step}` exited with code {code}")]
    ImagePush { step: String, code: i32 },

    #[error("Application launch failed: `{step}` exited with code {code}")]
    Launch { step: String, code: i32 },

    #[error("Task '{task}' failed: `{step}` exited with code {code}")]
    StepFailed {
        task: String,
        step: String,
        code: i32,
    },

    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl FastkitError {
    /// Process exit code the CLI should surface for this error.
    ///
    /// Step failures propagate the failing step's own exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DependencyResolution { code, .. }
            | Self::MigrationGeneration { code, .. }
            | Self::MigrationApply { code, .. }
            | Self::LintViolation { code, .. }
            | Self::TestFailure { code, .. }
            | Self::ImageBuild { code, .. }
            | Self::ImagePush { code, .. }
            | Self::Launch { code, .. }
            | Self::StepFailed { code, .. } => *code,
            Self::Spawn { .. } => SPAWN_EXIT_CODE,
            Self::Config(_) | Self::Task(_) | Self::Yaml(_) => CONFIG_EXIT_CODE,
            Self::Io(_) => UNKNOWN_EXIT_CODE,
        }
    }
}

/// Result type alias for fastkit operations
pub type FastkitResult<T> = Result<T, FastkitError>;
