//! fastkit Core Library
//!
//! This is the core library for the fastkit project task runner. It sequences
//! the install, migrate, launch, lint, test, image and cleanup tasks of a
//! Fastlib web project, delegating the real work to external tools.
//!
//! ## Architecture
//!
//! - [`project_manager`] - High-level interface used by the CLI
//! - [`execution`] - Dependency ordering, command execution and the fail-fast runner
//! - [`catalog`] - The built-in task definitions
//! - [`tasks`] - Task, step and catalog types
//! - [`platform`] - Platform-conditional cleanup
//! - [`configs`] - `fastkit.yml` parsing and layered configuration
//! - [`results`] - Plan and run report types
//! - [`types`] - Error type and result alias

pub mod catalog;
pub mod configs;
pub mod execution;
pub mod platform;
pub mod project_manager;
pub mod results;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use project_manager::{ProjectManager, ProjectManagerConfig};
pub use types::{FastkitError, FastkitResult};
