//! Task execution module
//!
//! This module handles the actual execution of tasks including command execution,
//! dependency ordering, and fail-fast sequencing.

pub mod command;
pub mod dependencies;
pub mod runner;

pub use command::{CommandExecutor, ProcessLauncher, SystemLauncher};
pub use dependencies::resolve_execution_order;
pub use runner::TaskRunner;
