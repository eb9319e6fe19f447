//! Platform-conditional cleanup of build artifacts
//!
//! The host platform is detected once at startup and turned into a
//! [`PathRemover`]. Windows removes each path only when it exists and treats
//! "not found" as a non-fatal [`CleanupWarning`]; POSIX removes paths
//! unconditionally and glob-expands coverage data files.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::types::{FastkitError, FastkitResult};

/// Coverage data file written by a single-process coverage run
pub const COVERAGE_DATA_FILE: &str = ".coverage";
/// Coverage data files including parallel-mode shards (`.coverage.<host>.<pid>`)
pub const COVERAGE_DATA_GLOB: &str = ".coverage*";

/// Which cleanup behaviour applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    /// Detect the current platform
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Map an `std::env::consts::OS` value to a platform
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            _ => Self::Posix,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Posix => "posix",
        }
    }

    /// The remover implementing this platform's cleanup contract
    pub fn remover(self) -> Box<dyn PathRemover> {
        match self {
            Self::Windows => Box::new(WindowsRemover),
            Self::Posix => Box::new(PosixRemover),
        }
    }
}

/// A path `clean` is responsible for, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanTarget {
    /// A file or directory removed as a whole
    Path(PathBuf),
    /// Coverage data inside `dir`; literal on Windows, glob-expanded on POSIX
    CoverageData { dir: PathBuf },
}

impl CleanTarget {
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::CoverageData { dir } => dir.join(COVERAGE_DATA_GLOB).display().to_string(),
        }
    }
}

/// A swallowed cleanup problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub reason: String,
}

/// What a cleanup pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<CleanupWarning>,
}

/// Common cleanup contract implemented per platform
pub trait PathRemover {
    fn platform(&self) -> Platform;

    /// Remove `targets` under `root`. Absent paths never fail the call.
    fn remove_paths(&self, root: &Path, targets: &[CleanTarget]) -> FastkitResult<CleanupReport>;
}

/// Conditional removal; missing paths become warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsRemover;

impl PathRemover for WindowsRemover {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn remove_paths(&self, root: &Path, targets: &[CleanTarget]) -> FastkitResult<CleanupReport> {
        let mut report = CleanupReport::default();

        for target in targets {
            let path = match target {
                CleanTarget::Path(path) => root.join(path),
                CleanTarget::CoverageData { dir } => root.join(dir).join(COVERAGE_DATA_FILE),
            };

            match fs::symlink_metadata(&path) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "nothing to remove");
                    report.warnings.push(CleanupWarning {
                        path,
                        reason: "not found".to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(removal_error(&path, e)),
            }

            match remove_entry(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    report.warnings.push(CleanupWarning {
                        path,
                        reason: "not found".to_string(),
                    });
                }
                Err(e) => return Err(removal_error(&path, e)),
            }
        }

        Ok(report)
    }
}

/// Unconditional `rm -rf` style removal with glob-expanded coverage data
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixRemover;

impl PosixRemover {
    fn expand_coverage(dir: &Path) -> FastkitResult<Vec<PathBuf>> {
        let matcher: GlobMatcher = Glob::new(COVERAGE_DATA_GLOB)
            .map_err(|e| FastkitError::Config(format!("Invalid coverage glob: {}", e)))?
            .compile_matcher();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(removal_error(dir, e)),
        };

        let mut matches: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| matcher.is_match(entry.file_name()))
            .map(|entry| entry.path())
            .collect();
        matches.sort();
        Ok(matches)
    }
}

impl PathRemover for PosixRemover {
    fn platform(&self) -> Platform {
        Platform::Posix
    }

    fn remove_paths(&self, root: &Path, targets: &[CleanTarget]) -> FastkitResult<CleanupReport> {
        let mut report = CleanupReport::default();

        for target in targets {
            let paths = match target {
                CleanTarget::Path(path) => vec![root.join(path)],
                CleanTarget::CoverageData { dir } => Self::expand_coverage(&root.join(dir))?,
            };

            for path in paths {
                match remove_entry(&path) {
                    Ok(()) => {
                        tracing::debug!(path = %path.display(), "removed");
                        report.removed.push(path);
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(removal_error(&path, e)),
                }
            }
        }

        Ok(report)
    }
}

/// Remove a file, symlink or directory tree without following symlinks
fn remove_entry(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn removal_error(path: &Path, e: io::Error) -> FastkitError {
    FastkitError::Io(io::Error::new(
        e.kind(),
        format!("Failed to remove {}: {}", path.display(), e),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<CleanTarget> {
        vec![
            CleanTarget::Path(PathBuf::from("dist")),
            CleanTarget::Path(PathBuf::from("docs/_build")),
            CleanTarget::Path(PathBuf::from("src/htmlcov")),
            CleanTarget::Path(PathBuf::from("src/log")),
            CleanTarget::CoverageData {
                dir: PathBuf::from("src"),
            },
        ]
    }

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("dist/app.whl"), "wheel").unwrap();
        fs::create_dir_all(root.join("docs/_build/html")).unwrap();
        fs::create_dir_all(root.join("src/htmlcov")).unwrap();
        fs::write(root.join("src/htmlcov/index.html"), "<html/>").unwrap();
        fs::create_dir_all(root.join("src/log")).unwrap();
        fs::write(root.join("src/.coverage"), "data").unwrap();
        // Survivors
        fs::write(root.join("src/main.py"), "print()").unwrap();
        fs::create_dir_all(root.join("docs/source")).unwrap();
    }

    fn assert_survivors(root: &Path) {
        assert!(root.join("src/main.py").exists());
        assert!(root.join("docs/source").exists());
        assert!(root.join("src").is_dir());
    }

    #[test]
    fn test_platform_detection() {
        let platform = Platform::current();
        if cfg!(windows) {
            assert_eq!(platform, Platform::Windows);
        } else {
            assert_eq!(platform, Platform::Posix);
        }
    }

    #[test]
    fn test_from_os() {
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("linux"), Platform::Posix);
        assert_eq!(Platform::from_os("macos"), Platform::Posix);
        assert_eq!(Platform::Posix.remover().platform(), Platform::Posix);
        assert_eq!(Platform::Windows.remover().platform(), Platform::Windows);
    }

    #[test]
    fn posix_clean_on_empty_tree_succeeds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let report = PosixRemover.remove_paths(temp_dir.path(), &targets()).unwrap();
        assert!(report.removed.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn windows_clean_on_empty_tree_succeeds_with_warnings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let report = WindowsRemover
            .remove_paths(temp_dir.path(), &targets())
            .unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(report.warnings.len(), 5);
        assert!(report.warnings.iter().all(|w| w.reason == "not found"));
    }

    // A file where the source directory should be is ENOTDIR on unix, not a missing path
    #[cfg(unix)]
    #[test]
    fn clean_fails_on_both_platforms_when_source_dir_is_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("src"), "not a directory").unwrap();

        let windows = WindowsRemover.remove_paths(root, &targets());
        let posix = PosixRemover.remove_paths(root, &targets());

        for result in [windows, posix] {
            let err = result.unwrap_err();
            assert!(err.to_string().contains("Failed to remove"), "{}", err);
            assert!(err.to_string().contains("htmlcov"), "{}", err);
        }
        assert!(root.join("src").is_file());
    }

    #[test]
    fn posix_clean_removes_exactly_the_target_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        populate(root);

        let report = PosixRemover.remove_paths(root, &targets()).unwrap();

        assert_eq!(report.removed.len(), 5);
        for target in ["dist", "docs/_build", "src/htmlcov", "src/log", "src/.coverage"] {
            assert!(!root.join(target).exists(), "{} should be gone", target);
        }
        assert_survivors(root);
    }

    #[test]
    fn windows_clean_removes_exactly_the_target_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        populate(root);

        let report = WindowsRemover.remove_paths(root, &targets()).unwrap();

        assert_eq!(report.removed.len(), 5);
        assert!(report.warnings.is_empty());
        for target in ["dist", "docs/_build", "src/htmlcov", "src/log", "src/.coverage"] {
            assert!(!root.join(target).exists(), "{} should be gone", target);
        }
        assert_survivors(root);
    }

    #[test]
    fn posix_expands_coverage_shards_windows_does_not() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/.coverage.host.1234"), "shard").unwrap();
        fs::write(root.join("src/.coveragerc"), "[run]").unwrap();
        fs::write(root.join("src/coverage.xml"), "<xml/>").unwrap();

        let coverage = [CleanTarget::CoverageData {
            dir: PathBuf::from("src"),
        }];

        let report = WindowsRemover.remove_paths(root, &coverage).unwrap();
        assert!(report.removed.is_empty());
        assert!(root.join("src/.coverage.host.1234").exists());

        let report = PosixRemover.remove_paths(root, &coverage).unwrap();
        assert_eq!(report.removed.len(), 2);
        assert!(!root.join("src/.coverage.host.1234").exists());
        assert!(!root.join("src/.coveragerc").exists());
        assert!(root.join("src/coverage.xml").exists());
    }

    #[test]
    fn posix_clean_twice_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::create_dir_all(root.join("src/htmlcov")).unwrap();
        fs::write(root.join("src/.coverage"), "data").unwrap();

        let first = PosixRemover.remove_paths(root, &targets()).unwrap();
        assert_eq!(
            first.removed,
            vec![
                root.join("dist"),
                root.join("src/htmlcov"),
                root.join("src/.coverage"),
            ]
        );

        let second = PosixRemover.remove_paths(root, &targets()).unwrap();
        assert!(second.removed.is_empty());
    }
}
