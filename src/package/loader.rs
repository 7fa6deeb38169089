// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Defines the `BuildLoader` trait for reading package headers from different build formats.

use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

use super::Header;
use crate::deprule::DepruleParseError;

/// Default timeout for a single package query (30 seconds).
pub(crate) const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for build loading.
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Errors that can occur while loading a build.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to create temporary file")]
    TempFileFailed {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read {path:?}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid build manifest {path:?}")]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Command not found: {command} (package: {path:?})")]
    CommandNotFound { command: String, path: PathBuf },
    #[error("Command failed: {command} (package: {path:?})")]
    CommandFailed {
        command: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {timeout:?}: {command} (package: {path:?})")]
    CommandTimeout {
        command: String,
        path: PathBuf,
        timeout: Duration,
    },
    #[error("Query failed for package {path:?}: {reason}")]
    QueryFailed { path: PathBuf, reason: String },
    #[error("Invalid dependency in package {path:?}")]
    InvalidDeprule {
        path: PathBuf,
        #[source]
        source: DepruleParseError,
    },
    #[error("Failed to walk build directory: {path:?}")]
    WalkDirFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Unsupported build type: {extension}")]
    UnsupportedBuildType { extension: String },
    #[error("No packages found in build: {path:?}")]
    NoPackages { path: PathBuf },
}

/// Wait for a child process to complete with a timeout.
///
/// Uses platform-specific APIs (SIGCHLD on Unix) to wait for the process without polling.
/// If the timeout is reached, the process is killed.
///
/// # Returns
/// - `Ok(ExitStatus)` if the process completed within the timeout
/// - `Err(LoadError::CommandTimeout)` if the process timed out
/// - `Err(LoadError::CommandFailed)` if there was an error waiting for the process
pub(crate) fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
    package_path: &Path,
) -> LoadResult<std::process::ExitStatus> {
    let waited = child
        .wait_timeout(timeout)
        .map_err(|e| LoadError::CommandFailed {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            source: e,
        })?;

    let Some(status) = waited else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(LoadError::CommandTimeout {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            timeout,
        });
    };

    if status.code().is_some() {
        Ok(status)
    } else {
        let reason = status.signal().map_or_else(
            || "Unknown process termination".to_string(),
            |signal| format!("Process terminated by signal: {signal}"),
        );
        Err(LoadError::CommandFailed {
            command: command.to_string(),
            path: package_path.to_path_buf(),
            source: std::io::Error::other(reason),
        })
    }
}

/// Trait for loaders that read the package headers of a build.
pub(crate) trait BuildLoader {
    const EXTENSION: &'static str; // Builds are identified by their extension.

    /// Read all package headers from `path`.
    ///
    /// # Errors
    /// Returns an error if the build cannot be read.
    fn load(path: &Path) -> LoadResult<Vec<Header>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_wait_with_timeout_success() {
        let mut child = Command::new("true").spawn().unwrap();
        let status = wait_with_timeout(
            &mut child,
            DEFAULT_QUERY_TIMEOUT,
            "true",
            Path::new("x.rpm"),
        )
        .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_wait_with_timeout_kills_slow_process() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let result = wait_with_timeout(
            &mut child,
            Duration::from_millis(50),
            "sleep",
            Path::new("x.rpm"),
        );
        assert!(matches!(result, Err(LoadError::CommandTimeout { .. })));
    }
}
