// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Reads RPM package headers using `rpm -qp --queryformat`.

use rayon::prelude::*;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;
use walkdir::WalkDir;

use super::loader::{
    wait_with_timeout, BuildLoader, LoadError, LoadResult, DEFAULT_QUERY_TIMEOUT,
};
use super::Header;
use crate::deprule::{Deprule, DepruleKind, Operator};

const NONE_VALUE: &str = "(none)";

// Six header lines followed by one tab separated line per dependency:
// kind, name, flags, version.
const QUERY_FORMAT: &str = concat!(
    "%{NAME}\n%{VERSION}\n%{RELEASE}\n%{EPOCH}\n%{ARCH}\n%{SOURCERPM}\n",
    "[Requires\t%{REQUIRENAME}\t%{REQUIREFLAGS}\t%{REQUIREVERSION}\n]",
    "[Provides\t%{PROVIDENAME}\t%{PROVIDEFLAGS}\t%{PROVIDEVERSION}\n]",
    "[Conflicts\t%{CONFLICTNAME}\t%{CONFLICTFLAGS}\t%{CONFLICTVERSION}\n]",
    "[Obsoletes\t%{OBSOLETENAME}\t%{OBSOLETEFLAGS}\t%{OBSOLETEVERSION}\n]",
);

pub(crate) struct RpmLoader;

impl BuildLoader for RpmLoader {
    const EXTENSION: &'static str = "rpm";

    fn load(path: &Path) -> LoadResult<Vec<Header>> {
        let output = query(path)?;
        Ok(vec![parse_query_output(path, &output)?])
    }
}

impl RpmLoader {
    /// Read every RPM package found below `dir`.
    ///
    /// Packages are queried in parallel; each query is subject to the default timeout.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be walked or any package cannot be read.
    pub(crate) fn load_dir(dir: &Path) -> LoadResult<Vec<Header>> {
        let mut packages: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(|e| LoadError::WalkDirFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let is_rpm = entry.path().extension().and_then(|ext| ext.to_str())
                == Some(Self::EXTENSION);
            if entry.file_type().is_file() && is_rpm {
                packages.push(entry.into_path());
            }
        }
        debug!(
            "Found RPM packages: dir={}, count={}",
            dir.display(),
            packages.len()
        );

        packages
            .par_iter()
            .map(|package| Self::load(package))
            .collect::<LoadResult<Vec<Vec<Header>>>>()
            .map(|headers| headers.into_iter().flatten().collect())
    }
}

/// Run the header query for a single package and return its standard output.
///
/// The output is captured in a temporary file so a large dependency list can never fill
/// up a pipe while we wait for `rpm` to exit.
fn query(package: &Path) -> LoadResult<String> {
    let mut capture = tempfile::tempfile().map_err(|e| LoadError::TempFileFailed { source: e })?;
    let stdout = capture
        .try_clone()
        .map_err(|e| LoadError::TempFileFailed { source: e })?;

    let mut child = match Command::new("rpm")
        .args(["-qp", "--nosignature", "--nodigest", "--queryformat", QUERY_FORMAT])
        .arg(package)
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::CommandNotFound {
                command: "rpm".to_string(),
                path: package.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(LoadError::CommandFailed {
                command: "rpm".to_string(),
                path: package.to_path_buf(),
                source: e,
            });
        }
    };

    let status = wait_with_timeout(&mut child, DEFAULT_QUERY_TIMEOUT, "rpm", package)?;
    if !status.success() {
        return Err(LoadError::QueryFailed {
            path: package.to_path_buf(),
            reason: format!(
                "rpm exited with non-zero status: {}",
                status.code().unwrap_or(-1)
            ),
        });
    }

    let mut output = String::new();
    capture
        .seek(SeekFrom::Start(0))
        .and_then(|_| capture.read_to_string(&mut output))
        .map_err(|e| LoadError::ReadFailed {
            path: package.to_path_buf(),
            source: e,
        })?;
    Ok(output)
}

/// Turn the output of [`QUERY_FORMAT`] into a header.
fn parse_query_output(package: &Path, output: &str) -> LoadResult<Header> {
    let query_failed = |reason: String| LoadError::QueryFailed {
        path: package.to_path_buf(),
        reason,
    };

    let mut lines = output.lines();
    let mut field = |tag: &str| {
        lines
            .next()
            .ok_or_else(|| query_failed(format!("Missing {tag} in rpm output")))
    };
    let name = field("NAME")?;
    let version = field("VERSION")?;
    let release = field("RELEASE")?;
    let epoch = field("EPOCH")?;
    let arch = field("ARCH")?;
    let source_rpm = field("SOURCERPM")?;

    let epoch = match epoch {
        NONE_VALUE | "" => 0,
        value => value
            .parse()
            .map_err(|_| query_failed(format!("Invalid epoch: {value}")))?,
    };

    let deprules = lines
        .filter(|line| !line.is_empty())
        .map(|line| parse_dependency_line(package, line))
        .collect::<LoadResult<Vec<Deprule>>>()?;

    let header = Header::new(name, version, release, arch)
        .with_epoch(epoch)
        .with_deprules(deprules);
    // Source packages do not reference a source package themselves.
    Ok(if source_rpm == NONE_VALUE {
        header.into_source()
    } else {
        header
    })
}

fn parse_dependency_line(package: &Path, line: &str) -> LoadResult<Deprule> {
    let query_failed = |reason: String| LoadError::QueryFailed {
        path: package.to_path_buf(),
        reason,
    };
    let mut fields = line.splitn(4, '\t');
    let (Some(kind), Some(name), Some(flags), version) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(query_failed(format!("Malformed dependency line: {line:?}")));
    };
    let kind = kind
        .parse::<DepruleKind>()
        .map_err(|e| LoadError::InvalidDeprule {
            path: package.to_path_buf(),
            source: e,
        })?;
    let flags = flags
        .parse::<u32>()
        .map_err(|_| query_failed(format!("Invalid dependency flags: {flags:?}")))?;

    Ok(match version.filter(|v| !v.is_empty()) {
        Some(version) => Deprule::versioned(kind, name, Operator::from_rpm_flags(flags), version),
        None => Deprule::new(kind, name),
    })
}
