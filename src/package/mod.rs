// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Package headers of the before and after builds and the peers pairing them up.

mod header;
mod loader;
mod manifest;
mod peer;
mod rpm;

use std::path::Path;
use tracing::{debug, info};

pub use header::{Header, SRPM_ARCH_NAME};
pub use loader::{LoadError, LoadResult};
pub use peer::{PackagePeer, Peers};

use loader::BuildLoader;
use manifest::ManifestLoader;
use rpm::RpmLoader;

/// Load the package headers of one build.
///
/// `path` is either a JSON build manifest, a single RPM file or a directory which is
/// searched recursively for RPM files. Headers are returned source package first, then
/// ordered by name and architecture.
///
/// # Errors
/// Returns an error if the build type is unsupported or the packages cannot be read.
pub fn load_build(path: &Path) -> LoadResult<Vec<Header>> {
    info!("Loading build: path={}", path.display());

    let mut headers = if path.is_dir() {
        RpmLoader::load_dir(path)?
    } else {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| LoadError::UnsupportedBuildType {
                extension: "unknown".to_string(),
            })?;
        match extension {
            ManifestLoader::EXTENSION => ManifestLoader::load(path)?,
            RpmLoader::EXTENSION => RpmLoader::load(path)?,
            _ => {
                return Err(LoadError::UnsupportedBuildType {
                    extension: extension.to_string(),
                })
            }
        }
    };

    if headers.is_empty() {
        return Err(LoadError::NoPackages {
            path: path.to_path_buf(),
        });
    }
    sort_headers(&mut headers);

    debug!(
        "Loaded build: path={}, packages={}",
        path.display(),
        headers.len()
    );
    Ok(headers)
}

fn sort_headers(headers: &mut [Header]) {
    headers.sort_by(|a, b| {
        b.is_source()
            .cmp(&a.is_source())
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.arch().cmp(b.arch()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_build_sorts_source_first() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"packages": [
                {{"name": "foo-libs", "version": "1.0", "release": "1", "arch": "x86_64"}},
                {{"name": "foo", "version": "1.0", "release": "1", "arch": "x86_64"}},
                {{"name": "foo", "version": "1.0", "release": "1", "arch": "i686"}},
                {{"name": "foo", "version": "1.0", "release": "1", "source": true}}
            ]}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let headers = load_build(file.path()).unwrap();
        let order: Vec<(&str, &str)> = headers.iter().map(|h| (h.name(), h.arch())).collect();
        assert_eq!(
            order,
            [
                ("foo", "src"),
                ("foo", "i686"),
                ("foo", "x86_64"),
                ("foo-libs", "x86_64")
            ]
        );
    }

    #[test]
    fn test_load_build_unsupported_extension() {
        let file = Builder::new().suffix(".deb").tempfile().unwrap();
        let result = load_build(file.path());
        assert!(matches!(
            result,
            Err(LoadError::UnsupportedBuildType { extension }) if extension == "deb"
        ));
    }

    #[test]
    fn test_load_build_empty_manifest() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"packages": []}}"#).unwrap();
        file.flush().unwrap();
        assert!(matches!(
            load_build(file.path()),
            Err(LoadError::NoPackages { .. })
        ));
    }
}
