// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Reads builds described by a JSON manifest.
//!
//! ```json
//! {"packages": [{"name": "foo", "version": "1.0", "release": "1", "epoch": 0,
//!                "arch": "x86_64", "deprules": ["Requires: libfoo.so.1()(64-bit)"]}]}
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::loader::{BuildLoader, LoadError, LoadResult};
use super::Header;

#[derive(Debug, Deserialize)]
struct Manifest {
    packages: Vec<Header>,
}

pub(crate) struct ManifestLoader;

impl BuildLoader for ManifestLoader {
    const EXTENSION: &'static str = "json";

    fn load(path: &Path) -> LoadResult<Vec<Header>> {
        let content = fs::read_to_string(path).map_err(|e| LoadError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| LoadError::InvalidManifest {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(manifest.packages)
    }
}
