// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Package header metadata as read from a build.

use serde::{Deserialize, Serialize};

use crate::deprule::{format_evr, Deprule, DepruleList};

/// Architecture reported for source packages.
pub const SRPM_ARCH_NAME: &str = "src";

/// The metadata of one package in one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    name: String,
    version: String,
    release: String,
    #[serde(default)]
    epoch: u64,
    #[serde(default)]
    arch: String,
    #[serde(default)]
    source: bool,
    #[serde(default)]
    deprules: DepruleList,
}

impl Header {
    /// Create a binary package header without any dependency rules.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            release: release.into(),
            epoch: 0,
            arch: arch.into(),
            source: false,
            deprules: DepruleList::new(),
        }
    }

    #[must_use]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Mark the header as a source package.
    #[must_use]
    pub fn into_source(mut self) -> Self {
        self.source = true;
        self.arch = SRPM_ARCH_NAME.to_string();
        self
    }

    #[must_use]
    pub fn with_deprules(mut self, deprules: impl IntoIterator<Item = Deprule>) -> Self {
        self.deprules = deprules.into_iter().collect();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn release(&self) -> &str {
        &self.release
    }

    /// The epoch, `0` when the package does not define one.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn arch(&self) -> &str {
        if self.source {
            SRPM_ARCH_NAME
        } else {
            &self.arch
        }
    }

    #[must_use]
    pub fn is_source(&self) -> bool {
        self.source
    }

    /// `version-release`, or `epoch:version-release` for a non-zero epoch.
    #[must_use]
    pub fn evr(&self) -> String {
        format_evr(self.epoch, &self.version, &self.release)
    }

    /// A fresh copy of the dependency rules declared by this header.
    #[must_use]
    pub fn gather_deprules(&self) -> DepruleList {
        self.deprules.iter().map(Deprule::detached).collect()
    }
}
