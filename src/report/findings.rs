// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Structured findings emitted by the inspection and the sink receiving them.

use serde::Serialize;
use std::fmt;

/// How serious a finding is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Informational,
    NeedsVerification,
    HardFailure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Informational => "INFO",
            Self::NeedsVerification => "VERIFY",
            Self::HardFailure => "BAD",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaiverAuth {
    NotWaivable,
    WaivableByAnyone,
}

/// What happened to the dependency rule a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Ok,
    Added,
    Removed,
    Changed,
    Failed,
}

/// Identifies the remediation hint attached to a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Remedy {
    Macros,
    Explicit,
    ExplicitEpoch,
    Multiple,
    Epoch,
    Gained,
    Lost,
    Changed,
}

impl Remedy {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Macros => "Make sure all macros used in dependency versions are defined, or escape them if the literal text is intended.",
            Self::Explicit => "Add an explicit 'Requires: <subpackage> = %{version}-%{release}' for the subpackage providing the shared library.",
            Self::ExplicitEpoch => "Add an explicit 'Requires: <subpackage> = %{epoch}:%{version}-%{release}' for the subpackage providing the shared library.",
            Self::Multiple => "Only one subpackage should provide a given shared library; move the library or filter the duplicate Provides.",
            Self::Epoch => "Prefix the version-release in the dependency with '%{epoch}:'.",
            Self::Gained => "A new dependency appeared; verify it is intended.",
            Self::Lost => "A dependency disappeared; verify it is intended.",
            Self::Changed => "A dependency changed; verify the new rule is intended.",
        }
    }
}

/// A single result of the inspection.
///
/// `noun` is a short summary template in which `${FILE}` stands for `file` and `${ARCH}`
/// for `arch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub waiver_auth: WaiverAuth,
    pub verb: Verb,
    pub message: String,
    pub noun: String,
    pub file: String,
    pub package: String,
    pub arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remedy: Option<Remedy>,
}

impl Finding {
    #[must_use]
    pub fn new(severity: Severity, waiver_auth: WaiverAuth, verb: Verb) -> Self {
        Self {
            severity,
            waiver_auth,
            verb,
            message: String::new(),
            noun: String::new(),
            file: String::new(),
            package: String::new(),
            arch: String::new(),
            remedy: None,
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn noun(mut self, noun: impl Into<String>) -> Self {
        self.noun = noun.into();
        self
    }

    #[must_use]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    #[must_use]
    pub fn location(mut self, package: &str, arch: &str) -> Self {
        self.package = package.to_string();
        self.arch = arch.to_string();
        self
    }

    #[must_use]
    pub fn remedy(mut self, remedy: Remedy) -> Self {
        self.remedy = Some(remedy);
        self
    }

    /// Whether this finding makes the inspection fail.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.severity > Severity::Informational
    }

    /// The noun with its placeholders filled in.
    #[must_use]
    pub fn summary(&self) -> String {
        self.noun
            .replace("${FILE}", &self.file)
            .replace("${ARCH}", &self.arch)
    }
}

/// Receives findings from the inspection in the order they are produced.
pub trait ResultSink {
    fn add_result(&mut self, finding: Finding);
}

impl ResultSink for Vec<Finding> {
    fn add_result(&mut self, finding: Finding) {
        self.push(finding);
    }
}
