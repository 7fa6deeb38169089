// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Findings, the result sink collecting them, and the public API for reporting results.

mod console;
mod findings;
mod totals;
mod validate;

pub use console::summarize_results;
pub use findings::{Finding, Remedy, ResultSink, Severity, Verb, WaiverAuth};
pub use validate::validate_results;

use serde::Serialize;

use crate::inspect::InspectContext;
use totals::Totals;

const INSPECTION_NAME: &str = "rpmdeps";

/// The collected results of one inspection run.
///
/// Findings are kept in the order they were reported. The pass flag and the totals are
/// set once the inspection is complete.
#[derive(Debug, Serialize)]
pub struct Results {
    inspection: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    spec_file: Option<String>,
    rebase: bool,
    passed: bool,
    totals: Totals,
    findings: Vec<Finding>,
}

impl Results {
    #[must_use]
    pub fn new(context: &InspectContext) -> Self {
        Self {
            inspection: INSPECTION_NAME,
            spec_file: context.spec_file().map(str::to_string),
            rebase: context.is_rebase(),
            passed: true,
            totals: Totals::default(),
            findings: Vec::new(),
        }
    }

    /// Record the outcome of the inspection and count the findings.
    pub fn complete(&mut self, passed: bool) {
        self.passed = passed;
        self.totals = Totals::calculate(&self.findings);
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// The findings that make the inspection fail.
    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| finding.is_failure())
    }
}

impl ResultSink for Results {
    fn add_result(&mut self, finding: Finding) {
        self.findings.push(finding);
    }
}
