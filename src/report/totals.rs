// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Add;

use super::{Finding, Severity, Verb, WaiverAuth};

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SeverityTotals {
    pub(crate) informational: usize,
    pub(crate) needs_verification: usize,
    pub(crate) hard_failure: usize,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct VerbTotals {
    pub(crate) ok: usize,
    pub(crate) added: usize,
    pub(crate) removed: usize,
    pub(crate) changed: usize,
    pub(crate) failed: usize,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Totals {
    pub(crate) severity: SeverityTotals,
    pub(crate) verbs: VerbTotals,
    pub(crate) waivable: usize,
    pub(crate) total: usize,
}

impl Totals {
    pub(crate) fn calculate(findings: &[Finding]) -> Self {
        findings
            .par_iter()
            .fold(Totals::default, |mut totals, finding| {
                match finding.severity {
                    Severity::Informational => totals.severity.informational += 1,
                    Severity::NeedsVerification => totals.severity.needs_verification += 1,
                    Severity::HardFailure => totals.severity.hard_failure += 1,
                }
                match finding.verb {
                    Verb::Ok => totals.verbs.ok += 1,
                    Verb::Added => totals.verbs.added += 1,
                    Verb::Removed => totals.verbs.removed += 1,
                    Verb::Changed => totals.verbs.changed += 1,
                    Verb::Failed => totals.verbs.failed += 1,
                }
                if finding.waiver_auth == WaiverAuth::WaivableByAnyone {
                    totals.waivable += 1;
                }
                totals.total += 1;
                totals
            })
            .reduce(Totals::default, |a, b| a + b)
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            severity: SeverityTotals {
                informational: self.severity.informational + other.severity.informational,
                needs_verification: self.severity.needs_verification
                    + other.severity.needs_verification,
                hard_failure: self.severity.hard_failure + other.severity.hard_failure,
            },
            verbs: VerbTotals {
                ok: self.verbs.ok + other.verbs.ok,
                added: self.verbs.added + other.verbs.added,
                removed: self.verbs.removed + other.verbs.removed,
                changed: self.verbs.changed + other.verbs.changed,
                failed: self.verbs.failed + other.verbs.failed,
            },
            waivable: self.waivable + other.waivable,
            total: self.total + other.total,
        }
    }
}
