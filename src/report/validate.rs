// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Turns a failed inspection into an error.

use anyhow::Result;
use tracing::error;

use super::Results;

/// Validate the results.
///
/// # Errors
/// Returns an error if the inspection failed.
pub fn validate_results(results: &Results) -> Result<()> {
    if results.passed {
        return Ok(());
    }

    for finding in results.failures() {
        error!(
            "{}: {} on {}: {}",
            finding.severity, finding.package, finding.arch, finding.message
        );
    }
    Err(anyhow::anyhow!(
        "Dependency rule inspection failed: {} finding(s) need verification, {} hard failure(s)",
        results.totals.severity.needs_verification,
        results.totals.severity.hard_failure
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::InspectContext;
    use crate::report::{Finding, ResultSink, Severity, Verb, WaiverAuth};

    #[test]
    fn test_validate_passed() {
        let mut results = Results::new(&InspectContext::default());
        results.complete(true);
        assert!(validate_results(&results).is_ok());
    }

    #[test]
    fn test_validate_failed() {
        let mut results = Results::new(&InspectContext::default());
        results.add_result(Finding::new(
            Severity::HardFailure,
            WaiverAuth::WaivableByAnyone,
            Verb::Failed,
        ));
        results.complete(false);

        let error = validate_results(&results).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Dependency rule inspection failed: 0 finding(s) need verification, 1 hard failure(s)"
        );
    }
}
