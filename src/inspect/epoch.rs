// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Packages with an epoch have to use it wherever a dependency pins their version-release.

use super::InspectContext;
use crate::deprule::Deprule;
use crate::package::Header;
use crate::report::{Finding, Remedy, ResultSink, Severity, Verb, WaiverAuth};

/// Report rules whose version ends in the package's `version-release` without the
/// `epoch:` prefix. Only applies to packages with a non-zero epoch.
///
/// Returns `false` if a failing finding was reported. During a rebase the findings are
/// informational only.
pub fn check_explicit_epoch<S: ResultSink + ?Sized>(
    header: &Header,
    deprules: &[Deprule],
    context: &InspectContext,
    sink: &mut S,
) -> bool {
    let epoch = header.epoch();
    if epoch == 0 || deprules.is_empty() {
        return true;
    }

    let (severity, waiver_auth) = if context.is_rebase() {
        (Severity::Informational, WaiverAuth::NotWaivable)
    } else {
        (Severity::HardFailure, WaiverAuth::WaivableByAnyone)
    };
    let verrel = format!("{}-{}", header.version(), header.release());
    let epoch_prefix = format!("{epoch}:");
    let (name, arch) = (header.name(), header.arch());

    let mut result = true;
    for deprule in deprules {
        let Some(version) = deprule.version() else {
            continue;
        };
        if !version.ends_with(&verrel) || version.starts_with(&epoch_prefix) {
            continue;
        }

        let rule = deprule.to_string();
        sink.add_result(
            Finding::new(severity, waiver_auth, Verb::Failed)
                .message(format!(
                    "Missing epoch prefix on the version-release in '{rule}' for {name} on {arch}"
                ))
                .noun(format!("'${{FILE}}' needs epoch in {name} on ${{ARCH}}"))
                .file(rule)
                .location(name, arch)
                .remedy(Remedy::Epoch),
        );
        if severity > Severity::Informational {
            result = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deprule::DepruleList;

    fn rules(texts: &[&str]) -> DepruleList {
        texts.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn header(epoch: u64) -> Header {
        Header::new("foo", "1.0", "1", "x86_64").with_epoch(epoch)
    }

    #[test]
    fn test_missing_epoch_is_flagged() {
        let deprules = rules(&[
            "Provides: foo = 1.0-1",
            "Provides: foo(x86-64) = 2:1.0-1",
            "Requires: foo-libs = 1.0-1",
            "Requires: bar >= 3.0",
            "Requires: baz",
        ]);
        let mut findings = Vec::new();
        assert!(!check_explicit_epoch(
            &header(2),
            &deprules,
            &InspectContext::default(),
            &mut findings
        ));

        let flagged: Vec<&str> = findings.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(flagged, ["Provides: foo = 1.0-1", "Requires: foo-libs = 1.0-1"]);
        assert!(findings.iter().all(|f| {
            f.severity == Severity::HardFailure
                && f.waiver_auth == WaiverAuth::WaivableByAnyone
                && f.remedy == Some(Remedy::Epoch)
        }));
        assert_eq!(
            findings[0].message,
            "Missing epoch prefix on the version-release in 'Provides: foo = 1.0-1' for foo on x86_64"
        );
    }

    #[test]
    fn test_zero_epoch_is_skipped() {
        let deprules = rules(&["Provides: foo = 1.0-1"]);
        let mut findings = Vec::new();
        assert!(check_explicit_epoch(
            &header(0),
            &deprules,
            &InspectContext::default(),
            &mut findings
        ));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_rebase_is_informational() {
        let deprules = rules(&["Provides: foo = 1.0-1"]);
        let mut findings = Vec::new();
        assert!(check_explicit_epoch(
            &header(2),
            &deprules,
            &InspectContext::new(true),
            &mut findings
        ));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Informational);
        assert_eq!(findings[0].waiver_auth, WaiverAuth::NotWaivable);
    }

    #[test]
    fn test_suffix_match_is_textual() {
        // "11.0-1" ends with "1.0-1" as well.
        let deprules = rules(&["Requires: other = 11.0-1"]);
        let mut findings = Vec::new();
        check_explicit_epoch(&header(1), &deprules, &InspectContext::default(), &mut findings);
        assert_eq!(findings.len(), 1);
    }
}
