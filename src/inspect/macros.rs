// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Flags dependency versions that still contain unexpanded spec file macros.

use crate::deprule::Deprule;
use crate::report::{Finding, Remedy, ResultSink, Severity, Verb, WaiverAuth};

const MACRO_OPEN: &str = "%{";
const MACRO_CLOSE: char = '}';

/// Whether a version string looks like it contains an unexpanded macro.
///
/// Any closing brace after the first `%{` is enough; the braces are not balanced.
#[must_use]
pub fn has_unexpanded_macro(version: &str) -> bool {
    version
        .find(MACRO_OPEN)
        .is_some_and(|start| version[start..].contains(MACRO_CLOSE))
}

/// Report every rule of `name` on `arch` whose version contains an unexpanded macro.
///
/// Returns `false` if anything was reported.
pub fn check_unexpanded_macros<S: ResultSink + ?Sized>(
    name: &str,
    arch: &str,
    deprules: &[Deprule],
    sink: &mut S,
) -> bool {
    let mut result = true;

    for deprule in deprules {
        let Some(version) = deprule.version() else {
            continue;
        };
        if !has_unexpanded_macro(version) {
            continue;
        }

        let rule = deprule.to_string();
        sink.add_result(
            Finding::new(Severity::HardFailure, WaiverAuth::WaivableByAnyone, Verb::Failed)
                .message(format!(
                    "Invalid looking {} dependency in the {name} package on {arch}: {rule}",
                    deprule.kind()
                ))
                .noun(format!("'${{FILE}}' in {name} on ${{ARCH}}"))
                .file(rule)
                .location(name, arch)
                .remedy(Remedy::Macros),
        );
        result = false;
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

    #[test]
    fn test_has_unexpanded_macro() {
        assert!(has_unexpanded_macro("%{upstream_version}"));
        assert!(has_unexpanded_macro("1.0-%{release}"));
        assert!(has_unexpanded_macro("%{?epoch}:1.0"));
        // The closing brace does not need to belong to the macro.
        assert!(has_unexpanded_macro("%{foo-1.0}"));
        assert!(has_unexpanded_macro("%{a%{b}"));
        assert!(!has_unexpanded_macro("1.0-1.fc40"));
        assert!(!has_unexpanded_macro("%{unterminated"));
        assert!(!has_unexpanded_macro("}%{"));
        assert!(!has_unexpanded_macro("%version"));
    }

    #[test]
    fn test_check_reports_each_flagged_rule() {
        let deprules = rules(&[
            "Requires: foo = %{upstream_version}",
            "Requires: bar",
            "Provides: baz = 1.0-1",
            "Conflicts: qux < %{version}-%{release}",
        ]);
        let mut findings = Vec::new();
        assert!(!check_unexpanded_macros("pkg", "x86_64", &deprules, &mut findings));

        assert_eq!(findings.len(), 2);
        let first = &findings[0];
        assert_eq!(first.severity, Severity::HardFailure);
        assert_eq!(first.waiver_auth, WaiverAuth::WaivableByAnyone);
        assert_eq!(first.verb, Verb::Failed);
        assert_eq!(first.remedy, Some(Remedy::Macros));
        assert_eq!(first.file, "Requires: foo = %{upstream_version}");
        assert_eq!(
            first.message,
            "Invalid looking Requires dependency in the pkg package on x86_64: Requires: foo = %{upstream_version}"
        );
        assert_eq!(first.noun, "'${FILE}' in pkg on ${ARCH}");
        assert_eq!(findings[1].file, "Conflicts: qux < %{version}-%{release}");
    }

    #[test]
    fn test_check_clean_list_passes() {
        let deprules = rules(&["Requires: foo = 1.0-1", "Provides: libfoo.so.1()(64-bit)"]);
        let mut findings = Vec::new();
        assert!(check_unexpanded_macros("pkg", "x86_64", &deprules, &mut findings));
        assert!(findings.is_empty());
        assert!(check_unexpanded_macros("pkg", "x86_64", &[], &mut findings));
    }
}
