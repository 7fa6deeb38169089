// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use std::path::PathBuf;

use rpmdeps_inspector::inspect::{inspect_rpmdeps, InspectContext};
use rpmdeps_inspector::package::{load_build, Peers};
use rpmdeps_inspector::report::{validate_results, Remedy, Results, Severity, Verb};

fn get_fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_peers(before: &str, after: &str) -> Peers {
    let fixtures = get_fixtures_dir();
    let before = load_build(&fixtures.join(before)).expect("Should load before build");
    let after = load_build(&fixtures.join(after)).expect("Should load after build");
    Peers::pair(Some(before), after)
}

fn inspect(peers: &mut Peers, context: &InspectContext) -> Results {
    let mut results = Results::new(context);
    let passed = inspect_rpmdeps(peers, context, &mut results);
    results.complete(passed);
    results
}

#[test]
fn test_rebuild_without_explicit_requires() {
    let mut peers = load_peers("before.json", "after.json");
    assert!(!peers.detect_rebase());

    let context = InspectContext::new(false).with_spec_file("demo.spec");
    let results = inspect(&mut peers, &context);
    assert!(!results.passed());

    let failures: Vec<_> = results.failures().collect();
    assert_eq!(failures.len(), 2, "{failures:#?}");

    let explicit = failures[0];
    assert_eq!(explicit.remedy, Some(Remedy::Explicit));
    assert_eq!(explicit.package, "demo");
    assert_eq!(explicit.file, "demo-libs");
    assert!(explicit
        .message
        .contains("'Requires: demo-libs = %{version}-%{release}' to the demo.spec"));

    let lost = failures[1];
    assert_eq!(lost.verb, Verb::Removed);
    assert_eq!(lost.file, "Requires: demo-libs(x86-64) = 1.0.0-1");
    assert_eq!(lost.severity, Severity::NeedsVerification);

    // Release bumps of the packages' own version locks are expected.
    let changed: Vec<_> = results
        .findings()
        .iter()
        .filter(|f| f.verb == Verb::Changed)
        .collect();
    assert_eq!(changed.len(), 4);
    assert!(changed.iter().all(|f| {
        f.severity == Severity::Informational && f.message.ends_with("; this is expected")
    }));

    let error = validate_results(&results).unwrap_err();
    assert!(error.to_string().contains("2 finding(s) need verification"));
}

#[test]
fn test_rebase_is_informational() {
    let mut peers = load_peers("before.json", "rebase.json");
    assert!(peers.detect_rebase());

    let results = inspect(&mut peers, &InspectContext::new(true));
    assert!(results.passed(), "{:#?}", results.failures().collect::<Vec<_>>());
    assert!(validate_results(&results).is_ok());

    let epoch: Vec<_> = results
        .findings()
        .iter()
        .filter(|f| f.remedy == Some(Remedy::Epoch))
        .collect();
    assert_eq!(epoch.len(), 1);
    assert_eq!(epoch[0].file, "Provides: demo = 2.0.0-1");

    let source_changes: Vec<(Verb, &str)> = results
        .findings()
        .iter()
        .filter(|f| f.arch == "src")
        .map(|f| (f.verb, f.file.as_str()))
        .collect();
    assert_eq!(
        source_changes,
        [
            (Verb::Ok, "Requires: gcc"),
            (Verb::Added, "Requires: cmake"),
            (Verb::Removed, "Requires: make"),
        ]
    );
    assert_eq!(results.findings().last().unwrap().verb, Verb::Ok);
}

#[test]
fn test_results_json_output() {
    let mut peers = load_peers("before.json", "after.json");
    let results = inspect(&mut peers, &InspectContext::new(false));

    let file = tempfile::NamedTempFile::new().expect("Should create temp file");
    serde_json::to_writer_pretty(file.as_file(), &results).expect("Should write results");
    let content = std::fs::read_to_string(file.path()).expect("Should read results");
    let json: serde_json::Value = serde_json::from_str(&content).expect("Should parse JSON");

    assert_eq!(json["inspection"], "rpmdeps");
    assert_eq!(json["passed"], false);
    assert_eq!(json["rebase"], false);
    let findings = json["findings"].as_array().expect("findings should be an array");
    assert_eq!(
        json["totals"]["total"].as_u64(),
        Some(findings.len() as u64)
    );
    assert_eq!(json["totals"]["severity"]["needs_verification"], 2);
    assert!(findings
        .iter()
        .all(|f| f["severity"].is_string() && f["message"].is_string()));
}

#[test]
fn test_rpm_fixture_builds() {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/rpms");
    let (before, after) = (fixtures.join("before"), fixtures.join("after"));
    if !before.exists() || !after.exists() {
        eprintln!(
            "Skipping test: RPM fixtures not found at {}. They are generated by build.rs when gcc, rpmbuild and rpmdb are available.",
            fixtures.display()
        );
        return;
    }

    let before = load_build(&before).expect("Should load before RPMs");
    let after = load_build(&after).expect("Should load after RPMs");
    let mut peers = Peers::pair(Some(before), after);
    assert!(!peers.detect_rebase());

    let results = inspect(&mut peers, &InspectContext::new(false));
    assert!(!results.passed());
    assert!(results
        .failures()
        .any(|f| f.remedy == Some(Remedy::Explicit) && f.file == "demo-libs"));
}
