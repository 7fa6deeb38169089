// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Formats and prints result summaries to the console.

use comfy_table::{Cell, Table};

use super::{Remedy, Results};

/// Summarize the results to the console.
///
/// Prints the finding statistics by severity and by verb, followed by a table of every
/// finding that makes the inspection fail.
pub fn summarize_results(results: &Results) {
    println!("Inspection: {}", results.inspection);
    if let Some(spec_file) = &results.spec_file {
        println!("Spec file: {spec_file}");
    }
    println!("Rebase: {}", if results.rebase { "yes" } else { "no" });
    println!("Result: {}\n", if results.passed { "passed" } else { "failed" });

    println!("{}\n", severity_table(results));
    println!("{}\n", verb_table(results));

    let failures = failures_table(results);
    if failures.row_count() > 0 {
        println!("{failures}");
        println!(
            "\nTotal: {} finding(s) need attention",
            failures.row_count()
        );
    }
}

/// Create a table with the default preset styling.
fn default_table_preset() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

fn bold(text: &str) -> Cell {
    Cell::new(text).add_attribute(comfy_table::Attribute::Bold)
}

/// Create a table showing finding counts per severity.
fn severity_table(results: &Results) -> Table {
    let severity = &results.totals.severity;
    let mut table = default_table_preset();
    table
        .set_header(vec![bold("Severity"), bold("Count")])
        .add_row(vec![Cell::new("Informational"), Cell::new(severity.informational)])
        .add_row(vec![
            Cell::new("Needs verification"),
            Cell::new(severity.needs_verification),
        ])
        .add_row(vec![Cell::new("Hard failure"), Cell::new(severity.hard_failure)])
        .add_row(vec![
            Cell::new("Waivable"),
            Cell::new(results.totals.waivable),
        ])
        .add_row(vec![
            bold("Total"),
            Cell::new(results.totals.total).add_attribute(comfy_table::Attribute::Bold),
        ]);
    table
}

/// Create a table showing finding counts per verb.
fn verb_table(results: &Results) -> Table {
    let verbs = &results.totals.verbs;
    let mut table = default_table_preset();
    table
        .set_header(vec![bold("Rule Change"), bold("Count")])
        .add_row(vec![Cell::new("Retained"), Cell::new(verbs.ok)])
        .add_row(vec![Cell::new("Gained"), Cell::new(verbs.added)])
        .add_row(vec![Cell::new("Lost"), Cell::new(verbs.removed)])
        .add_row(vec![Cell::new("Changed"), Cell::new(verbs.changed)])
        .add_row(vec![Cell::new("Failed checks"), Cell::new(verbs.failed)]);
    table
}

/// Create a table listing the findings that make the inspection fail.
fn failures_table(results: &Results) -> Table {
    let mut table = default_table_preset();
    table.set_header(vec![
        bold("Severity"),
        bold("Package"),
        bold("Arch"),
        bold("Finding"),
        bold("Remedy"),
    ]);
    for finding in results.failures() {
        table.add_row(vec![
            Cell::new(finding.severity),
            Cell::new(&finding.package),
            Cell::new(&finding.arch),
            Cell::new(finding.summary()),
            Cell::new(finding.remedy.map_or("", Remedy::description)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::InspectContext;
    use crate::report::{Finding, Remedy, ResultSink, Severity, Verb, WaiverAuth};

    #[test]
    fn test_failures_table_lists_only_failures() {
        let mut results = Results::new(&InspectContext::default());
        results.add_result(
            Finding::new(Severity::HardFailure, WaiverAuth::WaivableByAnyone, Verb::Failed)
                .noun("'${FILE}' in foo on ${ARCH}")
                .file("Requires: bar = %{version}")
                .location("foo", "x86_64")
                .remedy(Remedy::Macros),
        );
        results.add_result(Finding::new(
            Severity::Informational,
            WaiverAuth::NotWaivable,
            Verb::Ok,
        ));
        results.complete(false);

        let mut table = failures_table(&results);
        assert_eq!(table.row_count(), 1);
        table.set_width(400);
        let rendered = table.to_string();
        assert!(rendered.contains("BAD"));
        assert!(rendered.contains("'Requires: bar = %{version}' in foo on x86_64"));
        assert!(rendered.contains("Make sure all macros used in dependency versions are defined"));
    }
}
