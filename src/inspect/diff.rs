// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Classifies the linked rules of a package peer into gained, retained, changed and lost.

use super::InspectContext;
use crate::deprule::{deprules_match, strip_isa, Deprule, Operator};
use crate::package::{Header, PackagePeer, Peers};
use crate::report::{Finding, Remedy, ResultSink, Severity, Verb, WaiverAuth};

const EXPECTED_SUFFIX: &str = "; this is expected";

/// What happened to one rule between the before and the after build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<'a> {
    Gained {
        after: &'a Deprule,
    },
    Retained {
        before: &'a Deprule,
        after: &'a Deprule,
    },
    Changed {
        before: &'a Deprule,
        after: &'a Deprule,
    },
    Lost {
        before: &'a Deprule,
    },
}

/// Classify every rule of a linked pair of lists exactly once.
///
/// After rules come first in declaration order, followed by the unlinked before rules.
#[must_use]
pub fn classify<'a>(
    before: Option<&'a [Deprule]>,
    after: Option<&'a [Deprule]>,
) -> Vec<Change<'a>> {
    let before = before.unwrap_or_default();
    let after = after.unwrap_or_default();

    let mut changes: Vec<Change<'a>> = after
        .iter()
        .map(|rule| match rule.peer().and_then(|index| before.get(index)) {
            None => Change::Gained { after: rule },
            Some(peer) if deprules_match(rule, peer) => Change::Retained {
                before: peer,
                after: rule,
            },
            Some(peer) => Change::Changed {
                before: peer,
                after: rule,
            },
        })
        .collect();

    changes.extend(
        before
            .iter()
            .filter(|rule| !rule.peer().is_some_and(|index| index < after.len()))
            .map(|rule| Change::Lost { before: rule }),
    );
    changes
}

/// Whether a changed rule is the expected consequence of a new build.
///
/// During a rebase every change is expected. Otherwise the rule must pin another binary
/// subpackage of the same architecture to exactly its new `[epoch:]version-release`.
/// Rules of source packages are never expected outside of a rebase.
#[must_use]
pub fn expected_change(deprule: &Deprule, header: &Header, peers: &Peers, rebase: bool) -> bool {
    if rebase {
        return true;
    }
    if header.is_source() || deprule.operator() != Operator::Equal {
        return false;
    }
    let Some(version) = deprule.version() else {
        return false;
    };

    peers
        .find_subpackage(strip_isa(deprule.requirement()), header.arch())
        .is_some_and(|subpackage| subpackage.evr() == version)
}

fn location(header: &Header) -> String {
    if header.is_source() {
        format!("source package {}", header.name())
    } else {
        format!("subpackage {} on {}", header.name(), header.arch())
    }
}

/// Report the classified rules of `peer`.
///
/// Returns `false` if any finding needs verification.
pub fn report_changes<S: ResultSink + ?Sized>(
    peer: &PackagePeer,
    peers: &Peers,
    context: &InspectContext,
    sink: &mut S,
) -> bool {
    let Some(header) = peer.after_header() else {
        return true;
    };
    let (name, arch) = (header.name(), header.arch());
    let location = location(header);
    let noun = format!("'${{FILE}}' in {name} on ${{ARCH}}");
    let (severity, waiver_auth) = if context.is_rebase() {
        (Severity::Informational, WaiverAuth::NotWaivable)
    } else {
        (Severity::NeedsVerification, WaiverAuth::WaivableByAnyone)
    };

    let mut result = true;
    for change in classify(
        peer.before_deprules().map(Vec::as_slice),
        peer.after_deprules().map(Vec::as_slice),
    ) {
        let finding = match change {
            Change::Gained { after } => Finding::new(severity, waiver_auth, Verb::Added)
                .message(format!("Gained '{after}' in {location}"))
                .noun(noun.as_str())
                .file(after.to_string())
                .remedy(Remedy::Gained),
            Change::Retained { after, .. } => {
                Finding::new(Severity::Informational, WaiverAuth::NotWaivable, Verb::Ok)
                    .message(format!("Retained '{after}' in {location}"))
                    .noun(noun.as_str())
                    .file(after.to_string())
            }
            Change::Changed { before, after } => {
                let finding = Finding::new(severity, waiver_auth, Verb::Changed)
                    .noun(format!("'{before}' became '${{FILE}}' in {name} on ${{ARCH}}"))
                    .file(after.to_string())
                    .remedy(Remedy::Changed);
                let message = format!("Changed '{before}' to '{after}' in {location}");
                if expected_change(after, header, peers, context.is_rebase()) {
                    Finding {
                        severity: Severity::Informational,
                        waiver_auth: WaiverAuth::NotWaivable,
                        ..finding
                    }
                    .message(message + EXPECTED_SUFFIX)
                } else {
                    finding.message(message)
                }
            }
            Change::Lost { before } => Finding::new(severity, waiver_auth, Verb::Removed)
                .message(format!("Lost '{before}' in {location}"))
                .noun(noun.as_str())
                .file(before.to_string())
                .remedy(Remedy::Lost),
        }
        .location(name, arch);

        if finding.severity == Severity::NeedsVerification {
            result = false;
        }
        sink.add_result(finding);
    }
    result
}
