// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! The dependency rule inspection.
//!
//! [`inspect_rpmdeps`] runs over all package peers of a build comparison in three passes:
//! 1. gather the rules of every package, link before and after rules and check for
//!    unexpanded macros,
//! 2. verify explicit shared library requirements and epoch prefixes,
//! 3. report gained, retained, changed and lost rules when a before build is present.

mod diff;
mod epoch;
mod explicit;
mod macros;

pub use diff::{classify, expected_change, report_changes, Change};
pub use epoch::check_explicit_epoch;
pub use explicit::check_explicit_lib_deps;
pub use macros::{check_unexpanded_macros, has_unexpanded_macro};

use tracing::debug;

use crate::package::Peers;
use crate::report::{Finding, ResultSink, Severity, Verb, WaiverAuth};

const DEFAULT_SPEC_FILE_LABEL: &str = "spec file";

/// Run-scoped settings of an inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectContext {
    rebase: bool,
    spec_file: Option<String>,
}

impl InspectContext {
    #[must_use]
    pub fn new(rebase: bool) -> Self {
        Self {
            rebase,
            spec_file: None,
        }
    }

    /// Name of the spec file of the after build, used in remediation messages.
    #[must_use]
    pub fn with_spec_file(mut self, spec_file: impl Into<String>) -> Self {
        self.spec_file = Some(spec_file.into());
        self
    }

    /// Whether the after build is a new upstream version.
    #[must_use]
    pub fn is_rebase(&self) -> bool {
        self.rebase
    }

    #[must_use]
    pub fn spec_file(&self) -> Option<&str> {
        self.spec_file.as_deref()
    }

    /// The spec file name, or a generic label when it is unknown.
    #[must_use]
    pub fn spec_file_label(&self) -> &str {
        self.spec_file().unwrap_or(DEFAULT_SPEC_FILE_LABEL)
    }
}

/// Inspect the dependency rules of all peers and report findings to `sink`.
///
/// Packages that only exist in the before build are not inspected. The rule lists of the
/// peers are gathered and linked in place; running the inspection again over the same
/// peers yields the same findings. When nothing failed a single passing finding is
/// reported.
///
/// Returns `true` if the inspection passed.
pub fn inspect_rpmdeps<S: ResultSink + ?Sized>(
    peers: &mut Peers,
    context: &InspectContext,
    sink: &mut S,
) -> bool {
    let mut result = true;
    debug!(
        "Inspecting dependency rules: peers={}, rebase={}",
        peers.len(),
        context.is_rebase()
    );

    for peer in peers.iter_mut() {
        if peer.after_header().is_none() {
            continue;
        }
        peer.gather_deprules();
        let linked = peer.find_deprule_peers();

        if let (Some(header), Some(deprules)) = (peer.after_header(), peer.after_deprules()) {
            debug!(
                "Gathered dependency rules: package={}, arch={}, rules={}, linked={}",
                header.name(),
                header.arch(),
                deprules.len(),
                linked
            );
            result &= check_unexpanded_macros(header.name(), header.arch(), deprules, sink);
        }
    }

    for index in 0..peers.len() {
        result &= check_explicit_lib_deps(peers, index, context, sink);

        let Some(peer) = peers.get(index) else {
            continue;
        };
        if let (Some(header), Some(deprules)) = (peer.after_header(), peer.after_deprules()) {
            result &= check_explicit_epoch(header, deprules, context, sink);
        }
    }

    if peers.has_before() {
        for peer in peers.iter() {
            result &= report_changes(peer, peers, context, sink);
        }
    }

    if result {
        sink.add_result(
            Finding::new(Severity::Informational, WaiverAuth::NotWaivable, Verb::Ok)
                .message("No problems found in the dependency rules"),
        );
    }
    result
}
