// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Automatic shared library requirements between subpackages need an explicit,
//! version-locked requirement on the providing subpackage.

use super::InspectContext;
use crate::deprule::{requirements_match, strip_isa, Deprule, DepruleKind, Operator};
use crate::package::{PackagePeer, Peers};
use crate::report::{Finding, Remedy, ResultSink, Severity, Verb, WaiverAuth};

const EVR_TEMPLATE: &str = "%{version}-%{release}";
const EPOCH_EVR_TEMPLATE: &str = "%{epoch}:%{version}-%{release}";

/// The subpackages providing one shared library requirement.
struct ProviderLookup {
    rule: usize,
    providers: Vec<String>,
    first: Option<usize>,
}

fn is_lib_rule(deprule: &Deprule, kind: DepruleKind) -> bool {
    deprule.kind() == kind && deprule.is_shared_lib()
}

/// Find the peers whose after build provides `requirement`, skipping the peers of
/// `requirer` itself.
fn lookup_providers(
    peers: &Peers,
    requirer: &str,
    rule: usize,
    requirement: &str,
) -> ProviderLookup {
    let mut lookup = ProviderLookup {
        rule,
        providers: Vec::new(),
        first: None,
    };

    for (index, peer) in peers.iter().enumerate() {
        let (Some(header), Some(deprules)) = (peer.after_header(), peer.after_deprules()) else {
            continue;
        };
        if header.name() == requirer {
            continue;
        }
        let provides = deprules.iter().any(|prov| {
            is_lib_rule(prov, DepruleKind::Provides)
                && requirements_match(requirement, prov.requirement())
        });
        if !provides {
            continue;
        }

        lookup.first.get_or_insert(index);
        if !lookup.providers.iter().any(|name| name == header.name()) {
            lookup.providers.push(header.name().to_string());
        }
    }
    lookup
}

/// Look up the providers of every shared library requirement of the peer at `index`.
fn lookup_lib_requires(peers: &Peers, index: usize) -> Vec<ProviderLookup> {
    let Some(peer) = peers.get(index) else {
        return Vec::new();
    };
    let (Some(header), Some(deprules)) = (peer.after_header(), peer.after_deprules()) else {
        return Vec::new();
    };

    deprules
        .iter()
        .enumerate()
        .filter(|(_, req)| is_lib_rule(req, DepruleKind::Requires))
        .map(|(rule, req)| lookup_providers(peers, header.name(), rule, req.requirement()))
        .collect()
}

/// Verify the shared library requirements of the peer at `index`.
///
/// Every `Requires: lib...` rule gets the names of the subpackages providing it recorded
/// in its providers. If a provider exists, the package must also carry
/// `Requires: <provider> = <provider evr>`. A library provided by more than one
/// subpackage is reported as well.
///
/// Returns `false` if anything was reported.
pub fn check_explicit_lib_deps<S: ResultSink + ?Sized>(
    peers: &mut Peers,
    index: usize,
    context: &InspectContext,
    sink: &mut S,
) -> bool {
    let lookups = lookup_lib_requires(peers, index);
    if lookups.is_empty() {
        return true;
    }

    if let Some(deprules) = peers.get_mut(index).and_then(PackagePeer::after_deprules_mut) {
        for lookup in &lookups {
            for provider in &lookup.providers {
                deprules[lookup.rule].add_provider(provider);
            }
        }
    }

    let Some(peer) = peers.get(index) else {
        return true;
    };
    let (Some(header), Some(deprules)) = (peer.after_header(), peer.after_deprules()) else {
        return true;
    };
    let (name, arch) = (header.name(), header.arch());

    let mut result = true;
    for lookup in &lookups {
        let req = &deprules[lookup.rule];
        let rule = req.to_string();

        let provider = lookup
            .first
            .and_then(|first| peers.get(first))
            .and_then(PackagePeer::after_header);
        if let Some(provider) = provider {
            let evr = provider.evr();
            let explicit = deprules.iter().any(|verify| {
                verify.kind() == DepruleKind::Requires
                    && !verify.is_shared_lib()
                    && strip_isa(verify.requirement()) == provider.name()
                    && verify.operator() == Operator::Equal
                    && verify.version() == Some(evr.as_str())
            });

            if !explicit {
                let pn = provider.name();
                let (template, remedy) = if provider.epoch() > 0 {
                    (EPOCH_EVR_TEMPLATE, Remedy::ExplicitEpoch)
                } else {
                    (EVR_TEMPLATE, Remedy::Explicit)
                };
                sink.add_result(
                    Finding::new(
                        Severity::NeedsVerification,
                        WaiverAuth::WaivableByAnyone,
                        Verb::Failed,
                    )
                    .message(format!(
                        "Subpackage {name} on {arch} carries '{rule}' which comes from subpackage {pn} \
                         but does not carry an explicit package version requirement. Please add \
                         'Requires: {pn} = {template}' to the {} to avoid the need to test \
                         interoperability between various combinations of old and new subpackages.",
                        context.spec_file_label()
                    ))
                    .noun(format!(
                        "missing 'Requires: ${{FILE}} = {template}' in {name} on ${{ARCH}}"
                    ))
                    .file(pn)
                    .location(name, arch)
                    .remedy(remedy),
                );
                result = false;
            }
        }

        if req.providers().len() > 1 {
            let multiples = req.providers().join(", ");
            sink.add_result(
                Finding::new(
                    Severity::NeedsVerification,
                    WaiverAuth::WaivableByAnyone,
                    Verb::Failed,
                )
                .message(format!("Multiple subpackages provide '{rule}': {multiples}"))
                .noun(format!("{multiples} all provide '${{FILE}}' on ${{ARCH}}"))
                .file(rule)
                .location(name, arch)
                .remedy(Remedy::Multiple),
            );
            result = false;
        }
    }
    result
}
