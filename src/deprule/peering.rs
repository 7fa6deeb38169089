// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Pairs the rules of a package in the before build with the rules of the same package in
//! the after build.

use super::compare::requirements_match;
use super::Deprule;

/// Link every before rule with its first unclaimed counterpart in the after list.
///
/// Rules match when their kind is equal and their requirements are equal, ignoring ISA
/// qualifiers. Matching is one-to-one and deterministic: the before list is walked in
/// order and the first declared candidate wins. Rules that are already linked keep their
/// peer, so running this again over the same lists changes nothing.
///
/// Returns the number of newly linked pairs.
pub fn find_deprule_peers(before: &mut [Deprule], after: &mut [Deprule]) -> usize {
    let mut claimed: Vec<bool> = after.iter().map(|rule| rule.peer().is_some()).collect();
    let mut linked = 0;

    for (before_index, rule) in before.iter_mut().enumerate() {
        if rule.peer().is_some() {
            continue;
        }
        let candidate = after.iter().zip(&claimed).position(|(other, &taken)| {
            !taken
                && rule.kind() == other.kind()
                && requirements_match(rule.requirement(), other.requirement())
        });
        if let Some(after_index) = candidate {
            claimed[after_index] = true;
            rule.set_peer(after_index);
            after[after_index].set_peer(before_index);
            linked += 1;
        }
    }
    linked
}
