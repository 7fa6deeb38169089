// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Associates each package of the after build with the same package of the before build.

use tracing::debug;

use super::Header;
use crate::deprule::{find_deprule_peers, DepruleList};

/// The same package (by name and architecture) in the before and after build.
///
/// Dependency rules are gathered lazily from the headers and kept for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct PackagePeer {
    before: Option<Header>,
    after: Option<Header>,
    before_deprules: Option<DepruleList>,
    after_deprules: Option<DepruleList>,
}

impl PackagePeer {
    #[must_use]
    pub fn new(before: Option<Header>, after: Option<Header>) -> Self {
        Self {
            before,
            after,
            before_deprules: None,
            after_deprules: None,
        }
    }

    #[must_use]
    pub fn before_header(&self) -> Option<&Header> {
        self.before.as_ref()
    }

    #[must_use]
    pub fn after_header(&self) -> Option<&Header> {
        self.after.as_ref()
    }

    #[must_use]
    pub fn before_deprules(&self) -> Option<&DepruleList> {
        self.before_deprules.as_ref()
    }

    #[must_use]
    pub fn after_deprules(&self) -> Option<&DepruleList> {
        self.after_deprules.as_ref()
    }

    pub(crate) fn after_deprules_mut(&mut self) -> Option<&mut DepruleList> {
        self.after_deprules.as_mut()
    }

    /// Gather the rule lists from the headers, unless they already have been.
    pub fn gather_deprules(&mut self) {
        if self.before_deprules.is_none() {
            self.before_deprules = self.before.as_ref().map(Header::gather_deprules);
        }
        if self.after_deprules.is_none() {
            self.after_deprules = self.after.as_ref().map(Header::gather_deprules);
        }
    }

    /// Link the before and after rules of this peer. Returns the number of new links.
    pub fn find_deprule_peers(&mut self) -> usize {
        match (&mut self.before_deprules, &mut self.after_deprules) {
            (Some(before), Some(after)) => find_deprule_peers(before, after),
            _ => 0,
        }
    }
}

/// All package peers of one inspection run.
#[derive(Debug, Clone, Default)]
pub struct Peers {
    peers: Vec<PackagePeer>,
    has_before: bool,
}

impl Peers {
    /// Create the peers of a run. `has_before` tells whether a before build was given at all.
    #[must_use]
    pub fn new(peers: Vec<PackagePeer>, has_before: bool) -> Self {
        Self { peers, has_before }
    }

    /// Pair the headers of both builds by name and architecture.
    ///
    /// The after build determines the order; packages only present in the before build
    /// are appended as peers without an after header.
    #[must_use]
    pub fn pair(before: Option<Vec<Header>>, after: Vec<Header>) -> Self {
        let has_before = before.is_some();
        let mut before: Vec<Option<Header>> =
            before.unwrap_or_default().into_iter().map(Some).collect();

        let mut peers: Vec<PackagePeer> = after
            .into_iter()
            .map(|after_header| {
                let before_header = before
                    .iter_mut()
                    .find(|candidate| {
                        candidate.as_ref().is_some_and(|b| {
                            b.name() == after_header.name() && b.arch() == after_header.arch()
                        })
                    })
                    .and_then(Option::take);
                PackagePeer::new(before_header, Some(after_header))
            })
            .collect();

        let removed: Vec<PackagePeer> = before
            .into_iter()
            .flatten()
            .map(|before_header| PackagePeer::new(Some(before_header), None))
            .collect();
        if !removed.is_empty() {
            debug!("Packages only in the before build: count={}", removed.len());
        }
        peers.extend(removed);

        Self::new(peers, has_before)
    }

    /// Whether a before build takes part in this run.
    #[must_use]
    pub fn has_before(&self) -> bool {
        self.has_before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PackagePeer> {
        self.peers.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut PackagePeer> {
        self.peers.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackagePeer> {
        self.peers.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, PackagePeer> {
        self.peers.iter_mut()
    }

    /// Find the after header of a binary subpackage by name and architecture.
    #[must_use]
    pub fn find_subpackage(&self, name: &str, arch: &str) -> Option<&Header> {
        self.iter()
            .filter_map(PackagePeer::after_header)
            .find(|h| !h.is_source() && h.arch() == arch && h.name() == name)
    }

    /// Whether the after build is a new upstream version rather than a rebuild.
    ///
    /// The source package decides; without one, the first package present in both builds.
    #[must_use]
    pub fn detect_rebase(&self) -> bool {
        let both = |peer: &&PackagePeer| peer.before.is_some() && peer.after.is_some();
        let reference = self
            .iter()
            .filter(both)
            .find(|peer| peer.after.as_ref().is_some_and(Header::is_source))
            .or_else(|| self.iter().find(both));

        match reference.map(|peer| (&peer.before, &peer.after)) {
            Some((Some(before), Some(after))) => before.version() != after.version(),
            _ => false,
        }
    }
}

impl<'a> IntoIterator for &'a Peers {
    type Item = &'a PackagePeer;
    type IntoIter = std::slice::Iter<'a, PackagePeer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deprule::Deprule;

    fn header(name: &str, version: &str, arch: &str) -> Header {
        Header::new(name, version, "1", arch)
    }

    #[test]
    fn test_pair_by_name_and_arch() {
        let before = vec![
            header("foo", "1.0", "x86_64"),
            header("foo", "1.0", "i686"),
            header("foo-old", "1.0", "x86_64"),
        ];
        let after = vec![
            header("foo", "1.0", "i686"),
            header("foo", "1.0", "x86_64"),
            header("foo-new", "1.0", "x86_64"),
        ];
        let peers = Peers::pair(Some(before), after);

        assert!(peers.has_before());
        assert_eq!(peers.len(), 4);
        let pairs: Vec<(Option<&str>, Option<&str>)> = peers
            .iter()
            .map(|p| {
                (
                    p.before_header().map(|h| h.arch()),
                    p.after_header().map(|h| h.name()),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            [
                (Some("i686"), Some("foo")),
                (Some("x86_64"), Some("foo")),
                (None, Some("foo-new")),
                (Some("x86_64"), None),
            ]
        );
    }

    #[test]
    fn test_pair_without_before_build() {
        let peers = Peers::pair(None, vec![header("foo", "1.0", "x86_64")]);
        assert!(!peers.has_before());
        assert_eq!(peers.len(), 1);
        assert!(peers.get(0).unwrap().before_header().is_none());
    }

    #[test]
    fn test_gather_is_memoized() {
        let rule: Deprule = "Requires: bar".parse().unwrap();
        let mut peer = PackagePeer::new(
            None,
            Some(header("foo", "1.0", "x86_64").with_deprules([rule])),
        );
        peer.gather_deprules();
        peer.after_deprules_mut().unwrap()[0].add_provider("bar");
        peer.gather_deprules();
        assert_eq!(peer.after_deprules().unwrap()[0].providers(), ["bar"]);
        assert!(peer.before_deprules().is_none());
    }

    #[test]
    fn test_detect_rebase_prefers_source_package() {
        let before = vec![
            header("foo", "1.0", "x86_64"),
            header("foo", "1.0", "x86_64").into_source(),
        ];
        let after = vec![
            header("foo", "1.0", "x86_64"),
            header("foo", "2.0", "x86_64").into_source(),
        ];
        assert!(Peers::pair(Some(before), after).detect_rebase());
    }

    #[test]
    fn test_detect_rebase_falls_back_to_first_peer() {
        let rebuild = Peers::pair(
            Some(vec![header("foo", "1.0", "x86_64")]),
            vec![header("foo", "1.0", "x86_64")],
        );
        assert!(!rebuild.detect_rebase());

        let rebase = Peers::pair(
            Some(vec![header("foo", "1.0", "x86_64")]),
            vec![header("foo", "1.1", "x86_64")],
        );
        assert!(rebase.detect_rebase());
    }

    #[test]
    fn test_detect_rebase_without_before_build() {
        assert!(!Peers::pair(None, vec![header("foo", "1.0", "x86_64")]).detect_rebase());
    }

    #[test]
    fn test_find_subpackage_skips_source() {
        let peers = Peers::pair(
            None,
            vec![
                header("foo", "1.0", "x86_64").into_source(),
                header("foo", "1.0", "x86_64"),
            ],
        );
        let found = peers.find_subpackage("foo", "x86_64").unwrap();
        assert!(!found.is_source());
        assert!(peers.find_subpackage("foo", "src").is_none());
    }
}
