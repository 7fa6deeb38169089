// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Name and version helpers shared by the peering matcher and the checks.

use super::Deprule;

/// Prefix of automatically generated shared library dependencies.
pub const SHARED_LIB_PREFIX: &str = "lib";

const ISA_OPEN: char = '(';

/// Strip an ISA qualifier such as `(x86-64)` from a requirement name.
///
/// ```
/// use rpmdeps_inspector::deprule::strip_isa;
///
/// assert_eq!(strip_isa("foo-libs(x86-64)"), "foo-libs");
/// assert_eq!(strip_isa("libfoo.so.1()(64-bit)"), "libfoo.so.1");
/// assert_eq!(strip_isa("foo"), "foo");
/// ```
#[must_use]
pub fn strip_isa(name: &str) -> &str {
    name.split_once(ISA_OPEN).map_or(name, |(stripped, _)| stripped)
}

/// Build the `version-release` string, prefixed with `epoch:` for a non-zero epoch.
#[must_use]
pub fn format_evr(epoch: u64, version: &str, release: &str) -> String {
    if epoch == 0 {
        format!("{version}-{release}")
    } else {
        format!("{epoch}:{version}-{release}")
    }
}

/// Compare two requirement names, ignoring ISA qualifiers when either side has one.
///
/// This is the loose comparison used to peer rules and to find providers; classification
/// uses the stricter [`deprules_match`].
#[must_use]
pub fn requirements_match(a: &str, b: &str) -> bool {
    a == b || ((a.contains(ISA_OPEN) || b.contains(ISA_OPEN)) && strip_isa(a) == strip_isa(b))
}

/// Split a trailing architecture qualifier such as `(x86-64)` or `(aarch-64)` off a name.
///
/// Only `(<arch>-32)` and `(<arch>-64)` count; `perl(Foo)` or `()(64-bit)` are part of the
/// capability name.
fn split_arch_qualifier(name: &str) -> Option<&str> {
    let (base, qualifier) = name.strip_suffix(')')?.rsplit_once(ISA_OPEN)?;
    let (arch, bits) = qualifier.split_once('-')?;
    let is_arch = !arch.is_empty() && arch.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    (is_arch && matches!(bits, "32" | "64") && !base.is_empty()).then_some(base)
}

/// Byte-compare two requirement names, tolerating only an added or dropped trailing
/// architecture qualifier.
fn requirements_equal(a: &str, b: &str) -> bool {
    a == b || split_arch_qualifier(a) == Some(b) || split_arch_qualifier(b) == Some(a)
}

/// Whether two rules declare the same thing.
///
/// Kind, operator and version have to be identical. The requirements have to be identical
/// too, except that a rule which only gained or lost an architecture qualifier such as
/// `(x86-64)` still counts as the same rule. Other parenthesized capabilities, like
/// `perl(Foo)` or `pkgconfig(bar)`, are compared byte for byte.
#[must_use]
pub fn deprules_match(a: &Deprule, b: &Deprule) -> bool {
    a.kind() == b.kind()
        && a.operator() == b.operator()
        && a.version() == b.version()
        && requirements_equal(a.requirement(), b.requirement())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deprule::{DepruleKind, Operator};

    #[test]
    fn test_strip_isa_truncates_at_first_paren() {
        assert_eq!(strip_isa("foo(x86-64)"), "foo");
        assert_eq!(strip_isa("(foo or bar)"), "");
        assert_eq!(strip_isa("plain"), "plain");
        assert_eq!(strip_isa(""), "");
    }

    #[test]
    fn test_format_evr() {
        assert_eq!(format_evr(0, "1.0", "1.fc40"), "1.0-1.fc40");
        assert_eq!(format_evr(2, "1.0", "1"), "2:1.0-1");
    }

    #[test]
    fn test_requirements_match() {
        assert!(requirements_match("foo", "foo"));
        assert!(requirements_match("foo(x86-64)", "foo"));
        assert!(requirements_match("foo", "foo(x86-32)"));
        assert!(requirements_match("libfoo.so.1()(64-bit)", "libfoo.so.1"));
        assert!(!requirements_match("foo", "foo-libs"));
        assert!(!requirements_match("foo(x86-64)", "bar(x86-64)"));
    }

    #[test]
    fn test_deprules_match() {
        let a = Deprule::versioned(DepruleKind::Requires, "foo(x86-64)", Operator::Equal, "1.0");
        let b = Deprule::versioned(DepruleKind::Requires, "foo", Operator::Equal, "1.0");
        assert!(deprules_match(&a, &b));

        let c = Deprule::versioned(DepruleKind::Requires, "foo", Operator::Equal, "1.1");
        assert!(!deprules_match(&b, &c));

        let d = Deprule::versioned(DepruleKind::Requires, "foo", Operator::GreaterEqual, "1.0");
        assert!(!deprules_match(&b, &d));

        let e = Deprule::versioned(DepruleKind::Provides, "foo", Operator::Equal, "1.0");
        assert!(!deprules_match(&b, &e));

        let f = Deprule::versioned(DepruleKind::Requires, "foo(aarch-64)", Operator::Equal, "1.0");
        assert!(deprules_match(&f, &b));
        assert!(!deprules_match(&f, &a));
    }

    #[test]
    fn test_deprules_match_compares_capabilities_exactly() {
        let requires = |name: &str| Deprule::new(DepruleKind::Requires, name);

        assert!(!deprules_match(&requires("perl(Foo::Bar)"), &requires("perl(Baz::Qux)")));
        assert!(!deprules_match(&requires("perl(Foo)"), &requires("perl(Bar)")));
        assert!(!deprules_match(
            &requires("pkgconfig(gtk+-3.0)"),
            &requires("pkgconfig(qt6)")
        ));
        assert!(!deprules_match(
            &requires("libfoo.so.1()(64-bit)"),
            &requires("libfoo.so.2()(64-bit)")
        ));
        assert!(!deprules_match(&requires("foo(x86-64)"), &requires("foo(x86-32)")));
        assert!(!deprules_match(&requires("perl(Foo)"), &requires("perl")));
        assert!(!deprules_match(&requires("libfoo.so.1()(64-bit)"), &requires("libfoo.so.1")));
        assert!(deprules_match(&requires("foo(ppc-64)"), &requires("foo")));
        assert!(deprules_match(
            &requires("libfoo.so.1()(64-bit)"),
            &requires("libfoo.so.1()(64-bit)")
        ));
    }

    #[test]
    fn test_split_arch_qualifier() {
        assert_eq!(split_arch_qualifier("foo(x86-64)"), Some("foo"));
        assert_eq!(split_arch_qualifier("foo(x86-32)"), Some("foo"));
        assert_eq!(split_arch_qualifier("foo-libs(aarch-64)"), Some("foo-libs"));
        assert_eq!(split_arch_qualifier("perl(Foo)"), None);
        assert_eq!(split_arch_qualifier("pkgconfig(gtk+-3.0)"), None);
        assert_eq!(split_arch_qualifier("libfoo.so.1()(64-bit)"), None);
        assert_eq!(split_arch_qualifier("(x86-64)"), None);
        assert_eq!(split_arch_qualifier("foo"), None);
    }
}
