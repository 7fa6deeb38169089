// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Dependency rule model. A rule is a single `Requires`/`Provides`/`Conflicts`/`Obsoletes`
//! declaration with an optional version comparison.

mod compare;
mod peering;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use compare::{deprules_match, format_evr, requirements_match, strip_isa, SHARED_LIB_PREFIX};
pub use peering::find_deprule_peers;

/// Rules of one package header in one build, in declaration order.
pub type DepruleList = Vec<Deprule>;

/// Errors that can occur when parsing the textual form of a rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepruleParseError {
    #[error("Missing dependency kind in rule: {rule:?}")]
    MissingKind { rule: String },
    #[error("Unknown dependency kind: {kind:?}")]
    UnknownKind { kind: String },
    #[error("Unknown comparison operator: {operator:?}")]
    UnknownOperator { operator: String },
    #[error("Empty requirement in rule: {rule:?}")]
    EmptyRequirement { rule: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepruleKind {
    Requires,
    Provides,
    Conflicts,
    Obsoletes,
}

impl DepruleKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requires => "Requires",
            Self::Provides => "Provides",
            Self::Conflicts => "Conflicts",
            Self::Obsoletes => "Obsoletes",
        }
    }
}

impl fmt::Display for DepruleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepruleKind {
    type Err = DepruleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requires" => Ok(Self::Requires),
            "Provides" => Ok(Self::Provides),
            "Conflicts" => Ok(Self::Conflicts),
            "Obsoletes" => Ok(Self::Obsoletes),
            _ => Err(DepruleParseError::UnknownKind {
                kind: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    #[default]
    None,
    Equal,
    LessEqual,
    GreaterEqual,
    LessThan,
    GreaterThan,
}

impl Operator {
    // RPMSENSE comparison bits as stored in the *FLAGS header tags.
    const SENSE_LESS: u32 = 0x02;
    const SENSE_GREATER: u32 = 0x04;
    const SENSE_EQUAL: u32 = 0x08;

    /// Decode the comparison bits of an RPM dependency flags value.
    ///
    /// All other bits (pre-requisite markers, `rpmlib` markers, ...) are ignored.
    #[must_use]
    pub const fn from_rpm_flags(flags: u32) -> Self {
        let less = flags & Self::SENSE_LESS != 0;
        let greater = flags & Self::SENSE_GREATER != 0;
        let equal = flags & Self::SENSE_EQUAL != 0;
        match (less, greater, equal) {
            (false, false, true) => Self::Equal,
            (true, false, true) => Self::LessEqual,
            (false, true, true) => Self::GreaterEqual,
            (true, false, false) => Self::LessThan,
            (false, true, false) => Self::GreaterThan,
            _ => Self::None,
        }
    }

    /// The symbol used in spec files, `None` for unversioned rules.
    #[must_use]
    pub const fn symbol(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Equal => Some("="),
            Self::LessEqual => Some("<="),
            Self::GreaterEqual => Some(">="),
            Self::LessThan => Some("<"),
            Self::GreaterThan => Some(">"),
        }
    }
}

impl FromStr for Operator {
    type Err = DepruleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Self::Equal),
            "<=" => Ok(Self::LessEqual),
            ">=" => Ok(Self::GreaterEqual),
            "<" => Ok(Self::LessThan),
            ">" => Ok(Self::GreaterThan),
            _ => Err(DepruleParseError::UnknownOperator {
                operator: s.to_string(),
            }),
        }
    }
}

/// A single dependency rule.
///
/// `providers` and `peer` are filled in by the inspection passes; everything else is
/// fixed once the rule has been gathered from its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Deprule {
    kind: DepruleKind,
    requirement: String,
    operator: Operator,
    version: Option<String>,
    providers: Vec<String>,
    peer: Option<usize>,
}

impl Deprule {
    /// Create an unversioned rule.
    #[must_use]
    pub fn new(kind: DepruleKind, requirement: impl Into<String>) -> Self {
        Self {
            kind,
            requirement: requirement.into(),
            operator: Operator::None,
            version: None,
            providers: Vec::new(),
            peer: None,
        }
    }

    /// Create a versioned rule. An `Operator::None` drops the version.
    #[must_use]
    pub fn versioned(
        kind: DepruleKind,
        requirement: impl Into<String>,
        operator: Operator,
        version: impl Into<String>,
    ) -> Self {
        let mut rule = Self::new(kind, requirement);
        if operator != Operator::None {
            rule.operator = operator;
            rule.version = Some(version.into());
        }
        rule
    }

    #[must_use]
    pub fn kind(&self) -> DepruleKind {
        self.kind
    }

    #[must_use]
    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Subpackages found to provide this rule, in discovery order.
    #[must_use]
    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Index of the matching rule in the other build's list.
    #[must_use]
    pub fn peer(&self) -> Option<usize> {
        self.peer
    }

    /// Whether the requirement looks like an automatic shared library dependency.
    #[must_use]
    pub fn is_shared_lib(&self) -> bool {
        self.requirement.starts_with(SHARED_LIB_PREFIX)
    }

    /// Record a providing subpackage. Returns `false` if it was already known.
    pub fn add_provider(&mut self, name: &str) -> bool {
        if self.providers.iter().any(|p| p == name) {
            return false;
        }
        self.providers.push(name.to_string());
        true
    }

    /// Link this rule to its counterpart. A peer, once set, is kept.
    pub(crate) fn set_peer(&mut self, index: usize) {
        debug_assert!(self.peer.is_none(), "peer already set for {self}");
        self.peer.get_or_insert(index);
    }

    /// A copy without any state from previous inspection passes.
    #[must_use]
    pub(crate) fn detached(&self) -> Self {
        Self {
            providers: Vec::new(),
            peer: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for Deprule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.requirement)?;
        if let (Some(symbol), Some(version)) = (self.operator.symbol(), &self.version) {
            write!(f, " {symbol} {version}")?;
        }
        Ok(())
    }
}

impl FromStr for Deprule {
    type Err = DepruleParseError;

    /// Parse the canonical form, e.g. `Requires: foo >= 1.0` or `Provides: libfoo.so.1()(64-bit)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s.split_once(':').ok_or_else(|| DepruleParseError::MissingKind {
            rule: s.to_string(),
        })?;
        let kind = kind.trim().parse::<DepruleKind>()?;
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(DepruleParseError::EmptyRequirement {
                rule: s.to_string(),
            });
        }

        // Rich dependencies carry their comparisons inside the parentheses. Other names
        // have no spaces, so only a trailing `OP VERSION` pair is split off.
        if rest.starts_with('(') {
            return Ok(Self::new(kind, rest));
        }
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if let [head @ .., operator_token, version] = tokens.as_slice() {
            if let (false, Ok(operator)) = (head.is_empty(), operator_token.parse::<Operator>()) {
                let without_version = rest[..rest.len() - version.len()].trim_end();
                let requirement =
                    without_version[..without_version.len() - operator_token.len()].trim_end();
                return Ok(Self::versioned(kind, requirement, operator, *version));
            }
        }
        Ok(Self::new(kind, rest))
    }
}

impl TryFrom<String> for Deprule {
    type Error = DepruleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Deprule> for String {
    fn from(rule: Deprule) -> Self {
        rule.to_string()
    }
}
