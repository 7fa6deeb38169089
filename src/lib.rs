// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! A tool for comparing and verifying the dependency rules of two RPM builds.
//!
//! This crate provides functionality to:
//! - Load package headers and their Requires/Provides/Conflicts/Obsoletes rules
//! - Link the rules of the before build with the rules of the after build
//! - Classify rules as gained, retained, changed or lost
//! - Verify explicit subpackage requirements, epoch prefixes and macro expansion
//! - Generate reports on the findings

pub mod deprule;
pub mod inspect;
pub mod package;
pub mod report;

// Re-export key types for convenience
pub use deprule::{Deprule, DepruleKind, DepruleList, Operator};
pub use inspect::{inspect_rpmdeps, InspectContext};
pub use package::{load_build, Header, PackagePeer, Peers};
pub use report::{Finding, ResultSink, Results};
