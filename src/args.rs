// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rpmdeps_inspector")]
#[command(version)]
#[command(about = "Compares and verifies the dependency rules of RPM builds")]
pub(crate) struct Args {
    /// Path to the after build: a JSON build manifest, an RPM file or a directory of RPMs.
    pub after: PathBuf,

    /// Path to the file to write the inspection results in JSON format.
    pub report: PathBuf,

    /// Path to the before build to compare against, in the same formats as the after build.
    #[arg(long)]
    pub before: Option<PathBuf>,

    #[arg(
        long,
        value_enum,
        default_value_t = RebaseMode::Auto,
        long_help = "Whether the after build is a rebase to a new upstream version.\n\
                During a rebase rule changes are informational only.\n\
                'auto' compares the versions of the source packages."
    )]
    pub rebase: RebaseMode,

    /// Name of the spec file of the after build, used in remediation hints.
    #[arg(long)]
    pub spec_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RebaseMode {
    Auto,
    Yes,
    No,
}
