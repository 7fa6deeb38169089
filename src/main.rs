// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.
mod args;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{Args, RebaseMode};
use rpmdeps_inspector::inspect::{inspect_rpmdeps, InspectContext};
use rpmdeps_inspector::package::{load_build, Header, Peers};
use rpmdeps_inspector::report::{summarize_results, validate_results, Results};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let after = read_build(&args.after)?;
    let before = args.before.as_deref().map(read_build).transpose()?;
    let mut peers = Peers::pair(before, after);

    let context = create_context(&args, &peers);
    info!(
        "Inspecting dependency rules: packages={}, rebase={}",
        peers.len(),
        context.is_rebase()
    );
    let mut results = Results::new(&context);
    let passed = inspect_rpmdeps(&mut peers, &context, &mut results);
    results.complete(passed);

    write_results_to_file(&results, &args.report)?;
    summarize_results(&results);
    validate_results(&results)
}

/// Get the package headers of a build from a filepath.
///
/// # Errors
/// Returns an error if the build type is unsupported or its packages cannot be read.
fn read_build(path: &Path) -> Result<Vec<Header>> {
    load_build(path).with_context(|| format!("Failed to load build: {}", path.display()))
}

fn create_context(args: &Args, peers: &Peers) -> InspectContext {
    let rebase = match args.rebase {
        RebaseMode::Yes => true,
        RebaseMode::No => false,
        RebaseMode::Auto => peers.detect_rebase(),
    };
    let context = InspectContext::new(rebase);
    match &args.spec_file {
        Some(spec_file) => context.with_spec_file(spec_file),
        None => context,
    }
}

/// Write the results to a file.
///
/// # Errors
/// Returns an error if the results cannot be serialized to JSON or if the file cannot be created.
fn write_results_to_file(results: &Results, dest: &Path) -> Result<()> {
    info!("Writing results to file: file={}", dest.display());
    let file = File::create(dest)
        .with_context(|| format!("Failed to create JSON output file: {}", dest.display()))?;
    serde_json::to_writer_pretty(file, results)
        .with_context(|| format!("Failed to serialize results to JSON: {}", dest.display()))?;
    Ok(())
}
