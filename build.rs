// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Build script to generate RPM test fixtures for the `rpmdeps_inspector` crate.
//!
//! Two builds of a `demo` package are generated into `fixtures/rpms/{before,after}`.
//! Both consist of a `demo` subpackage whose binary links against `libdemo.so.1` and a
//! `demo-libs` subpackage providing it. Only the before build carries the explicit
//! `Requires: demo-libs = %{version}-%{release}`.
//!
//! If gcc, rpmbuild or rpmdb are not available, the script skips the fixtures and emits
//! a warning. Tests will gracefully skip when fixtures are missing.

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

const PACKAGE_NAME: &str = "demo";
const PACKAGE_VERSION: &str = "1.0.0";

/// Check if a command is available in PATH.
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Available tools for fixture generation.
struct AvailableTools {
    gcc: bool,
    rpmbuild: bool,
    rpmdb: bool,
}

impl AvailableTools {
    fn detect() -> Self {
        Self {
            gcc: command_exists("gcc"),
            rpmbuild: command_exists("rpmbuild"),
            rpmdb: command_exists("rpmdb"),
        }
    }

    fn can_build_rpm(&self) -> bool {
        self.gcc && self.rpmbuild && self.rpmdb
    }

    fn report_missing(&self) {
        let missing: Vec<&str> = [
            (self.gcc, "gcc"),
            (self.rpmbuild, "rpmbuild"),
            (self.rpmdb, "rpmdb"),
        ]
        .into_iter()
        .filter_map(|(available, tool)| (!available).then_some(tool))
        .collect();

        if !missing.is_empty() {
            println!(
                "cargo:warning=Some fixture generation tools are missing: {}. RPM test fixtures will not be generated.",
                missing.join(", ")
            );
        }
    }
}

/// One build of the demo package.
struct Build {
    dir: &'static str,
    release: &'static str,
    explicit_requires: bool,
}

const BUILDS: [Build; 2] = [
    Build {
        dir: "before",
        release: "1",
        explicit_requires: true,
    },
    Build {
        dir: "after",
        release: "2",
        explicit_requires: false,
    },
];

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let fixtures_dir = Path::new(&manifest_dir).join("fixtures/rpms");

    let tools = AvailableTools::detect();
    tools.report_missing();

    if tools.can_build_rpm() {
        for build in &BUILDS {
            generate_rpm_build(&fixtures_dir.join(build.dir), build);
        }
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=fixtures/rpms/");
}

/// Create the C sources for the demo library and binary.
fn create_c_sources(build_dir: &Path) {
    fs::write(
        build_dir.join("demo.c"),
        "#include <stdio.h>\nvoid demo(void) { printf(\"demo\\n\"); }\n",
    )
    .expect("Failed to write demo.c");
    fs::write(
        build_dir.join("main.c"),
        "void demo(void);\nint main(void) { demo(); return 0; }\n",
    )
    .expect("Failed to write main.c");
}

/// Compile `libdemo.so.1` and the `demo` binary linked against it.
fn build_package_binaries(build_dir: &Path) -> bool {
    let library = Command::new("gcc")
        .current_dir(build_dir)
        .args([
            "-shared",
            "-fPIC",
            "-Wl,-soname,libdemo.so.1",
            "-o",
            "libdemo.so.1",
            "demo.c",
        ])
        .status();
    if library.map(|s| !s.success()).unwrap_or(true) {
        return false;
    }
    if fs::copy(build_dir.join("libdemo.so.1"), build_dir.join("libdemo.so")).is_err() {
        return false;
    }

    let binary = Command::new("gcc")
        .current_dir(build_dir)
        .args(["-o", "demo", "main.c", "-L.", "-ldemo"])
        .status();
    binary.map(|s| s.success()).unwrap_or(false)
}

fn spec_content(build: &Build) -> String {
    let explicit = if build.explicit_requires {
        "Requires:       %{name}-libs%{?_isa} = %{version}-%{release}\n"
    } else {
        ""
    };
    format!(
        "Name:           {PACKAGE_NAME}
Version:        {PACKAGE_VERSION}
Release:        {release}
Summary:        Test package for dependency rule inspection
License:        MIT
BuildArch:      x86_64
{explicit}
%description
Test package for dependency rule inspection

%package libs
Summary:        Shared library of the test package

%description libs
Shared library of the test package

%files
/usr/bin/demo

%files libs
/usr/lib64/libdemo.so.1
",
        release = build.release,
    )
}

/// Generate one build of the demo package into `output_dir`.
fn generate_rpm_build(output_dir: &Path, build: &Build) {
    if output_dir.exists() {
        return; // Skip if already exists
    }

    let temp_dir = env::temp_dir().join(format!("rpmdeps_inspector_rpm_{}", build.dir));
    let _ = fs::remove_dir_all(&temp_dir);
    fs::create_dir_all(&temp_dir).expect("Failed to create temp directory");

    let rpmbuild_dir = temp_dir.join("rpmbuild");
    let rpmdb_dir = temp_dir.join("rpmdb");
    let spec_dir = rpmbuild_dir.join("SPECS");
    let package_buildroot = rpmbuild_dir.join(format!(
        "BUILDROOT/{PACKAGE_NAME}-{PACKAGE_VERSION}-{}.x86_64",
        build.release
    ));
    let build_dir = temp_dir.join("build");

    fs::create_dir_all(&spec_dir).expect("Failed to create SPECS directory");
    fs::create_dir_all(package_buildroot.join("usr/bin")).expect("Failed to create bin directory");
    fs::create_dir_all(package_buildroot.join("usr/lib64"))
        .expect("Failed to create lib directory");
    fs::create_dir_all(&rpmdb_dir).expect("Failed to create rpmdb directory");
    fs::create_dir_all(&build_dir).expect("Failed to create build directory");

    // Initialize local RPM database
    let _ = Command::new("rpmdb")
        .arg("--initdb")
        .arg("--dbpath")
        .arg(&rpmdb_dir)
        .status();

    let spec_path = spec_dir.join(format!("{PACKAGE_NAME}.spec"));
    fs::write(&spec_path, spec_content(build)).expect("Failed to write spec file");

    create_c_sources(&build_dir);
    if !build_package_binaries(&build_dir) {
        println!("cargo:warning=Failed to build binaries for RPM fixtures");
        let _ = fs::remove_dir_all(&temp_dir);
        return;
    }

    fs::copy(build_dir.join("demo"), package_buildroot.join("usr/bin/demo"))
        .expect("Failed to copy demo binary");
    fs::copy(
        build_dir.join("libdemo.so.1"),
        package_buildroot.join("usr/lib64/libdemo.so.1"),
    )
    .expect("Failed to copy libdemo.so.1");

    let output = Command::new("rpmbuild")
        .arg("--dbpath")
        .arg(&rpmdb_dir)
        .args([
            "--define",
            &format!("_topdir {}", rpmbuild_dir.display()),
            "--define",
            &format!("_rpmdir {}/RPMS", rpmbuild_dir.display()),
            "--buildroot",
        ])
        .arg(&package_buildroot)
        .arg("-bb")
        .arg(&spec_path)
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let rpms_dir = rpmbuild_dir.join("RPMS/x86_64");
            fs::create_dir_all(output_dir).expect("Failed to create fixtures directory");
            for subpackage in [PACKAGE_NAME.to_string(), format!("{PACKAGE_NAME}-libs")] {
                let rpm = format!("{subpackage}-{PACKAGE_VERSION}-{}.x86_64.rpm", build.release);
                if let Err(e) = fs::copy(rpms_dir.join(&rpm), output_dir.join(&rpm)) {
                    println!("cargo:warning=Failed to copy {rpm} to fixtures: {e}");
                }
            }
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Filter common non-error messages
            if !stderr.contains("Unable to open sqlite database")
                && !stderr.contains("cannot open Packages database")
            {
                println!("cargo:warning=rpmbuild failed: {stderr}");
            }
        }
        Err(e) => {
            println!("cargo:warning=Failed to run rpmbuild: {e}");
        }
    }

    let _ = fs::remove_dir_all(&temp_dir);
}
