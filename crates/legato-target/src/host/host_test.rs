// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the build tool wrappers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;

use super::*;
use crate::config::ConfigError;

fn toolchain(with_legato_root: bool) -> ToolchainEnv {
    ToolchainEnv::resolve("wp76xx", |key| match key {
        "WP76XX_SYSROOT" => Some("/opt/sysroot".to_string()),
        "LEGATO_ROOT" if with_legato_root => Some("/src/legato".to_string()),
        _ => None,
    })
    .unwrap()
}

#[test]
fn update_file_is_named_after_target() {
    let builder = Builder::new(toolchain(false), "192.168.2.2", "/tmp/work");
    assert_eq!(
        builder.update_file("helloWorld"),
        Path::new("/tmp/work/helloWorld.wp76xx.update")
    );
}

#[test]
fn mkapp_gets_target_and_options() {
    let builder = Builder::new(toolchain(false), "dut", "/tmp/work");
    let cmd = builder.mkapp_command(
        Path::new("/res/helloWorld.adef"),
        &BuildOptions::default().arg("-i").arg("/res/interfaces"),
    );
    assert_eq!(cmd.program(), "mkapp");
    assert_eq!(
        cmd.arguments(),
        ["-t", "wp76xx", "-i", "/res/interfaces", "/res/helloWorld.adef"]
    );
}

#[test]
fn tools_dir_prefixes_programs() {
    let builder = Builder::new(toolchain(true), "dut", "/tmp/work").with_tools_dir("/opt/legato/bin");
    let cmd = builder.mksys_command(Path::new("sys.sdef"), &BuildOptions::default());
    assert_eq!(cmd.program(), "/opt/legato/bin/mksys");
}

#[test]
fn update_targets_device() {
    let builder = Builder::new(toolchain(false), "10.0.0.7", "/tmp/work");
    let cmd = builder.update_command(Path::new("/tmp/work/a.wp76xx.update"));
    assert_eq!(cmd.program(), "update");
    assert_eq!(cmd.arguments(), ["/tmp/work/a.wp76xx.update", "10.0.0.7"]);
}

#[test]
fn system_build_needs_legato_root() {
    let dir = tempfile::tempdir().unwrap();
    let builder = Builder::new(toolchain(false), "dut", dir.path());
    let err = builder
        .make_sys(Path::new("sys.sdef"), &BuildOptions::default())
        .unwrap_err();
    assert!(matches!(err, TargetError::Config(ConfigError::Missing(_))));
}

#[test]
fn missing_tool_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let builder = Builder::new(toolchain(false), "dut", dir.path()).with_tools_dir(dir.path());
    let err = builder
        .make_app(Path::new("a.adef"), &BuildOptions::failing())
        .unwrap_err();
    assert!(matches!(err, TargetError::Spawn { .. }));
}

/// Write stand-ins for the build tools into `dir`. Each appends its name
/// and arguments to `calls.log` in its working directory and exits with
/// the status given for it.
fn fake_tools(dir: &Path, statuses: &[(&str, i32)]) {
    for tool in ["mkapp", "mksys", "update"] {
        let status = statuses
            .iter()
            .find(|(name, _)| *name == tool)
            .map_or(0, |(_, status)| *status);
        let path = dir.join(tool);
        let script = format!("#!/bin/sh\necho \"{tool} $*\" >> calls.log\nexit {status}\n");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

fn calls(work: &Path) -> Vec<String> {
    std::fs::read_to_string(work.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn make_install_builds_then_updates() {
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    fake_tools(tools.path(), &[]);
    let builder = Builder::new(toolchain(false), "10.0.0.7", work.path()).with_tools_dir(tools.path());

    builder.make_install("helloWorld", Path::new("/res/helloWorld")).unwrap();

    let update_file = work.path().join("helloWorld.wp76xx.update");
    assert_eq!(
        calls(work.path()),
        [
            "mkapp -t wp76xx /res/helloWorld/helloWorld.adef".to_string(),
            format!("update {} 10.0.0.7", update_file.display()),
        ]
    );
}

#[test]
fn make_install_sys_builds_then_updates() {
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    fake_tools(tools.path(), &[]);
    let builder = Builder::new(toolchain(true), "dut", work.path()).with_tools_dir(tools.path());

    builder
        .make_install_sys("kmod_order", Path::new("/res/kmod/kmod_order.sdef"))
        .unwrap();

    let log = calls(work.path());
    assert_eq!(log[0], "mksys -t wp76xx /res/kmod/kmod_order.sdef");
    assert!(log[1].starts_with("update ") && log[1].contains("kmod_order.wp76xx.update"));
    assert_eq!(log.len(), 2);
}

#[test]
fn failed_build_skips_install() {
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    fake_tools(tools.path(), &[("mkapp", 1)]);
    let builder = Builder::new(toolchain(false), "dut", work.path()).with_tools_dir(tools.path());

    let err = builder.make_install("broken", Path::new("/res")).unwrap_err();
    assert!(matches!(err, TargetError::CommandFailed { exit_code: 1, .. }));
    assert_eq!(calls(work.path()), ["mkapp -t wp76xx /res/broken.adef"]);
}

#[test]
fn install_update_reports_failure() {
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    fake_tools(tools.path(), &[("update", 2)]);
    let builder = Builder::new(toolchain(false), "dut", work.path()).with_tools_dir(tools.path());

    let err = builder.install_update(Path::new("a.wp76xx.update")).unwrap_err();
    assert!(matches!(err, TargetError::CommandFailed { exit_code: 2, .. }));
    assert_eq!(calls(work.path()), ["update a.wp76xx.update dut"]);
}

#[test]
fn expected_build_failure_is_returned() {
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    fake_tools(tools.path(), &[("mkapp", 1)]);
    let builder = Builder::new(toolchain(false), "dut", work.path()).with_tools_dir(tools.path());

    let output = builder
        .make_app(Path::new("bad.adef"), &BuildOptions::failing())
        .unwrap();
    assert_eq!(output.exit_code, 1);
}
