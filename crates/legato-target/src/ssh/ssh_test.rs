// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the SSH target.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use legato_harness::{Classify, FailureKind};

use super::*;

fn config() -> TargetConfig {
    TargetConfig::from_toml_str("name = \"wp76xx\"\nhost = \"192.168.2.2\"\n").unwrap()
}

#[test]
fn args_are_batch_mode_options() {
    let args = ssh_args(&config());
    assert!(!args.iter().any(|a| a.contains('@')));
    assert!(args.windows(2).any(|w| w == ["-o", "BatchMode=yes"]));
    assert!(args.windows(2).any(|w| w == ["-p", "22"]));
    assert!(!args.contains(&"-i".to_string()));
}

#[test]
fn args_include_identity_and_options() {
    let mut config = config();
    config.identity_file = Some(PathBuf::from("/keys/dut"));
    config.ssh_options = vec!["ServerAliveInterval=5".into()];
    let args = ssh_args(&config);
    assert!(args.windows(2).any(|w| w == ["-i", "/keys/dut"]));
    assert!(args.windows(2).any(|w| w == ["-o", "ServerAliveInterval=5"]));
}

#[test]
fn status_255_is_connection_loss() {
    let output = CommandOutput {
        exit_code: SSH_CONNECTION_FAILURE,
        output: String::new(),
        stderr: "ssh: connect to host 192.168.2.2 port 22: No route to host\n".into(),
    };
    let err = interpret_exit("legato status", output).unwrap_err();
    assert_eq!(err.kind(), FailureKind::ConnectionLost);
    assert!(err.to_string().contains("No route to host"));
}

#[test]
fn remote_failures_pass_through() {
    let output = CommandOutput::failed(1, "");
    assert_eq!(interpret_exit("false", output.clone()).unwrap(), output);
}

#[test]
fn target_reports_configured_name_and_interval() {
    let target = SshTarget::new(config());
    assert_eq!(target.name(), "wp76xx");
    assert_eq!(target.poll_interval(), Duration::from_secs(1));
}

/// An `ssh` stand-in that ignores its arguments and runs a local shell.
fn local_shell_client(dir: &Path) -> PathBuf {
    let path = dir.join("ssh");
    std::fs::write(&path, "#!/bin/sh\nexec sh\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn shell_answers_on_stderr_are_matched() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.ssh_program = local_shell_client(dir.path());
    let mut target = SshTarget::new(config);

    target.sendline("echo 'kmod load: LE_FAULT' >&2").unwrap();
    let found = target
        .expect(&[LogMarker::literal("LE_FAULT")], Duration::from_secs(5))
        .unwrap();
    assert_eq!(found.index, 0);
    assert_eq!(found.line, "kmod load: LE_FAULT");

    target.sendline("echo 'kmod load: done'").unwrap();
    let found = target
        .expect(&[LogMarker::literal("done")], Duration::from_secs(5))
        .unwrap();
    assert_eq!(found.line, "kmod load: done");
}

#[test]
fn ssh_program_defaults_to_client_on_path() {
    assert_eq!(config().ssh_program, Path::new("ssh"));
}
