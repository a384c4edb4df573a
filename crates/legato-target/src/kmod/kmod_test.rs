// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for kernel-module checks.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::mock::MockTarget;
use crate::target::CommandOutput;

const STEP: Duration = Duration::from_millis(50);

#[test]
fn load_success() {
    let mut target = MockTarget::new();
    target.on_sendline(
        "kmod load L_Tools_Kmod_0021.ko",
        ["Load of module L_Tools_Kmod_0021.ko has been successful."],
    );
    let result = check_loading(&mut target, "L_Tools_Kmod_0021", LoadResult::Ok, STEP).unwrap();
    assert_eq!(result, KmodCheck { passed: true, observed: Some(0) });
    assert_eq!(target.sent_lines(), ["kmod load L_Tools_Kmod_0021.ko"]);
}

#[test]
fn duplicate_load_is_expected_outcome() {
    let mut target = MockTarget::new();
    target.on_sendline("kmod load m.ko", ["Error: LE_DUPLICATE"]);
    let result = check_loading(&mut target, "m", LoadResult::Duplicate, STEP).unwrap();
    assert!(result.passed);
    assert_eq!(result.observed.and_then(LoadResult::from_index), Some(LoadResult::Duplicate));
}

#[test]
fn busy_unload_fails_ok_expectation() {
    let mut target = MockTarget::new();
    target.on_sendline("kmod unload m.ko", ["LE_BUSY"]);
    let result = check_unloading(&mut target, "m", UnloadResult::Ok, STEP).unwrap();
    assert!(!result.passed);
    assert_eq!(result.observed.and_then(UnloadResult::from_index), Some(UnloadResult::Busy));
}

#[test]
fn silence_is_timeout() {
    let mut target = MockTarget::new();
    let result = check_unloading(&mut target, "m", UnloadResult::Ok, STEP).unwrap();
    assert_eq!(result, KmodCheck { passed: false, observed: None });
}

#[test]
fn closed_shell_is_an_error() {
    let mut target = MockTarget::new();
    target.close_shell();
    let err = check_loading(&mut target, "m", LoadResult::Ok, STEP).unwrap_err();
    assert!(matches!(err, TargetError::Expect(_)));
}

#[test]
fn lsmod_lookup() {
    let mut target = MockTarget::new();
    target.respond("/sbin/lsmod | grep -F \"gone \"", CommandOutput::failed(1, ""));
    assert!(is_module_loaded(&mut target, "present", STEP).unwrap());
    assert!(!is_module_loaded(&mut target, "gone", STEP).unwrap());
}

#[test]
fn wait_for_module_polls() {
    let mut target = MockTarget::new();
    let lsmod = "/sbin/lsmod | grep -F \"late \"";
    target
        .respond(lsmod, CommandOutput::failed(1, ""))
        .respond(lsmod, CommandOutput::failed(1, ""))
        .respond_ok(lsmod, "late 16384 0");
    assert!(wait_for_module(&mut target, "late", true, Duration::ZERO, Budget::Retries(5)));
    assert_eq!(target.commands().len(), 3);
}

#[test]
fn wait_for_unload_gives_up() {
    let mut target = MockTarget::new();
    assert!(!wait_for_module(&mut target, "stuck", false, Duration::ZERO, Budget::Retries(2)));
    assert_eq!(target.commands().len(), 3);
}

#[test]
fn file_lookup_uses_ls() {
    let mut target = MockTarget::new();
    assert!(file_present(&mut target, "/legato/systems/current/modules", "m.ko", STEP).unwrap());
    assert!(target.ran("ls \"/legato/systems/current/modules\" | grep -F \"m.ko\""));
}
