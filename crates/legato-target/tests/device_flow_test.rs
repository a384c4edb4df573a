// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Device-level flows against the mock target.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::time::Duration;

use legato_harness::{Direction, ScriptedLog, best_effort, check_loading_order};
use legato_target::kmod::{self, LoadResult};
use legato_target::{Legato, Logread, MockTarget, SystemStatus, Target, TargetConfig};

const STEP: Duration = Duration::from_millis(50);

fn config() -> TargetConfig {
    TargetConfig::from_toml_str("name = \"wp76xx\"\nhost = \"dut\"\n").unwrap()
}

#[test]
fn test_kmod_load_then_order_in_log() {
    let mut target = MockTarget::new();
    target.on_sendline("kmod load dep.ko", ["Load of module dep.ko has been successful."]);
    let check = kmod::check_loading(&mut target, "dep", LoadResult::Ok, STEP).unwrap();
    assert!(check.passed);

    let mut log = Logread::from_source(ScriptedLog::with_lines([
        "Jan 1 INFO | supervisor | New kernel module 'base.ko'",
        "Jan 1 INFO | supervisor | New kernel module 'dep.ko'",
    ]));
    let outcome = check_loading_order(&mut log, Direction::Ascending, &["base", "dep"], STEP);
    assert!(outcome.passed(), "{outcome}");
}

#[test]
fn test_golden_restore_when_status_not_good() {
    let mut target = MockTarget::new();
    target
        .respond_ok("legato status", "Current system index: 3\nCurrent system status: tried 1\n")
        .respond_ok("cm info", "Device: WP7607\n");
    let mut legato = Legato::new(target, &config());

    if legato.system_status().unwrap() != SystemStatus::Good {
        legato.restore_golden_legato().unwrap();
    }
    assert!(legato.target().ran("legato restore golden"));
}

#[test]
fn test_cleanup_after_lost_device_continues() {
    let mut target = MockTarget::new();
    target.respond_lost("app remove helloWorld");
    let mut legato = Legato::new(target, &config());

    let removed = best_effort("remove helloWorld", || legato.remove_app("helloWorld"));
    assert!(!removed.is_done());
    let cleared = best_effort("clear log", || legato.clear_target_log());
    assert!(cleared.is_done());
}

#[test]
fn test_reboot_cycle() {
    let mut target = MockTarget::new();
    target.with_reachability([true, false, true]);
    target.reboot(Duration::from_secs(2)).unwrap();
    assert!(target.ran("/sbin/reboot"));
}
