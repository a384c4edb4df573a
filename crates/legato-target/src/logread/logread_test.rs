// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the followed device log.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use legato_harness::{Direction, ScriptedLog, check_loading_order, is_present};

use super::*;

const STEP: Duration = Duration::from_millis(20);

#[test]
fn prefix_is_stripped() {
    assert_eq!(
        strip_log_prefix(
            "Jan  1 00:00:10 swi-mdm9x28 user.info Legato:  INFO | supervisor[1]/supervisor T=main | New kernel module 'a.ko'"
        ),
        "New kernel module 'a.ko'"
    );
    assert_eq!(strip_log_prefix("a | b | c | d"), "c | d");
    assert_eq!(strip_log_prefix("kernel: plain line"), "kernel: plain line");
}

#[test]
fn drain_skips_backlog() {
    let mut log = Logread::from_source(ScriptedLog::with_lines(["old 1", "old 2"]));
    assert_eq!(log.drain(STEP), 2);
    assert!(!is_present(&mut log, &LogMarker::literal("old"), STEP).unwrap());
}

#[test]
fn ordering_checks_run_on_logread() {
    let mut log = Logread::from_source(ScriptedLog::with_lines([
        "INFO | supervisor | New kernel module 'a.ko'",
        "INFO | supervisor | New kernel module 'b.ko'",
    ]));
    let outcome = check_loading_order(&mut log, Direction::Ascending, &["a", "b"], STEP);
    assert!(outcome.passed());
    assert_eq!(log.consumed(), 2);
    assert_eq!(log.last_match(), Some("INFO | supervisor | New kernel module 'b.ko'"));
}

#[test]
fn closed_log_is_reported() {
    let mut log = Logread::from_source(ScriptedLog::new().closed());
    assert!(is_present(&mut log, &LogMarker::literal("x"), STEP).is_err());
    assert!(log.is_closed());
}

#[test]
fn drain_of_ended_log_counts_backlog_and_marks_closed() {
    let mut log = Logread::from_source(ScriptedLog::with_lines(["old 1", "old 2", "old 3"]).closed());
    assert_eq!(log.drain(STEP), 3);
    assert!(log.is_closed());
    assert_eq!(log.drain(STEP), 0);
}
