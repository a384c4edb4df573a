// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for best-effort cleanup.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io;
use std::time::Duration;

use super::*;
use crate::error::ExpectError;

#[test]
fn success_is_done() {
    let outcome = best_effort("stop app", || Ok::<_, io::Error>(()));
    assert_eq!(outcome, CleanupOutcome::Done);
    assert!(outcome.is_done());
}

#[test]
fn failure_is_classified() {
    let outcome = best_effort("restore golden", || {
        Err::<(), _>(io::Error::from(io::ErrorKind::ConnectionReset))
    });
    assert_eq!(outcome, CleanupOutcome::Failed(FailureKind::ConnectionLost));

    let outcome = best_effort("wait for log", || {
        Err::<(), _>(ExpectError::Timeout {
            waited: Duration::from_secs(1),
            markers: "[\"x\"]".into(),
        })
    });
    assert_eq!(outcome, CleanupOutcome::Failed(FailureKind::Timeout));

    let outcome = best_effort("rm file", || {
        Err::<(), _>(io::Error::from(io::ErrorKind::PermissionDenied))
    });
    assert_eq!(outcome, CleanupOutcome::Failed(FailureKind::Other));
}

#[test]
fn later_steps_still_run() {
    let mut ran = Vec::new();
    for name in ["first", "second"] {
        best_effort(name, || {
            ran.push(name);
            Err::<(), _>(io::Error::other("boom"))
        });
    }
    assert_eq!(ran, ["first", "second"]);
}
