// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Best-effort teardown.
//!
//! Cleanup after a scenario (stopping apps, restoring the golden system,
//! removing files) must not mask the scenario's own result. [`best_effort`]
//! runs such a step, logs a failure with its [`FailureKind`] and carries on.

#[cfg(test)]
mod cleanup_test;

use core::fmt::Display;

use tracing::{debug, warn};

use crate::error::{Classify, FailureKind};

/// What happened to a cleanup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The step succeeded.
    Done,
    /// The step failed and the failure was logged.
    Failed(FailureKind),
}

impl CleanupOutcome {
    /// Returns true if the step succeeded.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Run cleanup step `what`, logging instead of propagating a failure.
pub fn best_effort<T, E, F>(what: &str, step: F) -> CleanupOutcome
where
    F: FnOnce() -> Result<T, E>,
    E: Classify + Display,
{
    match step() {
        Ok(_) => {
            debug!(step = what, "cleanup done");
            CleanupOutcome::Done
        }
        Err(err) => {
            let kind = err.kind();
            warn!(step = what, %kind, "cleanup failed, continuing: {err}");
            CleanupOutcome::Failed(kind)
        }
    }
}
