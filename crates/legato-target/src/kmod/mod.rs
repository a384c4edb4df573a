// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Kernel-module checks.
//!
//! `kmod load`/`kmod unload` answer on the interactive shell with either a
//! success sentence or a Legato result code. The checks wait for any of the
//! possible answers and compare the one that came with the expected one.

#[cfg(test)]
mod kmod_test;

use std::time::Duration;

use legato_harness::{Budget, LogMarker, Poller, match_next};
use tracing::{debug, info};

use crate::error::TargetError;
use crate::target::{Shell, Target};

/// Possible outcomes of `kmod load`, in the order they are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadResult {
    Ok,
    Fault,
    Duplicate,
}

/// Possible outcomes of `kmod unload`, in the order they are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadResult {
    Ok,
    Fault,
    Busy,
}

impl LoadResult {
    const ALL: [Self; 3] = [Self::Ok, Self::Fault, Self::Duplicate];

    const fn index(self) -> usize {
        match self {
            Self::Ok => 0,
            Self::Fault => 1,
            Self::Duplicate => 2,
        }
    }

    /// The outcome at `index` of the answer list.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl UnloadResult {
    const ALL: [Self; 3] = [Self::Ok, Self::Fault, Self::Busy];

    const fn index(self) -> usize {
        match self {
            Self::Ok => 0,
            Self::Fault => 1,
            Self::Busy => 2,
        }
    }

    /// The outcome at `index` of the answer list.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Result of a load or unload check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmodCheck {
    /// The observed answer was the expected one.
    pub passed: bool,
    /// Index of the observed answer; `None` if none came in time.
    pub observed: Option<usize>,
}

/// Answers to `kmod load <module>.ko`.
#[must_use]
pub fn load_answers(module: &str) -> [LogMarker; 3] {
    [
        LogMarker::literal(format!("Load of module {module}.ko has been successful.")),
        LogMarker::literal("LE_FAULT"),
        LogMarker::literal("LE_DUPLICATE"),
    ]
}

/// Answers to `kmod unload <module>.ko`.
#[must_use]
pub fn unload_answers(module: &str) -> [LogMarker; 3] {
    [
        LogMarker::literal(format!("Unload of module {module}.ko has been successful.")),
        LogMarker::literal("LE_FAULT"),
        LogMarker::literal("LE_BUSY"),
    ]
}

fn check<T>(
    target: &mut T,
    command: &str,
    answers: &[LogMarker],
    expected: usize,
    timeout: Duration,
) -> Result<KmodCheck, TargetError>
where
    T: Target + ?Sized,
{
    target.sendline(command)?;
    match match_next(&mut Shell(target), answers, timeout) {
        Ok(found) => {
            debug!(command, observed = found.index, expected, "kmod answered");
            Ok(KmodCheck {
                passed: found.index == expected,
                observed: Some(found.index),
            })
        }
        Err(err) if err.is_timeout() => Ok(KmodCheck {
            passed: false,
            observed: None,
        }),
        Err(err) => Err(err.into()),
    }
}

/// Load `module` and check the answer is `expected`.
pub fn check_loading<T>(
    target: &mut T,
    module: &str,
    expected: LoadResult,
    timeout: Duration,
) -> Result<KmodCheck, TargetError>
where
    T: Target + ?Sized,
{
    let command = format!("kmod load {module}.ko");
    check(target, &command, &load_answers(module), expected.index(), timeout)
}

/// Unload `module` and check the answer is `expected`.
pub fn check_unloading<T>(
    target: &mut T,
    module: &str,
    expected: UnloadResult,
    timeout: Duration,
) -> Result<KmodCheck, TargetError>
where
    T: Target + ?Sized,
{
    let command = format!("kmod unload {module}.ko");
    check(target, &command, &unload_answers(module), expected.index(), timeout)
}

/// Returns true if `module` is listed by `lsmod`.
pub fn is_module_loaded<T>(
    target: &mut T,
    module: &str,
    timeout: Duration,
) -> Result<bool, TargetError>
where
    T: Target + ?Sized,
{
    let output = target.run(&format!("/sbin/lsmod | grep -F \"{module} \""), timeout)?;
    Ok(output.success())
}

/// Poll until `module` is loaded (or unloaded, when `loaded` is false).
pub fn wait_for_module<T>(
    target: &mut T,
    module: &str,
    loaded: bool,
    interval: Duration,
    budget: Budget,
) -> bool
where
    T: Target + ?Sized,
{
    let per_check = interval.max(Duration::from_secs(1)).saturating_mul(5);
    let outcome = Poller::new(interval, budget).run_fallible(|| {
        is_module_loaded(target, module, per_check).map(|present| present == loaded)
    });
    info!(
        module,
        loaded,
        satisfied = outcome.satisfied,
        attempts = outcome.attempts,
        "module presence"
    );
    outcome.satisfied
}

/// Returns true if `dir` contains an entry named like `file`.
pub fn file_present<T>(
    target: &mut T,
    dir: &str,
    file: &str,
    timeout: Duration,
) -> Result<bool, TargetError>
where
    T: Target + ?Sized,
{
    let output = target.run(&format!("ls \"{dir}\" | grep -F \"{file}\""), timeout)?;
    Ok(output.success())
}
