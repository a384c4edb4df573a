// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The device connection contract.
//!
//! Tests drive the device through two channels: one-shot commands with an
//! exit status ([`Target::run`]) and a long-lived interactive shell
//! ([`Target::sendline`] / [`Target::expect`]) for commands whose output is
//! matched against several alternatives.


use std::time::Duration;

use legato_harness::{Budget, ExpectError, LogMarker, LogStream, Match, Poller};
use tracing::{info, warn};

use crate::error::TargetError;

/// Default wait for the device to drop off after a reboot command.
pub const DEVICE_DOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a completed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status; `-1` when the process was killed by a signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub output: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with exit status 0.
    #[must_use]
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            output: output.into(),
            stderr: String::new(),
        }
    }

    /// Output with the given exit status.
    #[must_use]
    pub fn failed(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
            stderr: String::new(),
        }
    }

    /// Returns true if the command exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Output lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }

    /// Converts a non-zero status into [`TargetError::CommandFailed`].
    pub fn check(self, command: &str) -> Result<Self, TargetError> {
        if self.success() {
            Ok(self)
        } else {
            let output = if self.stderr.is_empty() {
                self.output
            } else {
                self.stderr
            };
            Err(TargetError::CommandFailed {
                command: command.to_string(),
                exit_code: self.exit_code,
                output: output.trim_end().to_string(),
            })
        }
    }
}

/// A device under test.
pub trait Target {
    /// Target type, e.g. `wp76xx`.
    fn name(&self) -> &str;

    /// Run `command` to completion, for at most `timeout`.
    ///
    /// A non-zero exit status is not an error here; see
    /// [`CommandOutput::check`].
    fn run(&mut self, command: &str, timeout: Duration) -> Result<CommandOutput, TargetError>;

    /// Send one line to the interactive shell.
    fn sendline(&mut self, line: &str) -> Result<(), TargetError>;

    /// Wait on the interactive shell's output for one of `markers`.
    fn expect(&mut self, markers: &[LogMarker], timeout: Duration) -> Result<Match, ExpectError>;

    /// One reachability check.
    fn is_reachable(&mut self) -> bool;

    /// Pause between reachability checks.
    fn poll_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// Wait until the device stops answering. Returns true if it did.
    fn wait_for_device_down(&mut self, timeout: Duration) -> bool {
        let poller = Poller::new(self.poll_interval(), Budget::Timeout(timeout));
        let outcome = poller.run(|| !self.is_reachable());
        if !outcome.satisfied {
            warn!(?timeout, "device still reachable");
        }
        outcome.satisfied
    }

    /// Wait until the device answers again.
    fn wait_for_reboot(&mut self, timeout: Duration) -> Result<(), TargetError> {
        let poller = Poller::new(self.poll_interval(), Budget::Timeout(timeout));
        let outcome = poller.run(|| self.is_reachable());
        if outcome.satisfied {
            info!(elapsed = ?outcome.elapsed, "device is back");
            Ok(())
        } else {
            Err(TargetError::Timeout {
                command: "wait for reboot".to_string(),
                after: timeout,
            })
        }
    }

    /// Reboot the device and wait until it is reachable again.
    fn reboot(&mut self, timeout: Duration) -> Result<(), TargetError> {
        info!(target = self.name(), "rebooting device");
        match self.run("/sbin/reboot", DEVICE_DOWN_TIMEOUT) {
            Ok(_) | Err(TargetError::ConnectionLost { .. } | TargetError::Timeout { .. }) => {}
            Err(err) => return Err(err),
        }
        if !self.wait_for_device_down(DEVICE_DOWN_TIMEOUT) {
            return Err(TargetError::Timeout {
                command: "wait for device down".to_string(),
                after: DEVICE_DOWN_TIMEOUT,
            });
        }
        self.wait_for_reboot(timeout)
    }

    /// [`Target::run`] that fails on a non-zero exit status.
    fn run_checked(&mut self, command: &str, timeout: Duration) -> Result<String, TargetError> {
        self.run(command, timeout)?
            .check(command)
            .map(|out| out.output)
    }
}

/// The interactive shell of a target, viewed as a [`LogStream`].
pub struct Shell<'a, T: ?Sized>(pub &'a mut T);

impl<T: Target + ?Sized> LogStream for Shell<'_, T> {
    fn expect(&mut self, markers: &[LogMarker], timeout: Duration) -> Result<Match, ExpectError> {
        self.0.expect(markers, timeout)
    }
}
