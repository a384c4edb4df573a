// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The Legato command-line tools on the device.
//!
//! [`Legato`] wraps a [`Target`] with the `legato`, `app` and `cm` commands
//! scenarios need. Command output is parsed into typed values here, in one
//! place, so callers compare [`AppState`]/[`SystemStatus`] values instead of
//! scraping text.

mod status;


use std::time::Duration;

use legato_harness::{Budget, LogMarker, Poller, lines_containing};
use tracing::{debug, info, warn};

use crate::config::{LogCommands, TargetConfig, Timeouts};
use crate::error::TargetError;
use crate::logread::strip_log_prefix;
use crate::target::Target;

pub use status::{AppState, LegatoStatus, SystemStatus, parse_app_state, parse_status};

/// File holding the probation period override, in milliseconds.
pub const PROBATION_FILE: &str = "/legato/probationPeriod";

/// Printed by `cm info` once the modem service answers.
const OPERATIONAL_MARKER: &str = "Device:";

/// Legato tooling on a target.
pub struct Legato<T> {
    target: T,
    log: LogCommands,
    timeouts: Timeouts,
}

impl<T: Target> Legato<T> {
    #[must_use]
    pub fn new(target: T, config: &TargetConfig) -> Self {
        Self {
            target,
            log: config.log.clone(),
            timeouts: config.timeouts,
        }
    }

    pub const fn target(&self) -> &T {
        &self.target
    }

    pub const fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_inner(self) -> T {
        self.target
    }

    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    fn run(&mut self, command: &str) -> Result<String, TargetError> {
        let timeout = self.timeouts.command();
        self.target.run_checked(command, timeout)
    }

    fn poller(&self, timeout: Duration) -> Poller {
        Poller::new(self.target.poll_interval(), Budget::Timeout(timeout))
    }

    // ---------------------------------------------------------------------
    // Device log
    // ---------------------------------------------------------------------

    /// Empty the device log.
    pub fn clear_target_log(&mut self) -> Result<(), TargetError> {
        let command = self.log.clear_command.clone();
        self.run(&command)?;
        debug!("device log cleared");
        Ok(())
    }

    fn raw_log(&mut self) -> Result<String, TargetError> {
        let command = self.log.snapshot_command.clone();
        self.run(&command)
    }

    /// Current log messages, without their `timestamp | process |` prefix.
    pub fn snapshot(&mut self) -> Result<Vec<String>, TargetError> {
        Ok(self
            .raw_log()?
            .lines()
            .map(|line| strip_log_prefix(line).to_string())
            .collect())
    }

    /// Messages in the current log containing `text`.
    pub fn log_lines_containing(&mut self, text: &str) -> Result<Vec<String>, TargetError> {
        let raw = self.raw_log()?;
        Ok(lines_containing(&raw, &LogMarker::literal(text))
            .into_iter()
            .map(|line| strip_log_prefix(line).to_string())
            .collect())
    }

    /// Returns true if `text` is in the current log.
    pub fn find_in_target_log(&mut self, text: &str) -> Result<bool, TargetError> {
        Ok(self.raw_log()?.contains(text))
    }

    /// Poll the log until `text` shows up. Returns false on timeout.
    pub fn wait_for_log_msg(&mut self, text: &str, timeout: Duration) -> bool {
        let found = self
            .poller(timeout)
            .run_fallible(|| self.find_in_target_log(text))
            .satisfied;
        if !found {
            warn!(text, ?timeout, "log message not seen");
        }
        found
    }

    // ---------------------------------------------------------------------
    // Apps
    // ---------------------------------------------------------------------

    /// State of app `name`.
    pub fn app_status(&mut self, name: &str) -> Result<AppState, TargetError> {
        let command = format!("app status {name}");
        let output = self.target.run(&command, self.timeouts.command())?;
        parse_app_state(&output.output)
    }

    /// Returns true if app `name` is installed.
    pub fn is_app_exist(&mut self, name: &str) -> Result<bool, TargetError> {
        Ok(self.run("app list")?.lines().any(|line| line.trim() == name))
    }

    /// Returns true if app `name` is running.
    pub fn is_app_running(&mut self, name: &str) -> Result<bool, TargetError> {
        Ok(self.app_status(name)? == AppState::Running)
    }

    /// Poll until app `name` is installed.
    pub fn wait_for_app_presence(&mut self, name: &str, timeout: Duration) -> bool {
        self.poller(timeout)
            .run_fallible(|| self.is_app_exist(name))
            .satisfied
    }

    /// Poll until app `name` is running.
    pub fn wait_for_app_running(&mut self, name: &str, timeout: Duration) -> bool {
        self.poller(timeout)
            .run_fallible(|| self.is_app_running(name))
            .satisfied
    }

    pub fn start_app(&mut self, name: &str) -> Result<(), TargetError> {
        self.run(&format!("app start {name}")).map(drop)
    }

    pub fn stop_app(&mut self, name: &str) -> Result<(), TargetError> {
        self.run(&format!("app stop {name}")).map(drop)
    }

    pub fn restart_app(&mut self, name: &str) -> Result<(), TargetError> {
        self.run(&format!("app restart {name}")).map(drop)
    }

    pub fn remove_app(&mut self, name: &str) -> Result<(), TargetError> {
        self.run(&format!("app remove {name}")).map(drop)
    }

    /// Set `key` to `value` in the device config tree.
    pub fn config_set(&mut self, key: &str, value: &str) -> Result<(), TargetError> {
        self.run(&format!("config set {key} {value}")).map(drop)
    }

    // ---------------------------------------------------------------------
    // Framework
    // ---------------------------------------------------------------------

    pub fn legato_start(&mut self) -> Result<(), TargetError> {
        self.run("legato start")?;
        self.require_operational()
    }

    pub fn legato_stop(&mut self) -> Result<(), TargetError> {
        self.run("legato stop").map(drop)
    }

    fn legato_restart(&mut self) -> Result<(), TargetError> {
        self.run("legato restart")?;
        self.require_operational()
    }

    /// Poll `cm info` until the modem service answers.
    ///
    /// Timeouts and lost connections while polling count as "not yet".
    pub fn wait_until_operational(&mut self) -> bool {
        let timeout = self.timeouts.operational();
        let ready = self
            .poller(timeout)
            .run_fallible(|| {
                self.run("cm info")
                    .map(|out| out.contains(OPERATIONAL_MARKER))
            })
            .satisfied;
        if ready {
            info!("legato is operational");
        } else {
            warn!(?timeout, "legato did not become operational");
        }
        ready
    }

    fn require_operational(&mut self) -> Result<(), TargetError> {
        if self.wait_until_operational() {
            Ok(())
        } else {
            Err(TargetError::Timeout {
                command: "cm info".to_string(),
                after: self.timeouts.operational(),
            })
        }
    }

    // ---------------------------------------------------------------------
    // Systems
    // ---------------------------------------------------------------------

    /// Parsed `legato status`.
    pub fn status(&mut self) -> Result<LegatoStatus, TargetError> {
        parse_status(&self.run("legato status")?)
    }

    /// Index of the current system.
    pub fn system_index(&mut self) -> Result<u32, TargetError> {
        Ok(self.status()?.index)
    }

    /// Status of the current system.
    pub fn system_status(&mut self) -> Result<SystemStatus, TargetError> {
        Ok(self.status()?.status)
    }

    /// Roll back to the golden system and wait for the framework.
    pub fn restore_golden_legato(&mut self) -> Result<(), TargetError> {
        info!("restoring golden system");
        self.run("legato restore golden")?;
        self.require_operational()
    }

    /// Shorten or lengthen the probation period of new systems.
    pub fn set_probation_timer(&mut self, period: Duration) -> Result<(), TargetError> {
        let millis = period.as_millis();
        info!(millis, "setting probation period");
        self.run(&format!("echo {millis} > {PROBATION_FILE}"))?;
        self.legato_restart()
    }

    /// Return to the default probation period.
    pub fn reset_probation_timer(&mut self) -> Result<(), TargetError> {
        info!("resetting probation period");
        self.run(&format!("rm -f {PROBATION_FILE}"))?;
        self.legato_restart()
    }
}
