// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Target configuration.
//!
//! One TOML file describes the device under test:
//!
//! ```toml
//! name = "wp76xx"
//! host = "192.168.2.2"
//!
//! [timeouts]
//! reboot = 180
//!
//! [suite]
//! resources_dir = "/opt/legato-tests/resources"
//! ```
//!
//! Everything except `name` and `host` has a default. `LEGATO_TARGET_HOST`,
//! `LEGATO_TARGET_PORT` and `LEGATO_TARGET_USER` override the file.


use std::path::{Path, PathBuf};
use std::time::Duration;

use legato_harness::{Classify, FailureKind};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding [`TargetConfig::host`].
pub const ENV_HOST: &str = "LEGATO_TARGET_HOST";
/// Environment variable overriding [`TargetConfig::port`].
pub const ENV_PORT: &str = "LEGATO_TARGET_PORT";
/// Environment variable overriding [`TargetConfig::user`].
pub const ENV_USER: &str = "LEGATO_TARGET_USER";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for a target.
    #[error("invalid target configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A required setting is absent.
    #[error("missing setting: {0}")]
    Missing(String),
    /// A setting has an unusable value.
    #[error("invalid value {value:?} for {key}")]
    Invalid {
        /// Setting name.
        key: String,
        /// Rejected value.
        value: String,
    },
}

impl Classify for ConfigError {
    fn kind(&self) -> FailureKind {
        FailureKind::Other
    }
}

/// The device under test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Target type, e.g. `wp76xx`. Used for build tool `-t` flags and
    /// toolchain variable names.
    pub name: String,
    /// Host name or address.
    pub host: String,
    /// SSH port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user.
    #[serde(default = "default_user")]
    pub user: String,
    /// Private key passed to `ssh -i`.
    #[serde(default)]
    pub identity_file: Option<PathBuf>,
    /// Extra `-o` options for `ssh`.
    #[serde(default)]
    pub ssh_options: Vec<String>,
    /// The `ssh` client to run.
    #[serde(default = "default_ssh_program")]
    pub ssh_program: PathBuf,
    /// Wait budgets.
    #[serde(default)]
    pub timeouts: Timeouts,
    /// Device log commands.
    #[serde(default)]
    pub log: LogCommands,
    /// Where scenario resources live.
    #[serde(default)]
    pub suite: SuiteSettings,
}

const fn default_port() -> u16 {
    22
}

fn default_user() -> String {
    "root".to_string()
}

fn default_ssh_program() -> PathBuf {
    PathBuf::from("ssh")
}

/// Wait budgets, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    /// A single remote or host command.
    pub command: u64,
    /// One step of a log wait or ordering check.
    pub log_step: u64,
    /// Device going down after a reboot command.
    pub device_down: u64,
    /// Device coming back after a reboot.
    pub reboot: u64,
    /// Pause between polls.
    pub poll_interval: u64,
    /// Framework becoming operational after start or reboot.
    pub operational: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command: 30,
            log_step: 30,
            device_down: 10,
            reboot: 120,
            poll_interval: 1,
            operational: 30,
        }
    }
}

impl Timeouts {
    #[must_use]
    pub const fn command(&self) -> Duration {
        Duration::from_secs(self.command)
    }

    #[must_use]
    pub const fn log_step(&self) -> Duration {
        Duration::from_secs(self.log_step)
    }

    #[must_use]
    pub const fn device_down(&self) -> Duration {
        Duration::from_secs(self.device_down)
    }

    #[must_use]
    pub const fn reboot(&self) -> Duration {
        Duration::from_secs(self.reboot)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    #[must_use]
    pub const fn operational(&self) -> Duration {
        Duration::from_secs(self.operational)
    }
}

/// Device-side log commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogCommands {
    /// Streams new log lines until killed.
    pub follow_command: String,
    /// Prints the whole current log.
    pub snapshot_command: String,
    /// Empties the log.
    pub clear_command: String,
}

impl Default for LogCommands {
    fn default() -> Self {
        Self {
            follow_command: "/sbin/logread -f".to_string(),
            snapshot_command: "/sbin/logread".to_string(),
            clear_command: "/etc/init.d/syslog restart".to_string(),
        }
    }
}

/// Host-side locations used by scenarios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteSettings {
    /// Root of the test apps and systems (`.adef`/`.sdef` trees).
    pub resources_dir: Option<PathBuf>,
    /// Where build output goes; a session temp dir when unset.
    pub work_dir: Option<PathBuf>,
}

impl TargetConfig {
    /// Parse a configuration from TOML text, without environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` and apply the process environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        debug!(
            path = %path.display(),
            target = %config.name,
            host = %config.host,
            "loaded target configuration"
        );
        Ok(config)
    }

    /// Apply `LEGATO_TARGET_*` overrides looked up through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(user) = lookup(ENV_USER) {
            self.user = user;
        }
        self.validate()
    }

    /// `user@host` for the ssh command line.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("name", &self.name), ("host", &self.host), ("user", &self.user)] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key.to_string()));
            }
        }
        if self.timeouts.poll_interval == 0 {
            return Err(ConfigError::Invalid {
                key: "timeouts.poll_interval".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
