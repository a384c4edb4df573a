// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Shared state for device scenarios.

#[cfg(test)]
mod context_test;

use std::path::{Path, PathBuf};
use std::time::Duration;

use legato_harness::{Session, best_effort};
use legato_target::{
    Builder, Legato, Logread, RemoteStream, SshTarget, TargetConfig, ToolchainEnv,
};
use tracing::{debug, warn};

use crate::runner::{Fixture, ScenarioFailure};

/// Everything a scenario can reach: the device, the build tools and the
/// session workspace.
pub struct SuiteContext {
    config: TargetConfig,
    legato: Legato<SshTarget>,
    session: Session,
    builder: Result<Builder, String>,
}

impl SuiteContext {
    /// Connect to the target described by `config`.
    ///
    /// A missing cross-toolchain is not an error here: scenarios that need
    /// to build something are skipped instead.
    pub fn new(config: TargetConfig) -> anyhow::Result<Self> {
        let session = match &config.suite.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Session::new_in(dir)?
            }
            None => Session::new()?,
        };

        let builder = ToolchainEnv::from_env(&config.name)
            .map(|toolchain| Builder::new(toolchain, config.host.clone(), session.test_dir()))
            .map_err(|err| err.to_string());
        if let Err(reason) = &builder {
            warn!("build scenarios disabled: {reason}");
        }

        let legato = Legato::new(SshTarget::new(config.clone()), &config);
        Ok(Self {
            config,
            legato,
            session,
            builder,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &TargetConfig {
        &self.config
    }

    pub fn legato(&mut self) -> &mut Legato<SshTarget> {
        &mut self.legato
    }

    pub fn session(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Run `init` once per session under `key`.
    ///
    /// Returns true if `init` ran now. A failed `init` is retried by the
    /// next caller.
    pub fn init_once<F>(&mut self, key: &str, init: F) -> Result<bool, ScenarioFailure>
    where
        F: FnOnce(&mut Self) -> Result<(), ScenarioFailure>,
    {
        if self.session.is_initialized(key) {
            debug!(key, "already initialized");
            return Ok(false);
        }
        init(self)?;
        // Marks the key; the no-op cannot fail.
        self.session.run_once(key, || Ok(()))
    }

    /// Forget a one-time initialization, so it runs again.
    pub fn forget_init(&mut self, key: &str) {
        if self.session.reset(key) {
            debug!(key, "one-time initialization forgotten");
        }
    }

    /// Per-step wait for log markers.
    #[must_use]
    pub const fn log_step(&self) -> Duration {
        self.config.timeouts.log_step()
    }

    /// The build tools, or a skip if no toolchain is set up.
    pub fn builder(&self) -> Result<&Builder, ScenarioFailure> {
        self.builder
            .as_ref()
            .map_err(|reason| ScenarioFailure::skip(format!("no toolchain: {reason}")))
    }

    /// `relative` under the configured resources directory, or a skip.
    pub fn resource(&self, relative: impl AsRef<Path>) -> Result<PathBuf, ScenarioFailure> {
        let root = self
            .config
            .suite
            .resources_dir
            .as_ref()
            .ok_or_else(|| ScenarioFailure::skip("resources_dir is not configured"))?;
        let path = root.join(relative);
        if path.exists() {
            Ok(path)
        } else {
            Err(ScenarioFailure::skip(format!("missing resource {}", path.display())))
        }
    }

    /// Start following the device log.
    pub fn follow_log(&mut self) -> Result<Logread<RemoteStream>, ScenarioFailure> {
        Ok(Logread::follow(self.legato.target())?)
    }
}

impl Fixture for SuiteContext {
    fn setup(&mut self, scenario: &str) -> Result<(), ScenarioFailure> {
        debug!(scenario, "clearing device log");
        self.legato.clear_target_log()?;
        Ok(())
    }

    fn teardown(&mut self, scenario: &str) {
        let dir = self.session.test_dir().to_path_buf();
        best_effort("empty test directory", || {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    std::fs::remove_dir_all(&path)?;
                } else {
                    std::fs::remove_file(&path)?;
                }
            }
            Ok::<_, std::io::Error>(())
        });
        debug!(scenario, "teardown done");
    }
}
