// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Legato build tools on the host.
//!
//! Test apps and systems are built with `mkapp`/`mksys` and pushed to the
//! device with `update`. Both build tools name their output
//! `<name>.<target>.update` in the working directory.

#[cfg(test)]
mod host_test;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info};

use crate::error::TargetError;
use crate::process::HostCommand;
use crate::target::CommandOutput;
use crate::toolchain::ToolchainEnv;

/// Builds can take minutes on a cold tree.
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(600);

/// Per-build knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Extra arguments for the build tool.
    pub args: Vec<String>,
    /// The build is expected to fail; its output is returned unchecked.
    pub expect_failure: bool,
}

impl BuildOptions {
    /// Options for a build that must fail.
    #[must_use]
    pub const fn failing() -> Self {
        Self {
            args: Vec::new(),
            expect_failure: true,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Runs `mkapp`, `mksys` and `update` for one target.
#[derive(Debug, Clone)]
pub struct Builder {
    toolchain: ToolchainEnv,
    device: String,
    work_dir: PathBuf,
    tools_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Builder {
    /// Builder writing into `work_dir` and installing to `device` (host or
    /// address).
    #[must_use]
    pub fn new(
        toolchain: ToolchainEnv,
        device: impl Into<String>,
        work_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            toolchain,
            device: device.into(),
            work_dir: work_dir.as_ref().to_path_buf(),
            tools_dir: None,
            timeout: DEFAULT_BUILD_TIMEOUT,
        }
    }

    /// Look the tools up in `dir` instead of `PATH`.
    #[must_use]
    pub fn with_tools_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.tools_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn toolchain(&self) -> &ToolchainEnv {
        &self.toolchain
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// File the build tools produce for `name`.
    #[must_use]
    pub fn update_file(&self, name: &str) -> PathBuf {
        self.work_dir
            .join(format!("{name}.{}.update", self.toolchain.target()))
    }

    fn tool(&self, name: &str) -> HostCommand {
        let program = self
            .tools_dir
            .as_ref()
            .map_or_else(|| name.to_string(), |dir| dir.join(name).display().to_string());
        HostCommand::new(program)
            .current_dir(&self.work_dir)
            .envs(self.toolchain.vars())
            .timeout(self.timeout)
    }

    /// The `mkapp` invocation for `adef`.
    #[must_use]
    pub fn mkapp_command(&self, adef: &Path, options: &BuildOptions) -> HostCommand {
        self.tool("mkapp")
            .args(["-t", self.toolchain.target()])
            .args(options.args.iter().cloned())
            .arg(adef.display().to_string())
    }

    /// The `mksys` invocation for `sdef`.
    #[must_use]
    pub fn mksys_command(&self, sdef: &Path, options: &BuildOptions) -> HostCommand {
        self.tool("mksys")
            .args(["-t", self.toolchain.target()])
            .args(options.args.iter().cloned())
            .arg(sdef.display().to_string())
    }

    /// The `update` invocation pushing `file` to the device.
    #[must_use]
    pub fn update_command(&self, file: &Path) -> HostCommand {
        self.tool("update")
            .arg(file.display().to_string())
            .arg(self.device.clone())
    }

    fn build(
        &self,
        command: &HostCommand,
        options: &BuildOptions,
    ) -> Result<CommandOutput, TargetError> {
        let line = command.display();
        info!(command = %line, "building");
        let output = command.run()?;
        if options.expect_failure {
            if output.success() {
                error!(command = %line, "build succeeded but was expected to fail");
            }
            return Ok(output);
        }
        output.check(&line)
    }

    /// Build an app from its `.adef`.
    pub fn make_app(
        &self,
        adef: &Path,
        options: &BuildOptions,
    ) -> Result<CommandOutput, TargetError> {
        self.build(&self.mkapp_command(adef, options), options)
    }

    /// Build a system from its `.sdef`.
    pub fn make_sys(
        &self,
        sdef: &Path,
        options: &BuildOptions,
    ) -> Result<CommandOutput, TargetError> {
        self.toolchain.legato_root()?;
        self.build(&self.mksys_command(sdef, options), options)
    }

    /// Push an update file to the device.
    pub fn install_update(&self, file: &Path) -> Result<CommandOutput, TargetError> {
        let command = self.update_command(file);
        let line = command.display();
        info!(command = %line, "installing");
        command.run()?.check(&line)
    }

    /// Build `<app_dir>/<app_name>.adef` and install it.
    pub fn make_install(&self, app_name: &str, app_dir: &Path) -> Result<(), TargetError> {
        let adef = app_dir.join(format!("{app_name}.adef"));
        self.make_app(&adef, &BuildOptions::default())?;
        self.install_update(&self.update_file(app_name))?;
        Ok(())
    }

    /// Build the system `sdef` and install it as `sys_name`.
    pub fn make_install_sys(&self, sys_name: &str, sdef: &Path) -> Result<(), TargetError> {
        self.make_sys(sdef, &BuildOptions::default())?;
        self.install_update(&self.update_file(sys_name))?;
        Ok(())
    }
}
