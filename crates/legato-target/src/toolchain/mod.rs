// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Cross-build environment for the Legato build tools.
//!
//! `mkapp`/`mksys` find the target sysroot and kernel tree through
//! `<TARGET>_SYSROOT` and `<TARGET>_KERNELROOT`. They are resolved once into
//! a [`ToolchainEnv`] and handed to each [`HostCommand`] explicitly; the
//! process environment is never modified.
//!
//! [`HostCommand`]: crate::process::HostCommand

#[cfg(test)]
mod toolchain_test;

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Root of the Legato framework checkout.
pub const ENV_LEGATO_ROOT: &str = "LEGATO_ROOT";

/// Resolved build environment for one target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainEnv {
    target: String,
    legato_root: Option<PathBuf>,
    sysroot: PathBuf,
    kernel_root: PathBuf,
}

impl ToolchainEnv {
    /// Name of the sysroot variable for `target`, e.g. `WP76XX_SYSROOT`.
    #[must_use]
    pub fn sysroot_var(target: &str) -> String {
        format!("{}_SYSROOT", target.to_ascii_uppercase())
    }

    /// Name of the kernel tree variable for `target`.
    #[must_use]
    pub fn kernel_root_var(target: &str) -> String {
        format!("{}_KERNELROOT", target.to_ascii_uppercase())
    }

    /// Resolve the environment for `target` from the process environment.
    pub fn from_env(target: &str) -> Result<Self, ConfigError> {
        Self::resolve(target, |key| std::env::var(key).ok())
    }

    /// Resolve the environment for `target` through `lookup`.
    ///
    /// The sysroot is required. The kernel tree defaults to
    /// `<sysroot>/usr/src/kernel`.
    pub fn resolve<F>(target: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sysroot_var = Self::sysroot_var(target);
        let sysroot = non_empty(&sysroot_var)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(sysroot_var))?;
        let kernel_root = non_empty(&Self::kernel_root_var(target))
            .map_or_else(|| sysroot.join("usr/src/kernel"), PathBuf::from);

        Ok(Self {
            target: target.to_string(),
            legato_root: non_empty(ENV_LEGATO_ROOT).map(PathBuf::from),
            sysroot,
            kernel_root,
        })
    }

    /// Target type this environment was resolved for.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The Legato checkout, needed for system builds.
    pub fn legato_root(&self) -> Result<&Path, ConfigError> {
        self.legato_root
            .as_deref()
            .ok_or_else(|| ConfigError::Missing(ENV_LEGATO_ROOT.to_string()))
    }

    #[must_use]
    pub fn sysroot(&self) -> &Path {
        &self.sysroot
    }

    #[must_use]
    pub fn kernel_root(&self) -> &Path {
        &self.kernel_root
    }

    /// Variables to set on build tool invocations.
    #[must_use]
    pub fn vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            (
                Self::sysroot_var(&self.target),
                self.sysroot.display().to_string(),
            ),
            (
                Self::kernel_root_var(&self.target),
                self.kernel_root.display().to_string(),
            ),
        ];
        if let Some(root) = &self.legato_root {
            vars.push((ENV_LEGATO_ROOT.to_string(), root.display().to_string()));
        }
        vars
    }
}
