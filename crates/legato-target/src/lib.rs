// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Legato Target
//!
//! Device-side collaborators for the harness: how commands reach the
//! device, where its log comes from, and how test apps and systems get
//! built and installed.
//!
//! ## Layout
//!
//! - [`target`] - the [`Target`] trait every device connection implements
//! - [`ssh`] - [`SshTarget`], a device reached through the system `ssh` client
//! - [`process`] - timeout-bounded child processes ([`HostCommand`])
//! - [`host`] - the Legato build tools (`mkapp`, `mksys`, `update`)
//! - [`logread`] - the followed device log as a [`LogStream`]
//! - [`legato`] - the `legato`/`app`/`cm` command wrappers
//! - [`kmod`] - kernel-module checks
//! - [`config`] / [`toolchain`] - target configuration and build environment
//! - [`mock`] - [`MockTarget`] for tests
//!
//! [`LogStream`]: legato_harness::LogStream

pub mod config;
pub mod error;
pub mod host;
pub mod kmod;
pub mod legato;
pub mod logread;
pub mod mock;
pub mod process;
pub mod ssh;
pub mod target;
pub mod toolchain;

pub use config::{ConfigError, LogCommands, SuiteSettings, TargetConfig, Timeouts};
pub use error::TargetError;
pub use host::{BuildOptions, Builder};
pub use kmod::{KmodCheck, LoadResult, UnloadResult};
pub use legato::{AppState, Legato, SystemStatus};
pub use logread::Logread;
pub use mock::MockTarget;
pub use process::HostCommand;
pub use ssh::{RemoteStream, SshTarget};
pub use target::{CommandOutput, Target};
pub use toolchain::ToolchainEnv;
