// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Test-session state.
//!
//! A [`Session`] lives for one run of the suite against one device. It holds
//! the scratch directories tests build into and remembers which one-time
//! initializations have already happened, so no module-level flags are
//! needed.


use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

/// Errors creating a session workspace.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The temporary root could not be created.
    #[error("failed to create session directory: {0}")]
    TempDir(#[source] std::io::Error),
    /// A sub-directory could not be created.
    #[error("failed to create {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl crate::error::Classify for SessionError {
    fn kind(&self) -> crate::error::FailureKind {
        crate::error::FailureKind::Other
    }
}

/// Per-run context shared by all scenarios.
#[derive(Debug)]
pub struct Session {
    root: TempDir,
    test_dir: PathBuf,
    campaign_dir: PathBuf,
    initialized: BTreeSet<String>,
}

impl Session {
    /// Creates a session with a fresh temporary root in the system temp dir.
    pub fn new() -> Result<Self, SessionError> {
        let root = tempfile::Builder::new()
            .prefix("legato-")
            .tempdir()
            .map_err(SessionError::TempDir)?;
        Self::with_root(root)
    }

    /// Creates a session with its temporary root inside `parent`.
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self, SessionError> {
        let root = tempfile::Builder::new()
            .prefix("legato-")
            .tempdir_in(parent)
            .map_err(SessionError::TempDir)?;
        Self::with_root(root)
    }

    fn with_root(root: TempDir) -> Result<Self, SessionError> {
        let test_dir = root.path().join("test");
        let campaign_dir = root.path().join("campaign");
        for dir in [&test_dir, &campaign_dir] {
            std::fs::create_dir_all(dir).map_err(|source| SessionError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        info!(root = %root.path().display(), "session workspace ready");
        Ok(Self {
            root,
            test_dir,
            campaign_dir,
            initialized: BTreeSet::new(),
        })
    }

    /// Temporary root; removed when the session is dropped.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Scratch directory for per-test build output.
    #[must_use]
    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    /// Scratch directory shared by a whole campaign.
    #[must_use]
    pub fn campaign_dir(&self) -> &Path {
        &self.campaign_dir
    }

    /// Returns true if `key` has been initialized in this session.
    #[must_use]
    pub fn is_initialized(&self, key: &str) -> bool {
        self.initialized.contains(key)
    }

    /// Forget `key`, so the next [`Session::run_once`] runs it again.
    pub fn reset(&mut self, key: &str) -> bool {
        self.initialized.remove(key)
    }

    /// Run `init` the first time `key` is seen during this session.
    ///
    /// Returns `Ok(true)` if `init` ran, `Ok(false)` if it had already run.
    /// If `init` fails the key stays unset, so the next caller retries.
    pub fn run_once<F, E>(&mut self, key: &str, init: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        if self.initialized.contains(key) {
            debug!(key, "already initialized");
            return Ok(false);
        }
        init()?;
        debug!(key, "initialized");
        self.initialized.insert(key.to_string());
        Ok(true)
    }
}
