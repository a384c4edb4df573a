// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Errors talking to the device or running host tools.

use std::time::Duration;

use legato_harness::{Classify, ExpectError, FailureKind};
use thiserror::Error;

use crate::config::ConfigError;

/// Failure of a device or host command.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The command did not finish in time and was killed.
    #[error("`{command}` timed out after {after:?}")]
    Timeout {
        /// The command line.
        command: String,
        /// How long it was allowed to run.
        after: Duration,
    },
    /// The device could not be reached or the session dropped.
    #[error("connection to the device lost running `{command}`: {detail}")]
    ConnectionLost {
        /// The command line.
        command: String,
        /// What the transport reported.
        detail: String,
    },
    /// A local program could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Local I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Waiting on the interactive shell failed.
    #[error(transparent)]
    Expect(#[from] ExpectError),
    /// The command ran but reported failure.
    #[error("`{command}` exited with status {exit_code}: {output}")]
    CommandFailed {
        /// The command line.
        command: String,
        /// Exit status.
        exit_code: i32,
        /// Captured output, for the report.
        output: String,
    },
    /// Configuration needed for the operation is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Command output did not look as expected.
    #[error("cannot parse {what} from {text:?}")]
    Parse {
        /// What was being parsed.
        what: &'static str,
        /// The offending text.
        text: String,
    },
}

impl Classify for TargetError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::ConnectionLost { .. } => FailureKind::ConnectionLost,
            Self::Expect(err) => err.kind(),
            Self::Io(err) => Classify::kind(err),
            Self::Spawn { .. }
            | Self::Config(_)
            | Self::CommandFailed { .. }
            | Self::Parse { .. } => FailureKind::Other,
        }
    }
}
