// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Error types shared by the harness.

use std::time::Duration;

use thiserror::Error;

/// Why an expect-style wait on a log stream ended without a match.
#[derive(Debug, Error)]
pub enum ExpectError {
    /// No marker appeared before the deadline.
    ///
    /// Not fatal by itself: the awaited condition may simply never happen.
    #[error("timed out after {waited:?} waiting for {markers}")]
    Timeout {
        /// How long the wait lasted.
        waited: Duration,
        /// Human-readable list of the markers that were awaited.
        markers: String,
    },
    /// The stream ended (remote process died, connection dropped).
    #[error("log stream closed while waiting for {markers}")]
    Closed {
        /// Human-readable list of the markers that were awaited.
        markers: String,
    },
    /// Reading from the underlying source failed.
    #[error("log stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExpectError {
    /// Returns true if this is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if the stream is gone for good.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. } | Self::Io(_))
    }
}

/// Coarse classification of a failure, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Something did not happen in time.
    Timeout,
    /// The device or the log stream went away.
    ConnectionLost,
    /// Any other failure (bad exit status, parse error, ...).
    Other,
}

impl core::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionLost => write!(f, "device communication lost"),
            Self::Other => write!(f, "failure"),
        }
    }
}

/// Errors that can be sorted into a [`FailureKind`].
pub trait Classify {
    /// The failure class of this error.
    fn kind(&self) -> FailureKind;
}

impl Classify for ExpectError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Closed { .. } | Self::Io(_) => FailureKind::ConnectionLost,
        }
    }
}

impl Classify for std::io::Error {
    fn kind(&self) -> FailureKind {
        match std::io::Error::kind(self) {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => FailureKind::Timeout,
            std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::UnexpectedEof => FailureKind::ConnectionLost,
            _ => FailureKind::Other,
        }
    }
}
