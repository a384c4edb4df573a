// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The device's system log as a live stream.
//!
//! [`Logread::follow`] tails the log with the configured follow command for
//! as long as the value lives. Matching consumes it, so a scenario usually
//! opens one `Logread` after clearing the log and checks markers against it
//! in the order they are expected.

#[cfg(test)]
mod logread_test;

use std::time::Duration;

use legato_harness::{ExpectError, ExpectReader, LineSource, LogMarker, LogStream, Match};
use tracing::{info, warn};

use crate::error::TargetError;
use crate::ssh::{RemoteStream, SshTarget};

/// Followed device log.
pub struct Logread<S> {
    reader: ExpectReader<S>,
}

impl Logread<RemoteStream> {
    /// Start following the device log of `target`.
    pub fn follow(target: &SshTarget) -> Result<Self, TargetError> {
        let command = &target.config().log.follow_command;
        info!(command = %command, "following device log");
        Ok(Self::from_source(target.spawn_stream(command)?))
    }
}

impl<S: LineSource> Logread<S> {
    /// Wrap any line source.
    #[must_use]
    pub const fn from_source(source: S) -> Self {
        Self {
            reader: ExpectReader::new(source),
        }
    }

    /// Lines read from the log so far.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.reader.consumed()
    }

    /// The most recent line that matched.
    #[must_use]
    pub fn last_match(&self) -> Option<&str> {
        self.reader.last_match()
    }

    /// Returns true once the log stream has ended.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.reader.is_closed()
    }

    /// Skip every line that arrives within `window`. Returns the number of
    /// lines skipped.
    pub fn drain(&mut self, window: Duration) -> u64 {
        let before = self.reader.consumed();
        // Nothing matches an empty marker list.
        match self.reader.expect(&[], window) {
            Err(err) if !err.is_timeout() => warn!("device log ended while draining: {err}"),
            _ => {}
        }
        self.reader.consumed() - before
    }
}

impl<S: LineSource> LogStream for Logread<S> {
    fn expect(&mut self, markers: &[LogMarker], timeout: Duration) -> Result<Match, ExpectError> {
        self.reader.expect(markers, timeout)
    }
}

/// Strip the `timestamp | process | ` prefix of a Legato log line.
///
/// Lines with fewer than two `|` separators are returned whole.
#[must_use]
pub fn strip_log_prefix(line: &str) -> &str {
    let mut fields = line.splitn(3, '|');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(_), Some(_), Some(message)) => message.trim_start(),
        _ => line,
    }
}
