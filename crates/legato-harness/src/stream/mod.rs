// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Line streams with expect-style waits.
//!
//! A [`LineSource`] hands out log lines one at a time, blocking until a
//! deadline. [`ExpectReader`] layers the [`LogStream`] contract on top: wait
//! until any of N markers shows up, or report a timeout or a closed stream.
//!
//! Implementations:
//! - [`ChannelSource`] - lines pushed by a reader thread (remote processes)
//! - [`ScriptedLog`] - in-memory script for tests

mod channel;
mod scripted;


use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::ExpectError;
use crate::marker::{LogMarker, describe};
use crate::matcher::earliest_match;

pub use channel::ChannelSource;
pub use scripted::ScriptedLog;

/// Result of asking a [`LineSource`] for its next line.
#[derive(Debug)]
pub enum LineRead {
    /// A complete line, without its trailing newline.
    Line(String),
    /// Nothing arrived before the deadline.
    TimedOut,
    /// The source is exhausted for good.
    Closed,
    /// Reading failed; the source should be treated as closed.
    Failed(std::io::Error),
}

/// A blocking source of log lines.
pub trait LineSource {
    /// Wait for the next line until `deadline`.
    fn next_line(&mut self, deadline: Instant) -> LineRead;
}

/// A marker match in a log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Index of the matched marker in the list passed to `expect`.
    pub index: usize,
    /// The log line that matched.
    pub line: String,
}

/// Expect-style access to a live log.
///
/// Matching consumes the stream: once a line has been examined, later calls
/// only see later lines.
pub trait LogStream {
    /// Wait until one of `markers` appears, for at most `timeout`.
    ///
    /// # Errors
    ///
    /// - [`ExpectError::Timeout`] if no marker appeared in time
    /// - [`ExpectError::Closed`] / [`ExpectError::Io`] if the stream ended
    fn expect(&mut self, markers: &[LogMarker], timeout: Duration) -> Result<Match, ExpectError>;
}

/// Deadline `timeout` from `now`, saturating far in the future.
#[must_use]
pub fn deadline_after(now: Instant, timeout: Duration) -> Instant {
    now.checked_add(timeout)
        .or_else(|| now.checked_add(Duration::from_secs(u64::from(u32::MAX))))
        .unwrap_or(now)
}

/// [`LogStream`] implementation over any [`LineSource`].
pub struct ExpectReader<S> {
    source: S,
    consumed: u64,
    last_match: Option<String>,
    closed: bool,
}

impl<S: LineSource> ExpectReader<S> {
    /// Wraps a line source.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            consumed: 0,
            last_match: None,
            closed: false,
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    /// The last line that matched a marker.
    #[must_use]
    pub fn last_match(&self) -> Option<&str> {
        self.last_match.as_deref()
    }

    /// Returns true once the source has reported closure.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Access the wrapped source.
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Unwraps the reader, returning the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: LineSource> LogStream for ExpectReader<S> {
    fn expect(&mut self, markers: &[LogMarker], timeout: Duration) -> Result<Match, ExpectError> {
        if self.closed {
            return Err(ExpectError::Closed {
                markers: describe(markers),
            });
        }

        let start = Instant::now();
        let deadline = deadline_after(start, timeout);
        loop {
            match self.source.next_line(deadline) {
                LineRead::Line(line) => {
                    self.consumed += 1;
                    trace!(target: "legato::log", "{line}");
                    if let Some(index) = earliest_match(markers, &line) {
                        self.last_match = Some(line.clone());
                        return Ok(Match { index, line });
                    }
                }
                LineRead::TimedOut => {
                    return Err(ExpectError::Timeout {
                        waited: start.elapsed(),
                        markers: describe(markers),
                    });
                }
                LineRead::Closed => {
                    self.closed = true;
                    return Err(ExpectError::Closed {
                        markers: describe(markers),
                    });
                }
                LineRead::Failed(err) => {
                    self.closed = true;
                    return Err(ExpectError::Io(err));
                }
            }
        }
    }
}
