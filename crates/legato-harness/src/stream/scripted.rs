// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Scripted line source for testing.
//!
//! Replays a fixed sequence of lines without real waiting, so ordering and
//! timeout behavior can be tested deterministically.

use std::collections::VecDeque;
use std::time::Instant;

use super::{LineRead, LineSource};

enum Entry {
    Line(String),
    Stall,
}

/// In-memory [`LineSource`].
///
/// Once the script is drained the source reports [`LineRead::TimedOut`]
/// while open and [`LineRead::Closed`] after [`ScriptedLog::close`].
#[derive(Default)]
pub struct ScriptedLog {
    entries: VecDeque<Entry>,
    closed: bool,
}

impl ScriptedLog {
    /// Creates an empty, open script.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            closed: false,
        }
    }

    /// Creates an open script pre-loaded with `lines`.
    #[must_use]
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut log = Self::new();
        log.extend(lines);
        log
    }

    /// Appends one line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push_back(Entry::Line(line.into()));
    }

    /// Appends several lines.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .extend(lines.into_iter().map(|l| Entry::Line(l.into())));
    }

    /// Appends a point where one read times out before the script goes on.
    pub fn push_stall(&mut self) {
        self.entries.push_back(Entry::Stall);
    }

    /// Marks the end of the stream once the remaining lines are read.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Builder form of [`ScriptedLog::close`].
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Lines not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Line(_)))
            .count()
    }
}

impl LineSource for ScriptedLog {
    fn next_line(&mut self, _deadline: Instant) -> LineRead {
        match self.entries.pop_front() {
            Some(Entry::Line(line)) => LineRead::Line(line),
            Some(Entry::Stall) => LineRead::TimedOut,
            None if self.closed => LineRead::Closed,
            None => LineRead::TimedOut,
        }
    }
}
