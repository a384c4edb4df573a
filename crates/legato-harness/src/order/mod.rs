// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Ordering verification for sequences of log markers.
//!
//! The device often loads or unloads several kernel modules along a
//! dependency graph. Checking presence alone cannot tell whether the order
//! was right, so [`check_order`] consumes the log one match at a time:
//!
//! 1. Descending lists are reversed, so the core is always ascending.
//! 2. Step `i` waits for any marker of the whole list and records which one
//!    actually came next.
//! 3. A mismatch is recorded and checking continues, so a failure shows the
//!    complete observed order rather than just the first deviation.
//! 4. A timeout fails its step only. A closed stream fails every remaining
//!    step without touching the stream again.
//!
//! Duplicate markers are matched once per step; a log line is never reused
//! because matching consumes the stream.


use core::fmt;
use std::time::Duration;

use tracing::{debug, error};

use crate::marker::{
    Direction, LogMarker, OrderedMarkerList, kernel_module_loaded, kernel_module_removed,
};
use crate::stream::LogStream;

/// What one verification step saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// A marker matched.
    Matched {
        /// Position of the matched marker in the checked order.
        index: usize,
        /// The matched marker's text.
        marker: String,
        /// The log line it matched.
        line: String,
    },
    /// No marker showed up within the step timeout.
    TimedOut,
    /// The log stream ended before or during this step.
    StreamClosed,
}

/// One step of an ordering check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Position this step expects to match.
    pub expected: usize,
    /// Text of the marker this step expects.
    pub expected_marker: String,
    /// What was actually observed.
    pub observation: Observation,
}

impl Step {
    /// Returns true if the expected marker matched at this step.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self.observation, Observation::Matched { index, .. } if index == self.expected)
    }

    /// Text of the observed marker, if any matched.
    #[must_use]
    pub fn observed_marker(&self) -> Option<&str> {
        match &self.observation {
            Observation::Matched { marker, .. } => Some(marker),
            Observation::TimedOut | Observation::StreamClosed => None,
        }
    }
}

/// Aggregate result of an ordering check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    direction: Direction,
    steps: Vec<Step>,
}

impl VerificationOutcome {
    /// Returns true if every step matched its expected marker.
    ///
    /// An empty check passes.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(Step::passed)
    }

    /// Direction the check was run in.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// All steps, in checked order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Markers that were actually observed, in the order they were seen.
    #[must_use]
    pub fn observed(&self) -> Vec<&str> {
        self.steps.iter().filter_map(Step::observed_marker).collect()
    }

    /// Steps that did not match their expected marker.
    pub fn violations(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| !step.passed())
    }

    /// Observed markers, one per line.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.observed().join("\n")
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "PASS" } else { "FAIL" };
        let direction = match self.direction {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        };
        write!(f, "{direction} order check: {verdict}")?;
        for step in &self.steps {
            write!(f, "\n  step {}: expected {:?}, ", step.expected, step.expected_marker)?;
            match &step.observation {
                Observation::Matched { .. } if step.passed() => write!(f, "ok")?,
                Observation::Matched { marker, line, .. } => {
                    write!(f, "observed {marker:?} in {line:?}")?;
                }
                Observation::TimedOut => write!(f, "timed out")?,
                Observation::StreamClosed => write!(f, "log stream closed")?,
            }
        }
        Ok(())
    }
}

/// Verify that `list` shows up in the log in `direction` order.
///
/// Each step waits at most `step_timeout`. The returned outcome never
/// aborts early on a mismatch; see the module documentation.
pub fn check_order<S>(
    stream: &mut S,
    direction: Direction,
    list: &OrderedMarkerList,
    step_timeout: Duration,
) -> VerificationOutcome
where
    S: LogStream + ?Sized,
{
    let checked = list.in_direction(direction);
    let mut steps = Vec::with_capacity(checked.len());
    let mut closed = false;

    for (i, expected) in checked.iter().enumerate() {
        let observation = if closed {
            Observation::StreamClosed
        } else {
            observe(stream, &checked, i, step_timeout, &mut closed)
        };
        steps.push(Step {
            expected: i,
            expected_marker: expected.text().to_string(),
            observation,
        });
    }

    let outcome = VerificationOutcome { direction, steps };
    debug!(passed = outcome.passed(), observed = ?outcome.observed(), "order check finished");
    outcome
}

fn observe<S>(
    stream: &mut S,
    checked: &[LogMarker],
    step: usize,
    step_timeout: Duration,
    closed: &mut bool,
) -> Observation
where
    S: LogStream + ?Sized,
{
    match stream.expect(checked, step_timeout) {
        Ok(found) => {
            // A duplicate of this step's marker is this step's occurrence.
            let index = if checked.get(found.index) == checked.get(step) {
                step
            } else {
                found.index
            };
            let marker = checked
                .get(found.index)
                .map_or_else(String::new, |m| m.text().to_string());
            if index != step {
                error!(
                    step,
                    expected = ?checked.get(step).map(LogMarker::text),
                    observed = %marker,
                    "ordering violation"
                );
            }
            Observation::Matched {
                index,
                marker,
                line: found.line,
            }
        }
        Err(err) if err.is_timeout() => {
            error!(step, "none of the expected markers was found: {err}");
            Observation::TimedOut
        }
        Err(err) => {
            error!(step, "log stream stopped unexpectedly: {err}");
            *closed = true;
            Observation::StreamClosed
        }
    }
}

/// [`check_order`] over the "module inserted" messages of `modules`.
pub fn check_loading_order<S, M>(
    stream: &mut S,
    direction: Direction,
    modules: &[M],
    step_timeout: Duration,
) -> VerificationOutcome
where
    S: LogStream + ?Sized,
    M: AsRef<str>,
{
    let list: OrderedMarkerList = modules
        .iter()
        .map(|m| kernel_module_loaded(m.as_ref()))
        .collect();
    check_order(stream, direction, &list, step_timeout)
}

/// [`check_order`] over the "module removed" messages of `modules`.
pub fn check_unloading_order<S, M>(
    stream: &mut S,
    direction: Direction,
    modules: &[M],
    step_timeout: Duration,
) -> VerificationOutcome
where
    S: LogStream + ?Sized,
    M: AsRef<str>,
{
    let list: OrderedMarkerList = modules
        .iter()
        .map(|m| kernel_module_removed(m.as_ref()))
        .collect();
    check_order(stream, direction, &list, step_timeout)
}
