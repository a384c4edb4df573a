// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Bounded-retry polling.
//!
//! Retries a boolean device check at a fixed interval until it holds or the
//! budget runs out. Running out is not an error: the poller reports
//! "condition not observed" and the calling test decides what that means.
//!
//! Polls that fail (device briefly unreachable after a reboot, say) count as
//! "not yet true", never as fatal.

mod clock;

#[cfg(test)]
mod poll_test;

use core::fmt::Display;
use std::time::Duration;

use tracing::debug;

pub use clock::{Clock, MockClock, SystemClock};

/// How long a [`Poller`] keeps trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Stop once this much time has passed since the first poll.
    Timeout(Duration),
    /// Retry at most this many times after the first poll.
    Retries(u32),
}

/// Result of a polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Whether the check ever returned true.
    pub satisfied: bool,
    /// Number of times the check was called.
    pub attempts: u32,
    /// Time from the first poll to the verdict.
    pub elapsed: Duration,
}

/// Retries a check at a fixed interval within a [`Budget`].
#[derive(Debug, Clone)]
pub struct Poller<C = SystemClock> {
    interval: Duration,
    budget: Budget,
    clock: C,
}

impl Poller<SystemClock> {
    /// Creates a poller using wall-clock time.
    #[must_use]
    pub const fn new(interval: Duration, budget: Budget) -> Self {
        Self {
            interval,
            budget,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Poller<C> {
    /// Creates a poller with an explicit clock.
    #[must_use]
    pub const fn with_clock(interval: Duration, budget: Budget, clock: C) -> Self {
        Self {
            interval,
            budget,
            clock,
        }
    }

    /// The clock this poller sleeps on.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Poll `check` until it returns true or the budget is spent.
    pub fn run<F>(&self, mut check: F) -> PollOutcome
    where
        F: FnMut() -> bool,
    {
        let start = self.clock.now();
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            if check() {
                return PollOutcome {
                    satisfied: true,
                    attempts,
                    elapsed: self.clock.now().saturating_duration_since(start),
                };
            }

            let elapsed = self.clock.now().saturating_duration_since(start);
            let pause = match self.budget {
                Budget::Timeout(limit) => {
                    if elapsed >= limit {
                        break;
                    }
                    self.interval.min(limit.saturating_sub(elapsed))
                }
                Budget::Retries(max) => {
                    if attempts > max {
                        break;
                    }
                    self.interval
                }
            };
            debug!(attempts, ?elapsed, "condition not met yet, retrying");
            self.clock.sleep(pause);
        }

        let elapsed = self.clock.now().saturating_duration_since(start);
        debug!(attempts, ?elapsed, "condition not observed within budget");
        PollOutcome {
            satisfied: false,
            attempts,
            elapsed,
        }
    }

    /// Like [`Poller::run`], for checks that can fail.
    ///
    /// An `Err` is logged and treated as "not yet true".
    pub fn run_fallible<F, E>(&self, mut check: F) -> PollOutcome
    where
        F: FnMut() -> Result<bool, E>,
        E: Display,
    {
        self.run(|| match check() {
            Ok(value) => value,
            Err(err) => {
                debug!("poll failed, treating as not yet true: {err}");
                false
            }
        })
    }
}

/// Poll `check` every `interval` within `budget` on wall-clock time.
///
/// Returns true if the check ever returned true.
pub fn poll_until<F>(check: F, interval: Duration, budget: Budget) -> bool
where
    F: FnMut() -> bool,
{
    Poller::new(interval, budget).run(check).satisfied
}

/// [`poll_until`] for fallible checks; errors count as "not yet true".
pub fn poll_until_ok<F, E>(check: F, interval: Duration, budget: Budget) -> bool
where
    F: FnMut() -> Result<bool, E>,
    E: Display,
{
    Poller::new(interval, budget).run_fallible(check).satisfied
}
