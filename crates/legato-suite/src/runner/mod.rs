// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Scenario runner.
//!
//! Executes registered scenarios one at a time against a shared context and
//! writes a structured report. Each scenario is bracketed by the context's
//! [`Fixture`] hooks; teardown always runs and never changes a result.


use core::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

/// Status of a single scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    /// Scenario passed.
    Pass,
    /// Scenario failed.
    Fail,
    /// Scenario did not run.
    Skip,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
            Self::Skip => write!(f, "SKIP"),
        }
    }
}

/// Why a scenario did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioFailure {
    /// The device did not behave as expected.
    Fail(String),
    /// A precondition is not met; the scenario did not run.
    Skip(String),
}

impl ScenarioFailure {
    /// Failure with a message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Skip with a reason.
    pub fn skip(message: impl Into<String>) -> Self {
        Self::Skip(message.into())
    }
}

/// Turns any displayable error into a failure, so scenarios can use `?`.
impl<E: fmt::Display> From<E> for ScenarioFailure {
    fn from(err: E) -> Self {
        Self::Fail(err.to_string())
    }
}

/// Result of a single scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    /// Scenario name.
    pub name: &'static str,
    /// Status after execution.
    pub status: TestStatus,
    /// Failure message or skip reason.
    pub message: Option<String>,
    /// Wall-clock time spent, including setup and teardown.
    pub elapsed: Duration,
}

/// A scenario body.
pub type ScenarioFn<C> = fn(&mut C) -> Result<(), ScenarioFailure>;

/// A registered scenario.
pub struct Scenario<C> {
    /// Unique name, used for selection on the command line.
    pub name: &'static str,
    /// One-line summary for `--list`.
    pub description: &'static str,
    /// The scenario body.
    pub run: ScenarioFn<C>,
}

/// Per-scenario setup and teardown of a context.
pub trait Fixture {
    /// Prepare for the next scenario. An error fails that scenario.
    fn setup(&mut self, _scenario: &str) -> Result<(), ScenarioFailure> {
        Ok(())
    }

    /// Clean up after a scenario. Must not fail.
    fn teardown(&mut self, _scenario: &str) {}
}

/// Totals of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Every result, in execution order.
    pub results: Vec<TestResult>,
    /// Filter entries that matched no scenario.
    pub unknown: Vec<String>,
}

impl RunSummary {
    /// Returns true if nothing failed and every requested scenario existed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.unknown.is_empty()
    }

    fn record(&mut self, result: TestResult) {
        match result.status {
            TestStatus::Pass => self.passed += 1,
            TestStatus::Fail => self.failed += 1,
            TestStatus::Skip => self.skipped += 1,
        }
        self.results.push(result);
    }
}

fn selected<C>(cases: &[Scenario<C>], filter: &[String]) -> (Vec<usize>, Vec<String>) {
    if filter.is_empty() {
        return ((0..cases.len()).collect(), Vec::new());
    }
    let chosen = (0..cases.len())
        .filter(|&i| filter.iter().any(|name| name == cases[i].name))
        .collect();
    let unknown = filter
        .iter()
        .filter(|name| !cases.iter().any(|case| case.name == name.as_str()))
        .cloned()
        .collect();
    (chosen, unknown)
}

fn execute<C: Fixture>(case: &Scenario<C>, ctx: &mut C) -> (TestStatus, Option<String>) {
    let outcome = ctx.setup(case.name).and_then(|()| (case.run)(ctx));
    ctx.teardown(case.name);
    match outcome {
        Ok(()) => (TestStatus::Pass, None),
        Err(ScenarioFailure::Fail(msg)) => (TestStatus::Fail, Some(msg)),
        Err(ScenarioFailure::Skip(msg)) => (TestStatus::Skip, Some(msg)),
    }
}

/// Run `cases` (all of them, or those named in `filter`) and report to `out`.
///
/// Scenarios run in registration order. Names in `filter` that match no
/// scenario are reported and fail the verdict.
pub fn run_scenarios<C, W>(
    cases: &[Scenario<C>],
    ctx: &mut C,
    filter: &[String],
    out: &mut W,
) -> io::Result<RunSummary>
where
    C: Fixture,
    W: Write + ?Sized,
{
    writeln!(out, "=== LEGATO SUITE RUN ===")?;

    let (chosen, unknown) = selected(cases, filter);
    let mut summary = RunSummary::default();
    for name in &unknown {
        error!(scenario = %name, "no such scenario");
        writeln!(out, "[TEST] {name} ... UNKNOWN")?;
    }
    summary.unknown = unknown;

    for case in chosen.into_iter().map(|i| &cases[i]) {
        write!(out, "[TEST] {} ... ", case.name)?;
        out.flush()?;

        info!(scenario = case.name, "starting");
        let start = Instant::now();
        let (status, message) = execute(case, ctx);
        let elapsed = start.elapsed();

        writeln!(out, "{status}")?;
        match (&status, &message) {
            (TestStatus::Fail, Some(msg)) => {
                error!(scenario = case.name, ?elapsed, "failed: {msg}");
                for line in msg.lines() {
                    writeln!(out, "  Error: {line}")?;
                }
            }
            (TestStatus::Skip, Some(msg)) => {
                warn!(scenario = case.name, "skipped: {msg}");
                writeln!(out, "  Reason: {msg}")?;
            }
            _ => info!(scenario = case.name, ?elapsed, "passed"),
        }

        summary.record(TestResult {
            name: case.name,
            status,
            message,
            elapsed,
        });
    }

    writeln!(
        out,
        "=== RESULTS: {} passed, {} failed, {} skipped ===",
        summary.passed, summary.failed, summary.skipped
    )?;
    let verdict = if summary.all_passed() { "PASS" } else { "FAIL" };
    writeln!(out, "=== VERDICT: {verdict} ===")?;

    Ok(summary)
}

/// Write `name - description` for each scenario.
pub fn list_scenarios<C, W>(cases: &[Scenario<C>], out: &mut W) -> io::Result<()>
where
    W: Write + ?Sized,
{
    let width = cases.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for case in cases {
        writeln!(out, "{:width$}  {}", case.name, case.description)?;
    }
    Ok(())
}
