// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Legato Suite
//!
//! Device scenarios and the runner that executes them against one target.
//!
//! The runner prints a line-oriented report that CI parses:
//!
//! ```text
//! === LEGATO SUITE RUN ===
//! [TEST] kmod_load_order ... PASS
//! [TEST] sample_hello_world ... SKIP
//!   Reason: resources_dir is not configured
//! === RESULTS: 1 passed, 0 failed, 1 skipped ===
//! === VERDICT: PASS ===
//! ```

pub mod context;
pub mod runner;
pub mod scenarios;

pub use context::SuiteContext;
pub use runner::{
    Fixture, RunSummary, Scenario, ScenarioFailure, TestResult, TestStatus, list_scenarios,
    run_scenarios,
};
