// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Built-in device scenarios.

#[cfg(test)]
mod scenarios_test;

mod kmod;
mod sample_apps;
mod update_control;

use legato_harness::VerificationOutcome;

use crate::context::SuiteContext;
use crate::runner::{Scenario, ScenarioFailure};

/// Every scenario, in execution order.
#[must_use]
pub fn all() -> Vec<Scenario<SuiteContext>> {
    vec![
        Scenario {
            name: "kmod_load_order",
            description: "kernel modules load and unload along their dependencies",
            run: kmod::load_order,
        },
        Scenario {
            name: "kmod_tool_load_unload",
            description: "kmod load and unload answers track module presence",
            run: kmod::tool_load_unload,
        },
        Scenario {
            name: "update_unlock_probation",
            description: "unlocking an expired probation leaves the system alone",
            run: update_control::unlock_probation,
        },
        Scenario {
            name: "sample_hello_world",
            description: "the helloWorld sample app logs its greeting",
            run: sample_apps::hello_world,
        },
    ]
}

fn require(outcome: &VerificationOutcome) -> Result<(), ScenarioFailure> {
    if outcome.passed() {
        Ok(())
    } else {
        Err(ScenarioFailure::fail(outcome.to_string()))
    }
}
