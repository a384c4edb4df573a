// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use legato_harness::{Budget, Direction, best_effort, check_loading_order, check_unloading_order};
use legato_target::kmod::{self, KmodCheck, LoadResult, UnloadResult};
use tracing::{info, warn};

use super::require;
use crate::context::SuiteContext;
use crate::runner::ScenarioFailure;

const SYSTEM: &str = "kmod_order";

/// Dependency order: each module needs the one before it.
const MODULES: [&str; 3] = ["kmod_order_2", "kmod_order_1", "kmod_order_0"];

/// System with a single auto-loaded module of the same name.
const TOOL_SYSTEM: &str = "kmod_tool";
const TOOL_INSTALLED: &str = "kmod_tool system installed";
const MODULES_DIR: &str = "/legato/systems/current/modules";

pub(super) fn load_order(ctx: &mut SuiteContext) -> Result<(), ScenarioFailure> {
    let sdef = ctx.resource(format!("kmod/{SYSTEM}.sdef"))?;
    let step = ctx.log_step();
    let mut log = ctx.follow_log()?;

    let installed = ctx.builder()?.make_install_sys(SYSTEM, &sdef);
    let result = installed.map_err(ScenarioFailure::from).and_then(|()| {
        info!("checking module load order");
        require(&check_loading_order(&mut log, Direction::Ascending, &MODULES, step))?;

        ctx.legato().restore_golden_legato()?;
        info!("checking module unload order");
        require(&check_unloading_order(&mut log, Direction::Descending, &MODULES, step))
    });

    if result.is_err() {
        best_effort("restore golden system", || ctx.legato().restore_golden_legato());
    }
    result
}

pub(super) fn tool_load_unload(ctx: &mut SuiteContext) -> Result<(), ScenarioFailure> {
    let sdef = ctx.resource(format!("kmod/{TOOL_SYSTEM}.sdef"))?;
    ctx.init_once(TOOL_INSTALLED, |ctx| {
        info!(system = TOOL_SYSTEM, "installing system");
        ctx.builder()?.make_install_sys(TOOL_SYSTEM, &sdef)?;
        if ctx.legato().wait_until_operational() {
            Ok(())
        } else {
            Err(ScenarioFailure::fail("legato did not come back after the system update"))
        }
    })?;

    let result = exercise_tool(ctx);
    if result.is_err() {
        // The module may be left in any state; start from a fresh install next time.
        ctx.forget_init(TOOL_INSTALLED);
        best_effort("restore golden system", || ctx.legato().restore_golden_legato());
    }
    result
}

fn exercise_tool(ctx: &mut SuiteContext) -> Result<(), ScenarioFailure> {
    let timeouts = ctx.config().timeouts;
    let step = timeouts.command();
    let interval = timeouts.poll_interval();
    let budget = Budget::Timeout(ctx.log_step());
    let target = ctx.legato().target_mut();

    let file = format!("{TOOL_SYSTEM}.ko");
    if !kmod::file_present(target, MODULES_DIR, &file, step)? {
        return Err(ScenarioFailure::fail(format!("{file} is not in {MODULES_DIR}")));
    }
    if !kmod::wait_for_module(target, TOOL_SYSTEM, true, interval, budget) {
        return Err(ScenarioFailure::fail("module was not loaded by the system"));
    }

    info!("loading an already loaded module");
    let check = kmod::check_loading(target, TOOL_SYSTEM, LoadResult::Duplicate, step)?;
    expect_answer("load", check, LoadResult::Duplicate, LoadResult::from_index)?;

    info!("unloading the module");
    let check = kmod::check_unloading(target, TOOL_SYSTEM, UnloadResult::Ok, step)?;
    expect_answer("unload", check, UnloadResult::Ok, UnloadResult::from_index)?;
    if !kmod::wait_for_module(target, TOOL_SYSTEM, false, interval, budget) {
        return Err(ScenarioFailure::fail("module is still listed after unloading"));
    }

    info!("loading the module again");
    let check = kmod::check_loading(target, TOOL_SYSTEM, LoadResult::Ok, step)?;
    expect_answer("load", check, LoadResult::Ok, LoadResult::from_index)?;
    if !kmod::wait_for_module(target, TOOL_SYSTEM, true, interval, budget) {
        return Err(ScenarioFailure::fail("module is not listed after loading"));
    }
    Ok(())
}

pub(super) fn expect_answer<R: Copy + std::fmt::Debug>(
    action: &str,
    check: KmodCheck,
    expected: R,
    describe: fn(usize) -> Option<R>,
) -> Result<(), ScenarioFailure> {
    if check.passed {
        return Ok(());
    }
    let message = match check.observed.and_then(describe) {
        Some(observed) => format!("kmod {action} answered {observed:?}, expected {expected:?}"),
        None => format!("kmod {action} gave no answer, expected {expected:?}"),
    };
    warn!("{message}");
    Err(ScenarioFailure::fail(message))
}
