// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use std::thread;
use std::time::Duration;

use legato_harness::best_effort;
use legato_target::{Legato, SshTarget, SystemStatus, TargetError};
use tracing::info;

use crate::context::SuiteContext;
use crate::runner::ScenarioFailure;

const APP: &str = "testUpdateCtrl";
const PROBATION: Duration = Duration::from_secs(1);

pub(super) fn unlock_probation(ctx: &mut SuiteContext) -> Result<(), ScenarioFailure> {
    let app_dir = ctx.resource("updateCtrlApi/testUpdateCtrlApp")?;

    if ctx.legato().system_status()? != SystemStatus::Good {
        ctx.legato().restore_golden_legato()?;
    }
    ctx.builder()?.make_install(APP, &app_dir)?;

    let result = check_unlock(ctx.legato());

    let legato = ctx.legato();
    best_effort("reset probation timer", || legato.reset_probation_timer());
    best_effort("remove test app", || legato.remove_app(APP));
    result
}

fn check_unlock(legato: &mut Legato<SshTarget>) -> Result<(), ScenarioFailure> {
    legato.set_probation_timer(PROBATION)?;
    thread::sleep(PROBATION.saturating_mul(2));

    set_arg(legato, 1, "unLockProbation")?;
    set_arg(legato, 2, "1")?;

    let old_index = legato.system_index()?;
    legato.start_app(APP)?;
    let new_index = legato.system_index()?;
    let status = legato.system_status()?;
    info!(old_index, new_index, %status, "after unlocking probation");

    if status != SystemStatus::Good {
        return Err(ScenarioFailure::fail(format!(
            "unlocking an expired probation changed the system status to {status}"
        )));
    }
    if old_index != new_index {
        return Err(ScenarioFailure::fail(format!(
            "unlocking an expired probation moved the system index {old_index} -> {new_index}"
        )));
    }
    Ok(())
}

fn set_arg(legato: &mut Legato<SshTarget>, position: u32, value: &str) -> Result<(), TargetError> {
    legato.config_set(&format!("apps/{APP}/procs/{APP}/args/{position}"), value)
}
