// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use legato_harness::best_effort;

use crate::context::SuiteContext;
use crate::runner::ScenarioFailure;

const APP: &str = "helloWorld";
const GREETING: &str = "Hello, world.";

pub(super) fn hello_world(ctx: &mut SuiteContext) -> Result<(), ScenarioFailure> {
    let builder = ctx.builder()?;
    let root = builder
        .toolchain()
        .legato_root()
        .map_err(|err| ScenarioFailure::skip(err.to_string()))?;
    builder.make_install(APP, &root.join("apps/sample").join(APP))?;

    let timeout = ctx.log_step();
    let legato = ctx.legato();
    let seen = legato.wait_for_log_msg(GREETING, timeout);
    best_effort("remove helloWorld", || legato.remove_app(APP));

    if seen {
        Ok(())
    } else {
        Err(ScenarioFailure::fail(format!("{GREETING:?} never appeared in the device log")))
    }
}
