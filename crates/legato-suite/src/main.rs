// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Command-line entry point for the Legato device suite.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use legato_suite::{SuiteContext, list_scenarios, run_scenarios, scenarios};
use legato_target::TargetConfig;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Run Legato scenarios against a device.
#[derive(Parser, Debug)]
#[command(name = "legato-suite", version)]
struct Args {
    /// Target description (TOML).
    #[arg(short, long, default_value = "target.toml")]
    config: PathBuf,

    /// List the available scenarios and exit.
    #[arg(long)]
    list: bool,

    /// Scenarios to run; all of them when empty.
    names: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("legato=info")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let cases = scenarios::all();
    let mut out = io::stdout().lock();

    if args.list {
        list_scenarios(&cases, &mut out)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = TargetConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let mut ctx = SuiteContext::new(config).context("preparing the suite")?;

    let summary = run_scenarios(&cases, &mut ctx, &args.names, &mut out)?;
    out.flush()?;

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
