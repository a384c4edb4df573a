// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the suite context.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;

use tempfile::TempDir;

use super::*;

fn config(resources: Option<&Path>, work: &Path) -> TargetConfig {
    let mut text = String::from("name = \"wp76xx\"\nhost = \"192.0.2.1\"\n[suite]\n");
    text.push_str(&format!("work_dir = \"{}\"\n", work.display()));
    if let Some(dir) = resources {
        text.push_str(&format!("resources_dir = \"{}\"\n", dir.display()));
    }
    TargetConfig::from_toml_str(&text).unwrap()
}

#[test]
fn session_lives_under_work_dir() {
    let work = TempDir::new().unwrap();
    let ctx = SuiteContext::new(config(None, work.path())).unwrap();
    assert!(ctx.session.root().starts_with(work.path()));
    assert!(ctx.session.test_dir().is_dir());
    assert_eq!(ctx.config().host, "192.0.2.1");
}

#[test]
fn unconfigured_resources_skip() {
    let work = TempDir::new().unwrap();
    let ctx = SuiteContext::new(config(None, work.path())).unwrap();
    assert!(matches!(
        ctx.resource("kmod/kmod_order.sdef"),
        Err(ScenarioFailure::Skip(_))
    ));
}

#[test]
fn missing_resource_skips_and_present_one_resolves() {
    let work = TempDir::new().unwrap();
    let resources = TempDir::new().unwrap();
    std::fs::create_dir(resources.path().join("kmod")).unwrap();
    std::fs::write(resources.path().join("kmod/kmod_order.sdef"), "").unwrap();

    let ctx = SuiteContext::new(config(Some(resources.path()), work.path())).unwrap();
    assert_eq!(
        ctx.resource("kmod/kmod_order.sdef").unwrap(),
        resources.path().join("kmod/kmod_order.sdef")
    );
    match ctx.resource("updateCtrlApi") {
        Err(ScenarioFailure::Skip(reason)) => assert!(reason.contains("updateCtrlApi")),
        other => panic!("expected skip, got {other:?}"),
    }
}

#[test]
fn teardown_empties_test_dir() {
    let work = TempDir::new().unwrap();
    let mut ctx = SuiteContext::new(config(None, work.path())).unwrap();
    let dir = ctx.session.test_dir().to_path_buf();
    std::fs::write(dir.join("helloWorld.wp76xx.update"), "x").unwrap();
    std::fs::create_dir(dir.join("_build")).unwrap();

    ctx.teardown("sample_hello_world");

    assert!(dir.is_dir());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn init_once_runs_a_single_time() {
    let work = TempDir::new().unwrap();
    let mut ctx = SuiteContext::new(config(None, work.path())).unwrap();
    let mut runs = 0;

    let mut count = |_: &mut SuiteContext| -> Result<(), ScenarioFailure> {
        runs += 1;
        Ok(())
    };
    assert!(ctx.init_once("golden", &mut count).unwrap());
    assert!(!ctx.init_once("golden", &mut count).unwrap());
    assert_eq!(runs, 1);
    assert!(ctx.session().is_initialized("golden"));
}

#[test]
fn failed_init_once_is_retried() {
    let work = TempDir::new().unwrap();
    let mut ctx = SuiteContext::new(config(None, work.path())).unwrap();

    let first = ctx.init_once("system", |_| Err(ScenarioFailure::fail("install failed")));
    assert!(matches!(first, Err(ScenarioFailure::Fail(_))));
    assert!(!ctx.session().is_initialized("system"));

    assert!(ctx.init_once("system", |_| Ok(())).unwrap());
}

#[test]
fn forgotten_init_runs_again() {
    let work = TempDir::new().unwrap();
    let mut ctx = SuiteContext::new(config(None, work.path())).unwrap();
    ctx.init_once("system", |_| Ok(())).unwrap();

    ctx.forget_init("system");

    assert!(ctx.init_once("system", |_| Ok(())).unwrap());
}
