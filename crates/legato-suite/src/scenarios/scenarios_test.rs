// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the scenario registry and shared checks.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;
use std::path::Path;

use legato_target::{KmodCheck, LoadResult, TargetConfig, UnloadResult};
use tempfile::TempDir;

use super::*;

fn context(work: &Path) -> SuiteContext {
    let text = format!(
        "name = \"wp76xx\"\nhost = \"192.0.2.1\"\n[suite]\nwork_dir = \"{}\"\n",
        work.display()
    );
    SuiteContext::new(TargetConfig::from_toml_str(&text).unwrap()).unwrap()
}

#[test]
fn names_are_unique() {
    let scenarios = all();
    let names: HashSet<_> = scenarios.iter().map(|s| s.name).collect();
    assert_eq!(names.len(), scenarios.len());
    assert!(names.contains("kmod_tool_load_unload"));
}

#[test]
fn kmod_tool_without_resources_skips_before_installing() {
    let work = TempDir::new().unwrap();
    let mut ctx = context(work.path());
    match kmod::tool_load_unload(&mut ctx) {
        Err(ScenarioFailure::Skip(reason)) => assert!(reason.contains("resources_dir")),
        other => panic!("expected skip, got {other:?}"),
    }
    assert!(!ctx.session().is_initialized("kmod_tool system installed"));
}

#[test]
fn expected_answer_passes() {
    let check = KmodCheck {
        passed: true,
        observed: Some(0),
    };
    assert!(kmod::expect_answer("load", check, LoadResult::Ok, LoadResult::from_index).is_ok());
}

#[test]
fn wrong_answer_names_both_outcomes() {
    let check = KmodCheck {
        passed: false,
        observed: Some(2),
    };
    match kmod::expect_answer("unload", check, UnloadResult::Ok, UnloadResult::from_index) {
        Err(ScenarioFailure::Fail(msg)) => {
            assert_eq!(msg, "kmod unload answered Busy, expected Ok");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn missing_answer_is_reported() {
    let check = KmodCheck {
        passed: false,
        observed: None,
    };
    match kmod::expect_answer("load", check, LoadResult::Duplicate, LoadResult::from_index) {
        Err(ScenarioFailure::Fail(msg)) => {
            assert_eq!(msg, "kmod load gave no answer, expected Duplicate");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
