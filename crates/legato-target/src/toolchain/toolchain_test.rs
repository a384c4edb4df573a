// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for toolchain resolution.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use super::*;

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
    }
}

#[test]
fn variable_names_follow_target() {
    assert_eq!(ToolchainEnv::sysroot_var("wp76xx"), "WP76XX_SYSROOT");
    assert_eq!(ToolchainEnv::kernel_root_var("wp85"), "WP85_KERNELROOT");
}

#[test]
fn kernel_root_defaults_under_sysroot() {
    let env = ToolchainEnv::resolve("wp76xx", lookup(&[("WP76XX_SYSROOT", "/opt/sysroot")])).unwrap();
    assert_eq!(env.sysroot(), Path::new("/opt/sysroot"));
    assert_eq!(env.kernel_root(), Path::new("/opt/sysroot/usr/src/kernel"));
    assert!(env.legato_root().is_err());
}

#[test]
fn explicit_kernel_root_wins() {
    let env = ToolchainEnv::resolve(
        "wp76xx",
        lookup(&[
            ("WP76XX_SYSROOT", "/opt/sysroot"),
            ("WP76XX_KERNELROOT", "/opt/kernel"),
            ("LEGATO_ROOT", "/src/legato"),
        ]),
    )
    .unwrap();
    assert_eq!(env.kernel_root(), Path::new("/opt/kernel"));
    assert_eq!(env.legato_root().unwrap(), Path::new("/src/legato"));
    assert_eq!(env.vars().len(), 3);
}

#[test]
fn missing_sysroot_is_an_error() {
    let err = ToolchainEnv::resolve("wp76xx", lookup(&[("WP76XX_SYSROOT", "  ")])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing(var) if var == "WP76XX_SYSROOT"));
}
