// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Parsing of `legato status` and `app status` output.

use core::fmt;

use regex::Regex;

use crate::error::TargetError;

/// What `app status <name>` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Running,
    Stopped,
    Paused,
    NotInstalled,
    /// Anything else, verbatim.
    Other(String),
}

/// Health of the current system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemStatus {
    /// Probation passed.
    Good,
    /// Under probation, started this many times.
    Tried(u32),
    /// Installed but never started.
    Untried,
    /// Anything else, verbatim.
    Unknown(String),
}

impl SystemStatus {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        match text {
            "good" => Self::Good,
            "untried" => Self::Untried,
            _ => text
                .strip_prefix("tried")
                .and_then(|n| n.trim().parse().ok())
                .map_or_else(|| Self::Unknown(text.to_string()), Self::Tried),
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Tried(n) => write!(f, "tried {n}"),
            Self::Untried => write!(f, "untried"),
            Self::Unknown(text) => write!(f, "{text}"),
        }
    }
}

/// The parts of `legato status` the suite looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegatoStatus {
    /// Current system index.
    pub index: u32,
    /// Current system status.
    pub status: SystemStatus,
}

fn capture<'t>(pattern: &str, text: &'t str, what: &'static str) -> Result<&'t str, TargetError> {
    let parse_error = || TargetError::Parse {
        what,
        text: text.to_string(),
    };
    let re = Regex::new(pattern).map_err(|_| parse_error())?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(parse_error)
}

/// Parse `legato status` output.
///
/// ```text
/// Legato framework is running.
/// Current system index: 3
/// Current system status: tried 1
/// ```
pub fn parse_status(text: &str) -> Result<LegatoStatus, TargetError> {
    let index = capture(r"(?mi)system index:\s*(\d+)", text, "system index")?;
    let status = capture(r"(?mi)system status:\s*(\S.*?)\s*$", text, "system status")?;
    Ok(LegatoStatus {
        index: index.parse().map_err(|_| TargetError::Parse {
            what: "system index",
            text: index.to_string(),
        })?,
        status: SystemStatus::parse(status),
    })
}

/// Parse `app status <name>` output, e.g. `[running] helloWorld`.
pub fn parse_app_state(text: &str) -> Result<AppState, TargetError> {
    let state = text
        .trim_start()
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .map(|(state, _)| state.trim())
        .ok_or_else(|| TargetError::Parse {
            what: "app state",
            text: text.to_string(),
        })?;
    Ok(match state {
        "running" => AppState::Running,
        "stopped" => AppState::Stopped,
        "paused" => AppState::Paused,
        "not installed" => AppState::NotInstalled,
        other => AppState::Other(other.to_string()),
    })
}
