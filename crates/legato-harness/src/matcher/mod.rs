// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Marker matching against log lines and live log streams.


use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::ExpectError;
use crate::marker::LogMarker;
use crate::stream::{LogStream, Match};

/// Index of the marker that matches earliest in `line`.
///
/// When several markers match at the same offset the lowest index wins,
/// mirroring how an expect call resolves competing patterns.
#[must_use]
pub fn earliest_match(markers: &[LogMarker], line: &str) -> Option<usize> {
    markers
        .iter()
        .enumerate()
        .filter_map(|(index, marker)| marker.find(line).map(|offset| (offset, index)))
        .min()
        .map(|(_, index)| index)
}

/// Wait for whichever of `markers` appears next.
///
/// Timeouts and stream closure are logged with distinct messages before
/// being returned, so callers only need to decide what they mean.
pub fn match_next<S>(
    stream: &mut S,
    markers: &[LogMarker],
    timeout: Duration,
) -> Result<Match, ExpectError>
where
    S: LogStream + ?Sized,
{
    match stream.expect(markers, timeout) {
        Ok(found) => {
            debug!(index = found.index, line = %found.line, "marker matched");
            Ok(found)
        }
        Err(err) => {
            if err.is_timeout() {
                warn!("{err}");
            } else {
                error!("{err}");
            }
            Err(err)
        }
    }
}

/// Whether `marker` shows up within `timeout`.
///
/// A timeout means "not present" and yields `Ok(false)`.
///
/// # Errors
///
/// Stream closure is not a negative answer; it is returned as an error so
/// the caller can report lost communication.
pub fn is_present<S>(
    stream: &mut S,
    marker: &LogMarker,
    timeout: Duration,
) -> Result<bool, ExpectError>
where
    S: LogStream + ?Sized,
{
    match stream.expect(core::slice::from_ref(marker), timeout) {
        Ok(_) => Ok(true),
        Err(err) if err.is_timeout() => {
            debug!(%marker, "marker not present");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Every line of a log snapshot that contains `marker`.
#[must_use]
pub fn lines_containing<'a>(snapshot: &'a str, marker: &LogMarker) -> Vec<&'a str> {
    snapshot
        .lines()
        .filter(|line| marker.is_match(line))
        .collect()
}
