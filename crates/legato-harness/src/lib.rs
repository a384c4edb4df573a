// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Legato Harness
//!
//! Log-event correlation primitives for black-box tests against a remote
//! Legato device.
//!
//! ## Architecture
//!
//! Leaves first:
//! - [`stream`] - line sources and the expect-style [`LogStream`] contract
//! - [`marker`] - [`LogMarker`] and [`OrderedMarkerList`]
//! - [`matcher`] - which marker shows up next, and whether one shows up at all
//! - [`order`] - ascending/descending ordering verification with a transcript
//! - [`poll`] - bounded-retry polling of boolean device checks
//!
//! Test-session plumbing sits next to them:
//! - [`session`] - one-time initialization and temporary workspaces
//! - [`cleanup`] - best-effort teardown steps that log instead of failing
//!
//! Everything is synchronous and blocking. Each wait carries an explicit
//! timeout chosen by the caller.

pub mod cleanup;
pub mod error;
pub mod marker;
pub mod matcher;
pub mod order;
pub mod poll;
pub mod session;
pub mod stream;

pub use cleanup::{CleanupOutcome, best_effort};
pub use error::{Classify, ExpectError, FailureKind};
pub use marker::{Direction, LogMarker, OrderedMarkerList};
pub use matcher::{is_present, lines_containing, match_next};
pub use order::{
    Observation, Step, VerificationOutcome, check_loading_order, check_order,
    check_unloading_order,
};
pub use poll::{
    Budget, Clock, MockClock, PollOutcome, Poller, SystemClock, poll_until, poll_until_ok,
};
pub use session::{Session, SessionError};
pub use stream::{
    ChannelSource, ExpectReader, LineRead, LineSource, LogStream, Match, ScriptedLog,
};
