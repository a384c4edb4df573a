// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for bounded-retry polling.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Instant;

use proptest::prelude::*;

use super::*;

const SECOND: Duration = Duration::from_secs(1);

#[test]
fn true_on_fourth_poll() {
    let clock = MockClock::new();
    let poller = Poller::with_clock(SECOND, Budget::Timeout(Duration::from_secs(10)), &clock);
    let mut calls = 0;
    let outcome = poller.run(|| {
        calls += 1;
        calls == 4
    });
    assert!(outcome.satisfied);
    assert_eq!(outcome.attempts, 4);
    assert_eq!(calls, 4);
    assert_eq!(clock.sleeps(), 3);
    assert_eq!(outcome.elapsed, Duration::from_secs(3));
}

#[test]
fn immediate_success_does_not_sleep() {
    let clock = MockClock::new();
    let outcome = Poller::with_clock(SECOND, Budget::Retries(5), &clock).run(|| true);
    assert!(outcome.satisfied);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(clock.sleeps(), 0);
}

#[test]
fn never_true_stops_at_timeout() {
    let clock = MockClock::new();
    let limit = Duration::from_secs(5);
    let outcome = Poller::with_clock(SECOND, Budget::Timeout(limit), &clock).run(|| false);
    assert!(!outcome.satisfied);
    assert_eq!(outcome.attempts, 6);
    assert_eq!(outcome.elapsed, limit);
}

#[test]
fn last_sleep_is_clipped_to_budget() {
    let clock = MockClock::new();
    let limit = Duration::from_millis(2500);
    let outcome = Poller::with_clock(SECOND, Budget::Timeout(limit), &clock).run(|| false);
    assert!(!outcome.satisfied);
    assert_eq!(outcome.elapsed, limit);
    assert_eq!(outcome.attempts, 4);
}

#[test]
fn retries_count_after_first_attempt() {
    let clock = MockClock::new();
    let outcome = Poller::with_clock(SECOND, Budget::Retries(30), &clock).run(|| false);
    assert!(!outcome.satisfied);
    assert_eq!(outcome.attempts, 31);
    assert_eq!(clock.sleeps(), 30);
}

#[test]
fn zero_retries_polls_once() {
    let clock = MockClock::new();
    let outcome = Poller::with_clock(SECOND, Budget::Retries(0), &clock).run(|| false);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(clock.sleeps(), 0);
}

#[test]
fn slow_checks_eat_into_budget() {
    let clock = MockClock::new();
    let outcome = Poller::with_clock(SECOND, Budget::Timeout(Duration::from_secs(4)), &clock)
        .run(|| {
            clock.advance(Duration::from_secs(2));
            false
        });
    assert!(!outcome.satisfied);
    assert_eq!(outcome.attempts, 2);
}

#[test]
fn errors_count_as_not_yet_true() {
    let clock = MockClock::new();
    let poller = Poller::with_clock(SECOND, Budget::Retries(10), &clock);
    let mut calls = 0;
    let outcome = poller.run_fallible(|| {
        calls += 1;
        match calls {
            1 | 2 => Err("device unreachable"),
            3 => Ok(false),
            _ => Ok(true),
        }
    });
    assert!(outcome.satisfied);
    assert_eq!(outcome.attempts, 4);
}

#[test]
fn wall_clock_timeout_is_bounded() {
    let interval = Duration::from_millis(10);
    let limit = Duration::from_millis(60);
    let start = Instant::now();
    assert!(!poll_until(|| false, interval, Budget::Timeout(limit)));
    let spent = start.elapsed();
    assert!(spent >= limit);
    assert!(spent < limit + interval + Duration::from_millis(500));
}

#[test]
fn wall_clock_fallible_success() {
    let mut calls = 0;
    let ok = poll_until_ok(
        || {
            calls += 1;
            if calls < 3 { Err("not yet") } else { Ok(true) }
        },
        Duration::from_millis(1),
        Budget::Retries(5),
    );
    assert!(ok);
    assert_eq!(calls, 3);
}

proptest! {
    #[test]
    fn elapsed_never_exceeds_budget(
        interval_ms in 1u64..2_000,
        limit_ms in 0u64..20_000,
        check_ms in 0u64..500,
    ) {
        let clock = MockClock::new();
        let interval = Duration::from_millis(interval_ms);
        let limit = Duration::from_millis(limit_ms);
        let check = Duration::from_millis(check_ms);
        let outcome = Poller::with_clock(interval, Budget::Timeout(limit), &clock).run(|| {
            clock.advance(check);
            false
        });
        prop_assert!(!outcome.satisfied);
        prop_assert!(outcome.elapsed >= limit);
        prop_assert!(outcome.elapsed <= limit + check);
    }

    #[test]
    fn succeeds_on_nth_attempt(n in 1u32..50) {
        let clock = MockClock::new();
        let mut calls = 0;
        let outcome = Poller::with_clock(SECOND, Budget::Retries(n), &clock).run(|| {
            calls += 1;
            calls == n
        });
        prop_assert!(outcome.satisfied);
        prop_assert_eq!(outcome.attempts, n);
        prop_assert_eq!(clock.sleeps(), n - 1);
    }
}
