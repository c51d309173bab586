// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    unauthorized = { "Invalid API key provided", AgentErrorKind::Unauthorized, false },
    credits      = { "Credit balance is too low", AgentErrorKind::OutOfCredits, false },
    rate_limited = { "429 rate limit exceeded", AgentErrorKind::RateLimited, true },
    network      = { "getaddrinfo ENOTFOUND api.anthropic.com", AgentErrorKind::NoInternet, true },
    timed_out    = { "agent timed out after 600s", AgentErrorKind::TimedOut, true },
    other        = { "something odd happened", AgentErrorKind::Other, true },
)]
fn classify(message: &str, kind: AgentErrorKind, recoverable: bool) {
    let err = AgentError::classify(message, 7);
    assert_eq!(err.kind, kind);
    assert_eq!(err.recoverable, recoverable);
    assert_eq!(err.timestamp_ms, 7);
    assert_eq!(err.message, message);
}

#[test]
fn display_includes_kind_and_message() {
    let err = AgentError::new(AgentErrorKind::RateLimited, "slow down", 0);
    assert_eq!(err.to_string(), "rate limited: slow down");
}

#[test]
fn usage_accumulates() {
    let mut total = UsageStats::default();
    assert!(total.is_empty());
    total += UsageStats {
        input_tokens: 10,
        output_tokens: 5,
        cache_read_input_tokens: 2,
        cache_creation_input_tokens: 1,
        total_cost_usd: 0.25,
    };
    total += UsageStats {
        input_tokens: 1,
        output_tokens: 1,
        total_cost_usd: 0.25,
        ..Default::default()
    };
    assert_eq!(total.input_tokens, 11);
    assert_eq!(total.total_tokens(), 20);
    assert!((total.total_cost_usd - 0.5).abs() < f64::EPSILON);
    assert!(!total.is_empty());
}
