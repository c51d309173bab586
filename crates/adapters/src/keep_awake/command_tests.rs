// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sleeper() -> CommandKeepAwake {
    CommandKeepAwake::new("sleep", vec!["30".to_string()])
}

#[tokio::test]
async fn acquire_is_idempotent_per_session() {
    let keep = sleeper();
    let session = SessionId::new("s1");
    keep.acquire(&session).await.unwrap();
    keep.acquire(&session).await.unwrap();
    assert_eq!(keep.held_count(), 1);

    keep.acquire(&SessionId::new("s2")).await.unwrap();
    assert_eq!(keep.held_count(), 2);

    keep.release(&session).await.unwrap();
    keep.release(&SessionId::new("s2")).await.unwrap();
    assert_eq!(keep.held_count(), 0);
}

#[tokio::test]
async fn release_without_hold_is_ok() {
    sleeper().release(&SessionId::new("none")).await.unwrap();
}

#[tokio::test]
async fn missing_program_fails_to_acquire() {
    let keep = CommandKeepAwake::new("/nonexistent/inhibit", vec![]);
    let err = keep.acquire(&SessionId::new("s")).await.unwrap_err();
    assert!(err.to_string().contains("/nonexistent/inhibit"));
    assert_eq!(keep.held_count(), 0);
}
