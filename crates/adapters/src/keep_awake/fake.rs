// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake keep-awake adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{KeepAwake, KeepAwakeError};
use async_trait::async_trait;
use autorun_core::SessionId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Recorded call to FakeKeepAwake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepAwakeCall {
    Acquire(SessionId),
    Release(SessionId),
}

/// Tracks which sessions hold the host awake
#[derive(Clone, Default)]
pub struct FakeKeepAwake {
    inner: Arc<Mutex<FakeKeepAwakeState>>,
}

#[derive(Default)]
struct FakeKeepAwakeState {
    calls: Vec<KeepAwakeCall>,
    held: HashSet<SessionId>,
    fail_acquire: bool,
}

impl FakeKeepAwake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_acquire(&self, fail: bool) {
        self.inner.lock().fail_acquire = fail;
    }

    pub fn is_held(&self, session: &SessionId) -> bool {
        self.inner.lock().held.contains(session)
    }

    pub fn calls(&self) -> Vec<KeepAwakeCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl KeepAwake for FakeKeepAwake {
    async fn acquire(&self, session: &SessionId) -> Result<(), KeepAwakeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(KeepAwakeCall::Acquire(session.clone()));
        if inner.fail_acquire {
            return Err(KeepAwakeError::AcquireFailed("scripted".to_string()));
        }
        inner.held.insert(session.clone());
        Ok(())
    }

    async fn release(&self, session: &SessionId) -> Result<(), KeepAwakeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(KeepAwakeCall::Release(session.clone()));
        inner.held.remove(session);
        Ok(())
    }
}
