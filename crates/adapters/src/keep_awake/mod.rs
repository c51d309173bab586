// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keep-awake holds that stop the host sleeping while a run is active

mod command;
mod noop;

pub use command::CommandKeepAwake;
pub use noop::NoOpKeepAwake;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeKeepAwake, KeepAwakeCall};

use async_trait::async_trait;
use autorun_core::SessionId;
use thiserror::Error;

/// Errors from keep-awake operations
#[derive(Debug, Error)]
pub enum KeepAwakeError {
    #[error("failed to acquire keep-awake hold: {0}")]
    AcquireFailed(String),
}

/// Adapter holding the host awake per session
#[async_trait]
pub trait KeepAwake: Clone + Send + Sync + 'static {
    /// Take a hold for `session`; a second acquire for the same session is a no-op
    async fn acquire(&self, session: &SessionId) -> Result<(), KeepAwakeError>;

    /// Drop the hold for `session`, if any
    async fn release(&self, session: &SessionId) -> Result<(), KeepAwakeError>;
}
