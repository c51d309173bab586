// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op keep-awake for headless or disabled use.

use super::{KeepAwake, KeepAwakeError};
use async_trait::async_trait;
use autorun_core::SessionId;

/// Keep-awake adapter that does nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpKeepAwake;

impl NoOpKeepAwake {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeepAwake for NoOpKeepAwake {
    async fn acquire(&self, _session: &SessionId) -> Result<(), KeepAwakeError> {
        Ok(())
    }

    async fn release(&self, _session: &SessionId) -> Result<(), KeepAwakeError> {
        Ok(())
    }
}
