// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing notifications (toasts)

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from notification operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    SendFailed(String),
}

/// Short-lived message to the user
#[async_trait]
pub trait NotifyAdapter: Send + Sync + 'static {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// Notifier that drops every message
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify(&self, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
