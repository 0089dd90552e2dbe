// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellable scheduled callbacks

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A scheduled callback. Dropping the handle cancels it.
#[derive(Debug)]
pub(crate) struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Run `action` once after `delay`
    pub(crate) fn after<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        })
    }

    /// Evaluate `condition` every `interval` and run `action` once it holds
    pub(crate) fn when<P, F>(interval: Duration, condition: P, action: F) -> Self
    where
        P: Fn() -> bool + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        Self::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if condition() {
                    break;
                }
            }
            action();
        })
    }

    fn spawn(future: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            task: tokio::spawn(future),
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
