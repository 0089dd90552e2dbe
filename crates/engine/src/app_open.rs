// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! App-open presentation on foreground

use crate::controller::AdsController;
use crate::orchestrator::{ShowCallbacks, ShowOutcome};
use adkit_core::{AdKind, Clock, TokioClock};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Spacing between app-open displays, shared by every presenter of a controller
#[derive(Debug, Clone, Default)]
pub struct DisplayThrottle {
    last: Arc<Mutex<Option<Instant>>>,
}

impl DisplayThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a display at `now` unless the last one was within `cooldown`
    pub fn try_acquire(&self, now: Instant, cooldown: Duration) -> bool {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let allowed = last.is_none_or(|at| now.saturating_duration_since(at) >= cooldown);
        if allowed {
            *last = Some(now);
        }
        allowed
    }
}

/// Shows the app-open unit when the app comes back to the foreground
pub struct AppOpenPresenter<C: Clock = TokioClock> {
    controller: AdsController<C>,
    index: usize,
    cooldown: Duration,
    throttle: DisplayThrottle,
}

impl<C: Clock> AppOpenPresenter<C> {
    pub(crate) fn new(
        controller: AdsController<C>,
        index: usize,
        cooldown: Duration,
        throttle: DisplayThrottle,
    ) -> Self {
        Self {
            controller,
            index,
            cooldown,
            throttle,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Show the app-open ad unless one was displayed within the cooldown
    ///
    /// Returns `None` when throttled. The display is recorded before the
    /// show is attempted, so a failed show still counts.
    pub async fn on_foreground(&self, callbacks: ShowCallbacks) -> Option<ShowOutcome> {
        let now = self.controller.clock().now();
        if !self.throttle.try_acquire(now, self.cooldown) {
            tracing::debug!(index = self.index, "app-open display throttled");
            return None;
        }
        Some(
            self.controller
                .show(AdKind::AppOpen, self.index, callbacks)
                .await,
        )
    }
}

#[cfg(test)]
#[path = "app_open_tests.rs"]
mod tests;
