// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Waiting indicator surface

/// Blocking "please wait" overlay
///
/// Calls are idempotent: showing while shown replaces the message, hiding
/// while hidden does nothing.
pub trait IndicatorAdapter: Send + Sync + 'static {
    /// Show the overlay. `None` shows it without a text line.
    fn show(&self, message: Option<&str>);

    fn hide(&self);
}

/// Indicator that draws nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpIndicator;

impl IndicatorAdapter for NoOpIndicator {
    fn show(&self, _message: Option<&str>) {}

    fn hide(&self) {}
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    #![cfg_attr(coverage_nightly, coverage(off))]

    use super::IndicatorAdapter;
    use std::sync::{Arc, Mutex};

    /// Recorded indicator call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum IndicatorCall {
        Show(Option<String>),
        Hide,
    }

    /// Fake indicator for testing
    #[derive(Clone, Default)]
    pub struct FakeIndicator {
        calls: Arc<Mutex<Vec<IndicatorCall>>>,
    }

    impl FakeIndicator {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<IndicatorCall> {
            self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        /// Whether the last call left the overlay on screen
        pub fn is_visible(&self) -> bool {
            matches!(self.calls().last(), Some(IndicatorCall::Show(_)))
        }

        /// Message of the most recent show
        pub fn last_message(&self) -> Option<String> {
            self.calls()
                .into_iter()
                .rev()
                .find_map(|call| match call {
                    IndicatorCall::Show(message) => Some(message),
                    IndicatorCall::Hide => None,
                })
                .flatten()
        }

        pub fn show_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| matches!(call, IndicatorCall::Show(_)))
                .count()
        }
    }

    impl IndicatorAdapter for FakeIndicator {
        fn show(&self, message: Option<&str>) {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(IndicatorCall::Show(message.map(str::to_string)));
        }

        fn hide(&self) {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(IndicatorCall::Hide);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeIndicator, IndicatorCall};
