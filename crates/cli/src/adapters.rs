// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Console stand-ins for the on-screen collaborators

use crate::output::Timeline;
use adkit_adapters::{IndicatorAdapter, NotifyAdapter, NotifyError};
use async_trait::async_trait;

/// Prints waiting indicator changes to the timeline
pub struct ConsoleIndicator {
    timeline: Timeline,
}

impl ConsoleIndicator {
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }
}

impl IndicatorAdapter for ConsoleIndicator {
    fn show(&self, message: Option<&str>) {
        match message {
            Some(message) => self.timeline.line(format!("indicator shown: {message}")),
            None => self.timeline.line("indicator shown"),
        }
    }

    fn hide(&self) {
        self.timeline.line("indicator hidden");
    }
}

/// Prints notifications to the timeline as toasts
pub struct ConsoleNotifier {
    timeline: Timeline,
}

impl ConsoleNotifier {
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }
}

#[async_trait]
impl NotifyAdapter for ConsoleNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.timeline.line(format!("toast: {message}"));
        Ok(())
    }
}
