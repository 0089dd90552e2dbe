// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced provider wrapper for consistent observability

use crate::provider::{AdHandle, Destroyable, Loadable, ReadyQueryable, Showable};
use adkit_core::{LoadFailure, ShowEventSender, UnitId};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any provider
#[derive(Clone)]
pub struct TracedProvider<P> {
    inner: P,
}

impl<P> TracedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: Loadable> Loadable for TracedProvider<P> {
    async fn load(&self, unit: UnitId) -> Result<Option<AdHandle>, LoadFailure> {
        let span = tracing::info_span!("provider.load", kind = %unit.kind, index = unit.index);

        // The span guard is not Send, so the span is attached to the future instead
        async move {
            tracing::info!("starting");

            let start = std::time::Instant::now();
            let result = self.inner.load(unit).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(Some(handle)) => tracing::info!(
                    handle = %handle.id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "ad loaded"
                ),
                Ok(None) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "load returned no ad and no error"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "load failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

impl<P: Showable> Showable for TracedProvider<P> {
    fn show(&self, unit: UnitId, events: ShowEventSender) {
        let span = tracing::info_span!("provider.show", kind = %unit.kind, index = unit.index);
        let _guard = span.enter();

        tracing::info!("showing");
        self.inner.show(unit, events);
    }

    fn hide(&self, unit: UnitId) {
        let span = tracing::info_span!("provider.hide", kind = %unit.kind, index = unit.index);
        let _guard = span.enter();

        self.inner.hide(unit);
        tracing::debug!("hidden");
    }
}

impl<P: ReadyQueryable> ReadyQueryable for TracedProvider<P> {
    fn is_ready(&self, unit: UnitId) -> bool {
        let ready = self.inner.is_ready(unit);
        tracing::trace!(%unit, ready, "checked");
        ready
    }
}

impl<P: Destroyable> Destroyable for TracedProvider<P> {
    fn destroy(&self, unit: UnitId) {
        let span = tracing::info_span!("provider.destroy", kind = %unit.kind, index = unit.index);
        let _guard = span.enter();

        self.inner.destroy(unit);
        tracing::info!("destroyed");
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
