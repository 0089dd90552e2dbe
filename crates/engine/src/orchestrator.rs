// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ensure-ready-then-show
//!
//! The composite show tries to show immediately. If the unit is not ready
//! it loads first, retrying a failed load exactly once, and keeps the
//! waiting indicator up while the caller waits. Show failures are never
//! retried.

use crate::controller::Availability;
use crate::coordinator::LoadCoordinator;
use crate::indicator::{HideWhen, IndicatorSession, WaitingIndicator};
use crate::providers::ProviderSet;
use crate::registry::UnitRegistry;
use adkit_adapters::NotifyAdapter;
use adkit_core::{
    show_channel, AdError, AdEvent, AdValue, Clock, Reward, ShowEvent, TokioClock, UnitId,
    UnitInput,
};
use std::sync::Arc;
use std::time::Duration;

/// Flags of the composite show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoLoadOptions {
    /// Load the unit when it is not ready instead of giving up
    pub auto_load_if_not_ready: bool,
    /// Pre-warm the unit in the background once the ad closes
    pub auto_load_if_closed: bool,
    /// Retry a failed load once
    pub auto_load_if_load_failed: bool,
    pub show_waiting_indicator: bool,
}

impl Default for AutoLoadOptions {
    fn default() -> Self {
        Self {
            auto_load_if_not_ready: true,
            auto_load_if_closed: true,
            auto_load_if_load_failed: true,
            show_waiting_indicator: true,
        }
    }
}

/// Terminal result of a show request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The ad was shown and dismissed
    Closed,
    /// Not ready and loading was not requested; nothing happened
    Skipped,
    Failed(AdError),
}

impl ShowOutcome {
    pub fn is_closed(&self) -> bool {
        matches!(self, ShowOutcome::Closed)
    }

    pub fn error(&self) -> Option<&AdError> {
        match self {
            ShowOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

type Once = Box<dyn FnOnce() + Send>;
type Repeat = Box<dyn FnMut() + Send>;

/// Per-show continuations
///
/// Close and failure continuations run at most once, and only one of them
/// runs per show.
#[derive(Default)]
pub struct ShowCallbacks {
    on_loaded: Option<Once>,
    on_load_failed: Option<Box<dyn FnOnce(AdError) + Send>>,
    on_open: Option<Repeat>,
    on_close: Option<Once>,
    on_failed: Option<Box<dyn FnOnce(AdError) + Send>>,
    on_clicked: Option<Repeat>,
    on_impression: Option<Repeat>,
    on_paid: Option<Box<dyn FnMut(AdValue) + Send>>,
    on_reward: Option<Box<dyn FnMut(Reward) + Send>>,
}

impl ShowCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when the composite show had to load and the load succeeded
    pub fn on_loaded(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_loaded = Some(Box::new(f));
        self
    }

    /// Called when the composite show gives up before an ad is loaded.
    /// Without it those failures go to [`on_failed`](Self::on_failed).
    pub fn on_load_failed(mut self, f: impl FnOnce(AdError) + Send + 'static) -> Self {
        self.on_load_failed = Some(Box::new(f));
        self
    }

    pub fn on_open(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_open = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn on_failed(mut self, f: impl FnOnce(AdError) + Send + 'static) -> Self {
        self.on_failed = Some(Box::new(f));
        self
    }

    pub fn on_clicked(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_clicked = Some(Box::new(f));
        self
    }

    pub fn on_impression(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_impression = Some(Box::new(f));
        self
    }

    pub fn on_paid(mut self, f: impl FnMut(AdValue) + Send + 'static) -> Self {
        self.on_paid = Some(Box::new(f));
        self
    }

    pub fn on_reward(mut self, f: impl FnMut(Reward) + Send + 'static) -> Self {
        self.on_reward = Some(Box::new(f));
        self
    }

    fn loaded(&mut self) {
        if let Some(f) = self.on_loaded.take() {
            f();
        }
    }

    fn dispatch(&mut self, event: ShowEvent) {
        match event {
            ShowEvent::Opened => call(&mut self.on_open),
            ShowEvent::Impression => call(&mut self.on_impression),
            ShowEvent::Clicked => call(&mut self.on_clicked),
            ShowEvent::Paid(value) => {
                if let Some(f) = self.on_paid.as_mut() {
                    f(value);
                }
            }
            ShowEvent::Rewarded(reward) => {
                if let Some(f) = self.on_reward.as_mut() {
                    f(reward);
                }
            }
            ShowEvent::Closed | ShowEvent::Failed(_) => {}
        }
    }

    fn closed(&mut self) {
        self.on_failed = None;
        self.on_load_failed = None;
        if let Some(f) = self.on_close.take() {
            f();
        }
    }

    pub(crate) fn failed(&mut self, error: AdError) {
        self.on_close = None;
        self.on_load_failed = None;
        if let Some(f) = self.on_failed.take() {
            f(error);
        }
    }

    pub(crate) fn load_failed(&mut self, error: AdError) {
        match self.on_load_failed.take() {
            Some(f) => {
                self.on_close = None;
                self.on_failed = None;
                f(error);
            }
            None => self.failed(error),
        }
    }
}

fn call(callback: &mut Option<Repeat>) {
    if let Some(f) = callback.as_mut() {
        f();
    }
}

/// Indicator and notification settings for orchestrated shows
#[derive(Debug, Clone)]
pub(crate) struct ShowSettings {
    pub(crate) indicator_timeout: Duration,
    pub(crate) indicator_message: String,
    pub(crate) connectivity_hint: String,
}

/// What the load phase of a composite show produced
enum Prepared {
    /// Already ready, no load needed
    Ready,
    Loaded,
    Skipped,
    Failed { error: AdError, hint: bool },
}

/// Runs show requests against the registered providers
pub struct ShowOrchestrator<C: Clock = TokioClock> {
    registry: Arc<UnitRegistry<C>>,
    providers: ProviderSet,
    coordinator: LoadCoordinator<C>,
    indicator: WaitingIndicator,
    notify: Arc<dyn NotifyAdapter>,
    availability: Availability,
    settings: ShowSettings,
}

impl<C: Clock> Clone for ShowOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            providers: self.providers.clone(),
            coordinator: self.coordinator.clone(),
            indicator: self.indicator.clone(),
            notify: self.notify.clone(),
            availability: self.availability.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<C: Clock> ShowOrchestrator<C> {
    pub(crate) fn new(
        registry: Arc<UnitRegistry<C>>,
        providers: ProviderSet,
        coordinator: LoadCoordinator<C>,
        indicator: WaitingIndicator,
        notify: Arc<dyn NotifyAdapter>,
        availability: Availability,
        settings: ShowSettings,
    ) -> Self {
        Self {
            registry,
            providers,
            coordinator,
            indicator,
            notify,
            availability,
            settings,
        }
    }

    /// Whether the unit holds a fresh ad its provider can show
    pub fn is_ready(&self, unit: UnitId) -> bool {
        let now = self.registry.clock().now();
        let Some(provider) = self.providers.get(unit.kind) else {
            return false;
        };
        self.registry
            .get(unit)
            .is_some_and(|state| state.is_ready(now))
            && provider.is_ready(unit)
    }

    /// Show `unit`, loading it first if needed
    pub async fn show_with_auto_load(
        &self,
        unit: UnitId,
        options: AutoLoadOptions,
        mut callbacks: ShowCallbacks,
    ) -> ShowOutcome {
        let session = options.show_waiting_indicator.then(|| {
            self.indicator.open(
                HideWhen::After(self.settings.indicator_timeout),
                &self.settings.indicator_message,
            )
        });

        let outcome = match self.prepare(unit, &options).await {
            prepared @ (Prepared::Ready | Prepared::Loaded) => {
                if matches!(prepared, Prepared::Loaded) {
                    callbacks.loaded();
                }
                self.present(unit, callbacks, options.auto_load_if_closed, session.as_ref())
                    .await
            }
            Prepared::Skipped => {
                tracing::debug!(%unit, "not ready and auto-load disabled");
                ShowOutcome::Skipped
            }
            Prepared::Failed { error, hint } => {
                close(session.as_ref());
                tracing::warn!(%unit, error = %error, "show abandoned, load failed");
                // Provider load failures are published by the coordinator
                if !matches!(error, AdError::LoadFailed { .. }) {
                    self.registry.publish(AdEvent::Error {
                        message: error.to_string(),
                    });
                }
                callbacks.load_failed(error.clone());
                if hint {
                    self.notify_hint().await;
                }
                ShowOutcome::Failed(error)
            }
        };

        close(session.as_ref());
        outcome
    }

    /// Show `unit` only if it is ready
    pub async fn show(&self, unit: UnitId, callbacks: ShowCallbacks) -> ShowOutcome {
        self.present(unit, callbacks, false, None).await
    }

    async fn prepare(&self, unit: UnitId, options: &AutoLoadOptions) -> Prepared {
        if self.is_ready(unit) {
            return Prepared::Ready;
        }
        if !options.auto_load_if_not_ready {
            return Prepared::Skipped;
        }

        let first = match self.coordinator.load(unit).await {
            Ok(()) => return Prepared::Loaded,
            Err(e) => e,
        };

        let retryable = matches!(
            first,
            AdError::LoadFailed { .. } | AdError::CooldownActive { .. }
        );
        if !options.auto_load_if_load_failed || !retryable {
            return Prepared::Failed {
                error: first,
                hint: false,
            };
        }

        tracing::info!(%unit, error = %first, "load failed, retrying once");
        match self.coordinator.load_when_allowed(unit).await {
            Ok(()) => Prepared::Loaded,
            Err(error) => Prepared::Failed { error, hint: true },
        }
    }

    async fn present(
        &self,
        unit: UnitId,
        mut callbacks: ShowCallbacks,
        reload_on_close: bool,
        session: Option<&IndicatorSession>,
    ) -> ShowOutcome {
        let provider = match self.providers.get(unit.kind) {
            Some(provider) if provider.is_ready(unit) => provider,
            Some(_) => {
                return self.fail(unit, AdError::NotReady { unit }, callbacks, session);
            }
            None => {
                return self.fail(unit, AdError::InvalidUnit { unit }, callbacks, session);
            }
        };
        if let Err(e) = self.registry.begin_show(unit) {
            return self.fail(unit, e, callbacks, session);
        }

        let (tx, mut rx) = show_channel();
        provider.show(unit, tx);

        loop {
            let reason = match rx.recv().await {
                Some(ShowEvent::Closed) => {
                    self.record(unit, UnitInput::ShowClosed);
                    close(session);
                    if reload_on_close && self.availability.is_available() {
                        self.coordinator.spawn_load_when_allowed(unit);
                    }
                    tracing::info!(%unit, "ad closed");
                    callbacks.closed();
                    return ShowOutcome::Closed;
                }
                Some(ShowEvent::Failed(reason)) => reason,
                Some(event) => {
                    tracing::debug!(%unit, event = event.name(), "show event");
                    callbacks.dispatch(event);
                    continue;
                }
                None => "provider ended the show without closing".to_string(),
            };

            self.record(
                unit,
                UnitInput::ShowFailed {
                    reason: reason.clone(),
                },
            );
            return self.fail(unit, AdError::ShowFailed { unit, reason }, callbacks, session);
        }
    }

    fn fail(
        &self,
        unit: UnitId,
        error: AdError,
        mut callbacks: ShowCallbacks,
        session: Option<&IndicatorSession>,
    ) -> ShowOutcome {
        close(session);
        tracing::warn!(%unit, error = %error, "show failed");
        self.registry.publish(AdEvent::Error {
            message: error.to_string(),
        });
        callbacks.failed(error.clone());
        ShowOutcome::Failed(error)
    }

    fn record(&self, unit: UnitId, input: UnitInput) {
        if let Err(e) = self.registry.apply(unit, input) {
            tracing::error!(%unit, error = %e, "failed to record show result");
        }
    }

    async fn notify_hint(&self) {
        if let Err(e) = self.notify.notify(&self.settings.connectivity_hint).await {
            tracing::warn!(error = %e, "failed to show connectivity hint");
        }
    }
}

fn close(session: Option<&IndicatorSession>) {
    if let Some(session) = session {
        session.close();
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
