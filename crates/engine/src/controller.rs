// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ads controller
//!
//! Client-facing entry point. Owns the unit table and wires the coordinator,
//! orchestrator and waiting indicator together. Units are only usable while
//! the controller is initialized; connectivity drives initialization and
//! teardown through [`AdsController::run`].

use crate::app_open::{AppOpenPresenter, DisplayThrottle};
use crate::coordinator::LoadCoordinator;
use crate::error::InitError;
use crate::indicator::{HideWhen, IndicatorSession, WaitingIndicator};
use crate::orchestrator::{
    AutoLoadOptions, ShowCallbacks, ShowOrchestrator, ShowOutcome, ShowSettings,
};
use crate::providers::ProviderSet;
use crate::registry::UnitRegistry;
use adkit_adapters::{ConnectivityGate, IndicatorAdapter, NotifyAdapter};
use adkit_core::{
    AdError, AdEvent, AdKind, AdUnit, AdsConfig, Clock, TokioClock, UnitId, UnitInput,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// Whether units are currently usable
#[derive(Clone, Default)]
pub(crate) struct Availability(Arc<AtomicBool>);

impl Availability {
    pub(crate) fn is_available(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns the previous value
    fn set(&self, available: bool) -> bool {
        self.0.swap(available, Ordering::SeqCst)
    }
}

/// Collaborators of the controller
pub struct ControllerDeps {
    pub providers: ProviderSet,
    pub indicator: Arc<dyn IndicatorAdapter>,
    pub notify: Arc<dyn NotifyAdapter>,
}

/// Ad lifecycle controller
pub struct AdsController<C: Clock = TokioClock> {
    config: Arc<AdsConfig>,
    registry: Arc<UnitRegistry<C>>,
    providers: ProviderSet,
    coordinator: LoadCoordinator<C>,
    orchestrator: ShowOrchestrator<C>,
    indicator: WaitingIndicator,
    availability: Availability,
    throttle: DisplayThrottle,
}

impl<C: Clock> Clone for AdsController<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: self.registry.clone(),
            providers: self.providers.clone(),
            coordinator: self.coordinator.clone(),
            orchestrator: self.orchestrator.clone(),
            indicator: self.indicator.clone(),
            availability: self.availability.clone(),
            throttle: self.throttle.clone(),
        }
    }
}

impl<C: Clock> AdsController<C> {
    /// Build a controller. Units start uninitialized.
    pub fn new(config: AdsConfig, deps: ControllerDeps, clock: C) -> Result<Self, InitError> {
        config.validate()?;
        if let Some(kind) = AdKind::ALL
            .into_iter()
            .find(|kind| config.units.count(*kind) > 0 && !deps.providers.contains(*kind))
        {
            return Err(InitError::MissingProvider(kind));
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let registry = Arc::new(UnitRegistry::new(config.units.unit_ids(), clock, events));
        let coordinator = LoadCoordinator::new(registry.clone(), deps.providers.clone(), &config);
        let indicator = WaitingIndicator::new(deps.indicator, config.indicator.poll_interval);
        let availability = Availability::default();
        let orchestrator = ShowOrchestrator::new(
            registry.clone(),
            deps.providers.clone(),
            coordinator.clone(),
            indicator.clone(),
            deps.notify,
            availability.clone(),
            ShowSettings {
                indicator_timeout: config.indicator.timeout,
                indicator_message: config.indicator.message.clone(),
                connectivity_hint: config.connectivity.hint.clone(),
            },
        );

        Ok(Self {
            config: Arc::new(config),
            registry,
            providers: deps.providers,
            coordinator,
            orchestrator,
            indicator,
            availability,
            throttle: DisplayThrottle::default(),
        })
    }

    pub fn config(&self) -> &AdsConfig {
        &self.config
    }

    /// Whether the controller is initialized and units are usable
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Subscribe to lifecycle and error events
    pub fn subscribe(&self) -> broadcast::Receiver<AdEvent> {
        self.registry.subscribe()
    }

    pub fn coordinator(&self) -> &LoadCoordinator<C> {
        &self.coordinator
    }

    pub fn orchestrator(&self) -> &ShowOrchestrator<C> {
        &self.orchestrator
    }

    /// Snapshot of every unit
    pub fn units(&self) -> Vec<AdUnit> {
        self.registry.snapshot()
    }

    pub fn unit(&self, kind: AdKind, index: usize) -> Option<AdUnit> {
        self.registry.get(UnitId::new(kind, index))
    }

    /// Mark every unit initialized and run the preload sequence
    pub async fn initialize(&self) {
        if self.is_available() {
            tracing::debug!("already initialized");
            return;
        }

        let ids = self.registry.ids();
        for id in &ids {
            if let Err(e) = self.registry.apply(*id, UnitInput::Initialize) {
                tracing::error!(unit = %id, error = %e, "failed to initialize unit");
            }
        }
        self.availability.set(true);
        tracing::info!(units = ids.len(), "ads initialized");

        let kinds = self.config.preload.kinds();
        for (i, kind) in kinds.iter().enumerate() {
            if !self.is_available() {
                tracing::info!("preload interrupted by teardown");
                return;
            }
            let unit = UnitId::new(*kind, 0);
            tracing::debug!(%unit, "preloading");
            self.coordinator.spawn_load(unit);
            if i + 1 < kinds.len() {
                tokio::time::sleep(self.config.preload.gap).await;
            }
        }

        self.registry.publish(AdEvent::AllAdsInitialized);
    }

    /// Destroy every unit and close the waiting indicator
    pub fn teardown(&self) {
        if !self.availability.set(false) {
            tracing::debug!("already torn down");
            return;
        }

        self.indicator.close();
        for id in self.registry.ids() {
            self.release(id, UnitInput::Teardown);
        }
        tracing::info!("ads torn down");
        self.registry.publish(AdEvent::UnitsTornDown);
    }

    /// Follow `gate`: initialize when online, tear down when offline
    ///
    /// Returns once the gate's stream ends.
    pub async fn run(&self, gate: &impl ConnectivityGate) {
        let mut online = gate.subscribe();
        let mut waiting_logged = false;
        let mut last = None;

        loop {
            let current = *online.borrow_and_update();
            if last != Some(current) {
                if last.is_some() {
                    self.registry
                        .publish(AdEvent::ConnectivityChanged { online: current });
                }
                last = Some(current);
            }

            if current {
                self.initialize().await;
            } else if self.is_available() {
                tracing::info!("connectivity lost");
                self.teardown();
            } else if !waiting_logged {
                tracing::info!("waiting for connectivity");
                waiting_logged = true;
            }

            if online.changed().await.is_err() {
                tracing::debug!("connectivity gate closed");
                return;
            }
        }
    }

    /// Load a unit, joining any load already in flight
    pub async fn load(&self, kind: AdKind, index: usize) -> Result<(), AdError> {
        let unit = self.resolve(kind, index)?;
        self.coordinator.load(unit).await
    }

    pub fn is_ready(&self, kind: AdKind, index: usize) -> bool {
        self.resolve(kind, index)
            .is_ok_and(|unit| self.orchestrator.is_ready(unit))
    }

    /// Show a unit if it is ready
    pub async fn show(
        &self,
        kind: AdKind,
        index: usize,
        mut callbacks: ShowCallbacks,
    ) -> ShowOutcome {
        match self.resolve(kind, index) {
            Ok(unit) => self.orchestrator.show(unit, callbacks).await,
            Err(e) => {
                self.reject(&e);
                callbacks.failed(e.clone());
                ShowOutcome::Failed(e)
            }
        }
    }

    /// Show a unit, loading it first if needed
    pub async fn show_with_auto_load(
        &self,
        kind: AdKind,
        index: usize,
        options: AutoLoadOptions,
        mut callbacks: ShowCallbacks,
    ) -> ShowOutcome {
        match self.resolve(kind, index) {
            Ok(unit) => {
                self.orchestrator
                    .show_with_auto_load(unit, options, callbacks)
                    .await
            }
            Err(e) => {
                self.reject(&e);
                callbacks.load_failed(e.clone());
                ShowOutcome::Failed(e)
            }
        }
    }

    /// Hide a persistent ad. The pending show completes as closed.
    pub fn hide(&self, kind: AdKind, index: usize) -> Result<(), AdError> {
        let unit = self.resolve(kind, index)?;
        let provider = self
            .providers
            .get(kind)
            .ok_or(AdError::InvalidUnit { unit })?;
        tracing::debug!(%unit, "hiding");
        provider.hide(unit);
        Ok(())
    }

    /// Release one unit. It stays initialized and can be loaded again.
    pub fn destroy(&self, kind: AdKind, index: usize) -> Result<(), AdError> {
        let unit = self.resolve(kind, index)?;
        self.release(unit, UnitInput::Destroy);
        Ok(())
    }

    /// Show the waiting indicator for a fixed duration
    pub fn show_waiting_for(&self, duration: Duration, message: &str) -> IndicatorSession {
        self.indicator.open(HideWhen::After(duration), message)
    }

    /// Show the waiting indicator until `predicate` holds
    pub fn show_waiting_until(
        &self,
        predicate: impl Fn() -> bool + Send + Sync + 'static,
        message: &str,
    ) -> IndicatorSession {
        self.indicator.open(HideWhen::condition(predicate), message)
    }

    /// Hide the waiting indicator. Returns false if it was not shown.
    pub fn hide_waiting(&self) -> bool {
        self.indicator.close()
    }

    /// Presenter for the app-open unit at `index`
    ///
    /// All presenters of one controller share the display throttle.
    pub fn app_open_presenter(&self, index: usize) -> AppOpenPresenter<C> {
        AppOpenPresenter::new(
            self.clone(),
            index,
            self.config.app_open.display_cooldown,
            self.throttle.clone(),
        )
    }

    pub(crate) fn clock(&self) -> &C {
        self.registry.clock()
    }

    fn resolve(&self, kind: AdKind, index: usize) -> Result<UnitId, AdError> {
        if !self.is_available() {
            return Err(AdError::ConnectivityUnavailable);
        }
        let unit = UnitId::new(kind, index);
        if index >= self.config.units.count(kind) {
            return Err(AdError::InvalidUnit { unit });
        }
        Ok(unit)
    }

    fn reject(&self, error: &AdError) {
        tracing::warn!(error = %error, "show rejected");
        self.registry.publish(AdEvent::Error {
            message: error.to_string(),
        });
    }

    fn release(&self, unit: UnitId, input: UnitInput) {
        if let Err(e) = self.coordinator.reset(unit, input) {
            tracing::error!(%unit, error = %e, "failed to release unit");
        }
        if let Some(provider) = self.providers.get(unit.kind) {
            provider.destroy(unit);
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
