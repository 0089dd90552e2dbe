// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight load coordination
//!
//! At most one provider load runs per unit. Callers arriving while a load is
//! in flight are parked in the pending table and receive the same outcome.
//! The load itself runs on its own task, so the outcome is delivered even if
//! the caller that started it goes away.

use crate::providers::ProviderSet;
use crate::registry::UnitRegistry;
use adkit_adapters::AdHandle;
use adkit_core::{
    AdError, AdEvent, AdKind, AdUnit, AdsConfig, Clock, CooldownPolicy, LoadFailure, TokioClock,
    UnitId, UnitInput,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

type Waiter = oneshot::Sender<Result<(), AdError>>;
type Pending = oneshot::Receiver<Result<(), AdError>>;

/// An in-flight provider load and everyone waiting on it
struct InFlight {
    /// Unit generation when the load started
    generation: u64,
    started_at: Instant,
    waiters: Vec<Waiter>,
}

struct Inner<C: Clock> {
    registry: Arc<UnitRegistry<C>>,
    providers: ProviderSet,
    cooldown: CooldownPolicy,
    validity: HashMap<AdKind, Duration>,
    in_flight: Mutex<HashMap<UnitId, InFlight>>,
}

/// Deduplicates concurrent loads per unit and applies the cooldown policy
pub struct LoadCoordinator<C: Clock = TokioClock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for LoadCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Clock> LoadCoordinator<C> {
    pub(crate) fn new(
        registry: Arc<UnitRegistry<C>>,
        providers: ProviderSet,
        config: &AdsConfig,
    ) -> Self {
        let validity = AdKind::ALL
            .into_iter()
            .filter_map(|kind| config.validity_for(kind).map(|window| (kind, window)))
            .collect();
        Self {
            inner: Arc::new(Inner {
                registry,
                providers,
                cooldown: CooldownPolicy::new(config.cooldown.clone()),
                validity,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Load `unit`, joining an in-flight load if there is one
    ///
    /// Returns immediately when the unit already holds a fresh ad. Fails
    /// fast with [`AdError::CooldownActive`] while the unit is cooling down.
    pub async fn load(&self, unit: UnitId) -> Result<(), AdError> {
        match self.begin(unit)? {
            None => Ok(()),
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(AdError::LoadFailed {
                    unit,
                    failure: LoadFailure::discarded(),
                })
            }),
        }
    }

    /// Load in the background, e.g. to pre-warm a unit after a show
    pub fn spawn_load(&self, unit: UnitId) -> JoinHandle<Result<(), AdError>> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let result = coordinator.load(unit).await;
            if let Err(e) = &result {
                tracing::debug!(%unit, error = %e, "background load did not succeed");
            }
            result
        })
    }

    /// Load in the background once the unit's cooldown allows it
    pub fn spawn_load_when_allowed(&self, unit: UnitId) -> JoinHandle<Result<(), AdError>> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let result = coordinator.load_when_allowed(unit).await;
            if let Err(e) = &result {
                tracing::debug!(%unit, error = %e, "background load did not succeed");
            }
            result
        })
    }

    /// Load once the unit's cooldown allows it
    ///
    /// Sleeps out any remaining cooldown instead of failing. The clock must
    /// advance with tokio time.
    pub async fn load_when_allowed(&self, unit: UnitId) -> Result<(), AdError> {
        loop {
            match self.load(unit).await {
                Err(AdError::CooldownActive { remaining, .. }) => {
                    tracing::debug!(
                        %unit,
                        remaining_ms = remaining.as_millis() as u64,
                        "waiting out load cooldown"
                    );
                    tokio::time::sleep(remaining).await;
                }
                other => return other,
            }
        }
    }

    /// Number of units with a provider load in flight
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// Apply a destroy or teardown input and fail everyone waiting on `unit`
    ///
    /// A provider call in flight keeps running, but its result is discarded.
    pub(crate) fn reset(&self, unit: UnitId, input: UnitInput) -> Result<AdUnit, AdError> {
        let (flight, reset) = {
            let mut in_flight = self.lock();
            let flight = in_flight.remove(&unit);
            (flight, self.inner.registry.apply(unit, input))
        };

        if let Some(flight) = flight {
            tracing::debug!(%unit, waiters = flight.waiters.len(), "load cancelled");
            for waiter in flight.waiters {
                let _ = waiter.send(Err(AdError::LoadFailed {
                    unit,
                    failure: LoadFailure::discarded(),
                }));
            }
        }
        reset
    }

    /// Start or join a load. `None` means the unit is already loaded.
    fn begin(&self, id: UnitId) -> Result<Option<Pending>, AdError> {
        let inner = &self.inner;
        let mut in_flight = self.lock();

        let unit = inner
            .registry
            .get(id)
            .filter(|unit| unit.initialized)
            .ok_or(AdError::InvalidUnit { unit: id })?;
        let provider = inner
            .providers
            .get(id.kind)
            .ok_or(AdError::InvalidUnit { unit: id })?;

        let (tx, rx) = oneshot::channel();

        if unit.is_loading() {
            if let Some(flight) = in_flight.get_mut(&id) {
                flight.waiters.push(tx);
                tracing::debug!(unit = %id, waiters = flight.waiters.len(), "joined in-flight load");
                return Ok(Some(rx));
            }
        }

        if unit.is_showing() {
            tracing::debug!(unit = %id, "on screen, load skipped");
            return Ok(None);
        }

        let now = inner.registry.clock().now();
        if unit.is_ready(now) && provider.is_ready(id) {
            tracing::debug!(unit = %id, "already loaded");
            return Ok(None);
        }
        if let Some(remaining) = inner.cooldown.remaining(&unit, now) {
            return Err(AdError::CooldownActive {
                unit: id,
                remaining,
            });
        }

        let started = inner.registry.apply(id, UnitInput::BeginLoad)?;
        let generation = started.generation;
        in_flight.insert(
            id,
            InFlight {
                generation,
                started_at: now,
                waiters: vec![tx],
            },
        );
        drop(in_flight);

        let coordinator = self.clone();
        tokio::spawn(async move {
            let result = provider.load(id).await;
            coordinator.complete(id, generation, result);
        });

        Ok(Some(rx))
    }

    fn complete(&self, id: UnitId, generation: u64, result: Result<Option<AdHandle>, LoadFailure>) {
        let outcome = match result {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(LoadFailure::unexpected_null()),
            Err(failure) => Err(failure),
        };

        let (waiters, elapsed) = {
            let mut in_flight = self.lock();
            let started_at = match in_flight.get(&id) {
                Some(flight) if flight.generation == generation => flight.started_at,
                _ => {
                    tracing::debug!(unit = %id, generation, "discarding stale load result");
                    return;
                }
            };

            let input = match &outcome {
                Ok(()) => UnitInput::LoadSucceeded {
                    validity: self.inner.validity.get(&id.kind).copied(),
                },
                Err(failure) => UnitInput::LoadFailed {
                    failure: failure.clone(),
                },
            };
            if let Err(e) = self.inner.registry.apply(id, input) {
                tracing::error!(unit = %id, error = %e, "failed to record load result");
            }
            let waiters = in_flight
                .remove(&id)
                .map(|flight| flight.waiters)
                .unwrap_or_default();
            (waiters, self.inner.registry.clock().elapsed_since(started_at))
        };

        let result = outcome.map_err(|failure| AdError::LoadFailed { unit: id, failure });
        let elapsed_ms = elapsed.as_millis() as u64;
        match &result {
            Ok(()) => tracing::info!(
                unit = %id,
                waiters = waiters.len(),
                elapsed_ms,
                "load succeeded"
            ),
            Err(e) => {
                tracing::warn!(
                    unit = %id,
                    waiters = waiters.len(),
                    elapsed_ms,
                    error = %e,
                    "load failed"
                );
                self.inner.registry.publish(AdEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UnitId, InFlight>> {
        self.inner.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
