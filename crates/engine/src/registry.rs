// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit table
//!
//! Owns every configured [`AdUnit`]. All state changes go through
//! [`UnitRegistry::apply`], which runs the pure transition, stores the result
//! and publishes the produced events.

use adkit_core::{AdError, AdEvent, AdUnit, Clock, TracedInput, UnitId, UnitInput};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

pub(crate) struct UnitRegistry<C: Clock> {
    units: Mutex<BTreeMap<UnitId, AdUnit>>,
    clock: C,
    events: broadcast::Sender<AdEvent>,
}

impl<C: Clock> UnitRegistry<C> {
    pub(crate) fn new(
        ids: impl IntoIterator<Item = UnitId>,
        clock: C,
        events: broadcast::Sender<AdEvent>,
    ) -> Self {
        let units = ids.into_iter().map(|id| (id, AdUnit::new(id))).collect();
        Self {
            units: Mutex::new(units),
            clock,
            events,
        }
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    /// Snapshot of a unit
    pub(crate) fn get(&self, id: UnitId) -> Option<AdUnit> {
        self.lock().get(&id).cloned()
    }

    pub(crate) fn ids(&self) -> Vec<UnitId> {
        self.lock().keys().copied().collect()
    }

    pub(crate) fn snapshot(&self) -> Vec<AdUnit> {
        self.lock().values().cloned().collect()
    }

    /// Apply an input to a unit and publish the resulting events
    pub(crate) fn apply(&self, id: UnitId, input: UnitInput) -> Result<AdUnit, AdError> {
        self.apply_if(id, input, |_| Ok(()))
    }

    /// Move a ready unit on screen
    ///
    /// The readiness check and the transition happen under one lock, so two
    /// concurrent shows cannot both claim the same ad.
    pub(crate) fn begin_show(&self, id: UnitId) -> Result<AdUnit, AdError> {
        let now = self.clock.now();
        self.apply_if(id, UnitInput::BeginShow, |unit| {
            if unit.is_ready(now) {
                Ok(())
            } else {
                Err(AdError::NotReady { unit: id })
            }
        })
    }

    fn apply_if(
        &self,
        id: UnitId,
        input: UnitInput,
        check: impl FnOnce(&AdUnit) -> Result<(), AdError>,
    ) -> Result<AdUnit, AdError> {
        let (next, events) = {
            let mut units = self.lock();
            let unit = units.get_mut(&id).ok_or(AdError::InvalidUnit { unit: id })?;
            check(unit)?;

            tracing::debug!(
                unit = %id,
                input = input.name(),
                fields = ?input.fields(),
                from = ?unit.state,
                "applying"
            );
            let (next, events) = unit.transition(input, &self.clock);
            *unit = next.clone();
            (next, events)
        };

        for event in events {
            self.publish(event);
        }
        Ok(next)
    }

    /// Publish an event to subscribers; having none is not an error
    pub(crate) fn publish(&self, event: AdEvent) {
        tracing::trace!(event = %event.log_summary(), "publish");
        let _ = self.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<AdEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<UnitId, AdUnit>> {
        self.units.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adkit_core::{AdKind, FakeClock, UnitState};

    fn registry() -> (UnitRegistry<FakeClock>, UnitId) {
        let id = UnitId::new(AdKind::Interstitial, 0);
        let (events, _) = broadcast::channel(16);
        let registry = UnitRegistry::new([id], FakeClock::new(), events);
        registry.apply(id, UnitInput::Initialize).unwrap();
        (registry, id)
    }

    #[test]
    fn only_one_show_claims_a_ready_unit() {
        let (registry, id) = registry();
        registry.apply(id, UnitInput::BeginLoad).unwrap();
        registry
            .apply(id, UnitInput::LoadSucceeded { validity: None })
            .unwrap();

        let first = registry.begin_show(id).unwrap();
        let second = registry.begin_show(id);

        assert_eq!(first.state, UnitState::ShowingContent);
        assert_eq!(second.unwrap_err(), AdError::NotReady { unit: id });
    }

    #[test]
    fn begin_show_rejects_an_unloaded_unit() {
        let (registry, id) = registry();

        assert_eq!(
            registry.begin_show(id).unwrap_err(),
            AdError::NotReady { unit: id }
        );
        assert_eq!(registry.get(id).unwrap().state, UnitState::Idle);
    }

    #[test]
    fn unknown_unit_is_invalid() {
        let (registry, _) = registry();
        let unknown = UnitId::new(AdKind::Banner, 3);

        assert_eq!(
            registry.begin_show(unknown).unwrap_err(),
            AdError::InvalidUnit { unit: unknown }
        );
    }
}
