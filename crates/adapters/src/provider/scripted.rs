// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic provider driven by a script
//!
//! Used by the sandbox CLI and by tests. Load outcomes are consumed from a
//! queue (falling back to a default), every call is recorded, and shows
//! play back a fixed event sequence.

use super::{AdHandle, Destroyable, Loadable, ReadyQueryable, Showable};
use adkit_core::{AdValue, LoadFailure, Reward, ShowEvent, ShowEventSender, UnitId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Outcome of one scripted load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadScript {
    Succeed,
    Fail(LoadFailure),
    /// Finish without an ad and without an error
    Null,
}

/// How a scripted show plays out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowScript {
    /// Open, impression, paid, reward (if configured), then close
    Complete,
    /// Report a show failure
    Fail(String),
    /// Open and stay on screen until `hide` or `destroy`
    HoldUntilHidden,
}

/// Recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Load(UnitId),
    Show(UnitId),
    Hide(UnitId),
    Destroy(UnitId),
}

struct ScriptedState {
    load_outcomes: VecDeque<LoadScript>,
    default_load: LoadScript,
    show_script: ShowScript,
    reward: Option<Reward>,
    loaded: HashSet<UnitId>,
    held: HashMap<UnitId, ShowEventSender>,
    calls: Vec<ProviderCall>,
    next_handle: u64,
}

/// Scripted ad provider
#[derive(Clone)]
pub struct ScriptedProvider {
    state: Arc<Mutex<ScriptedState>>,
    latency: Duration,
    show_duration: Duration,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProvider {
    /// Provider whose loads succeed immediately and whose shows complete
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedState {
                load_outcomes: VecDeque::new(),
                default_load: LoadScript::Succeed,
                show_script: ShowScript::Complete,
                reward: None,
                loaded: HashSet::new(),
                held: HashMap::new(),
                calls: Vec::new(),
                next_handle: 0,
            })),
            latency: Duration::ZERO,
            show_duration: Duration::ZERO,
        }
    }

    /// Delay every load by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Keep completed shows on screen for `duration` before closing
    pub fn with_show_duration(mut self, duration: Duration) -> Self {
        self.show_duration = duration;
        self
    }

    pub fn with_show(self, script: ShowScript) -> Self {
        self.lock().show_script = script;
        self
    }

    /// Grant `reward` during completed shows
    pub fn with_reward(self, reward: Reward) -> Self {
        self.lock().reward = Some(reward);
        self
    }

    /// Outcome used once the queued outcomes are exhausted
    pub fn with_default_load(self, outcome: LoadScript) -> Self {
        self.lock().default_load = outcome;
        self
    }

    /// Queue the outcome of the next unscripted load
    pub fn push_load(&self, outcome: LoadScript) {
        self.lock().load_outcomes.push_back(outcome);
    }

    /// Queue `count` failing loads
    pub fn fail_next(&self, count: usize, failure: LoadFailure) {
        let mut state = self.lock();
        for _ in 0..count {
            state
                .load_outcomes
                .push_back(LoadScript::Fail(failure.clone()));
        }
    }

    /// Mark a unit as holding (or not holding) a loaded ad
    pub fn set_loaded(&self, unit: UnitId, loaded: bool) {
        let mut state = self.lock();
        if loaded {
            state.loaded.insert(unit);
        } else {
            state.loaded.remove(&unit);
        }
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    pub fn load_calls(&self) -> usize {
        self.count(|call| matches!(call, ProviderCall::Load(_)))
    }

    pub fn show_calls(&self) -> usize {
        self.count(|call| matches!(call, ProviderCall::Show(_)))
    }

    fn count(&self, pred: impl Fn(&ProviderCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| pred(call)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Loadable for ScriptedProvider {
    async fn load(&self, unit: UnitId) -> Result<Option<AdHandle>, LoadFailure> {
        self.lock().calls.push(ProviderCall::Load(unit));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.lock();
        let outcome = state
            .load_outcomes
            .pop_front()
            .unwrap_or_else(|| state.default_load.clone());
        match outcome {
            LoadScript::Succeed => {
                state.next_handle += 1;
                state.loaded.insert(unit);
                Ok(Some(AdHandle::new(format!("{unit}/{}", state.next_handle))))
            }
            LoadScript::Fail(failure) => {
                state.loaded.remove(&unit);
                Err(failure)
            }
            LoadScript::Null => Ok(None),
        }
    }
}

impl Showable for ScriptedProvider {
    fn show(&self, unit: UnitId, events: ShowEventSender) {
        let mut state = self.lock();
        state.calls.push(ProviderCall::Show(unit));

        if !state.loaded.contains(&unit) {
            let _ = events.send(ShowEvent::Failed("ad not loaded".to_string()));
            return;
        }
        if unit.kind.is_full_screen() {
            state.loaded.remove(&unit);
        }

        match state.show_script.clone() {
            ShowScript::Fail(reason) => {
                let _ = events.send(ShowEvent::Failed(reason));
            }
            ShowScript::HoldUntilHidden => {
                let _ = events.send(ShowEvent::Opened);
                let _ = events.send(ShowEvent::Impression);
                state.held.insert(unit, events);
            }
            ShowScript::Complete => {
                let reward = state.reward.clone();
                let duration = self.show_duration;
                tokio::spawn(async move {
                    let _ = events.send(ShowEvent::Opened);
                    let _ = events.send(ShowEvent::Impression);
                    let _ = events.send(ShowEvent::Paid(AdValue {
                        micros: 1_000,
                        currency: "USD".to_string(),
                    }));
                    if !duration.is_zero() {
                        tokio::time::sleep(duration).await;
                    }
                    if let Some(reward) = reward {
                        let _ = events.send(ShowEvent::Rewarded(reward));
                    }
                    let _ = events.send(ShowEvent::Closed);
                });
            }
        }
    }

    fn hide(&self, unit: UnitId) {
        let mut state = self.lock();
        state.calls.push(ProviderCall::Hide(unit));
        if let Some(events) = state.held.remove(&unit) {
            let _ = events.send(ShowEvent::Closed);
        }
    }
}

impl ReadyQueryable for ScriptedProvider {
    fn is_ready(&self, unit: UnitId) -> bool {
        self.lock().loaded.contains(&unit)
    }
}

impl Destroyable for ScriptedProvider {
    fn destroy(&self, unit: UnitId) {
        let mut state = self.lock();
        state.calls.push(ProviderCall::Destroy(unit));
        state.loaded.remove(&unit);
        state.held.remove(&unit);
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod tests;
