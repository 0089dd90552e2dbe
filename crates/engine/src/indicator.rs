// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide waiting indicator
//!
//! At most one session is active. Opening a session replaces the previous
//! one: its message is overwritten and its timer cancelled. A session only
//! closes the indicator while it is still the active one, so a stale session
//! can never hide a newer one.

use crate::timer::TimerHandle;
use adkit_adapters::IndicatorAdapter;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// When an open session hides itself
pub enum HideWhen {
    /// After a fixed duration
    After(Duration),
    /// Once the predicate returns true, polled at the indicator's poll interval
    Condition(Box<dyn Fn() -> bool + Send + Sync>),
}

impl HideWhen {
    pub fn condition(predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        HideWhen::Condition(Box::new(predicate))
    }
}

impl std::fmt::Debug for HideWhen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HideWhen::After(duration) => f.debug_tuple("After").field(duration).finish(),
            HideWhen::Condition(_) => f.write_str("Condition(..)"),
        }
    }
}

struct Active {
    generation: u64,
    message: Option<String>,
    _timer: TimerHandle,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    active: Option<Active>,
}

struct Inner {
    adapter: Arc<dyn IndicatorAdapter>,
    poll_interval: Duration,
    slot: Mutex<Slot>,
}

impl Inner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Close the active session if `generation` matches (or unconditionally for `None`)
    fn close(&self, generation: Option<u64>) -> bool {
        let closed = {
            let mut slot = self.lock();
            let matches = slot
                .active
                .as_ref()
                .is_some_and(|active| generation.is_none_or(|g| g == active.generation));
            if matches {
                let closed = slot.active.take();
                self.adapter.hide();
                closed
            } else {
                None
            }
        };
        match closed {
            Some(active) => {
                tracing::debug!(generation = active.generation, "waiting indicator closed");
                true
            }
            None => false,
        }
    }
}

/// Shared handle to the waiting indicator slot
#[derive(Clone)]
pub struct WaitingIndicator {
    inner: Arc<Inner>,
}

impl WaitingIndicator {
    pub fn new(adapter: Arc<dyn IndicatorAdapter>, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                adapter,
                poll_interval,
                slot: Mutex::new(Slot::default()),
            }),
        }
    }

    /// Show the indicator, replacing any open session
    ///
    /// An empty message shows the indicator without a text line.
    pub fn open(&self, hide_when: HideWhen, message: &str) -> IndicatorSession {
        let message = (!message.is_empty()).then(|| message.to_string());

        let mut slot = self.inner.lock();
        slot.generation += 1;
        let generation = slot.generation;

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let close = move || {
            if let Some(inner) = weak.upgrade() {
                inner.close(Some(generation));
            }
        };
        let timer = match hide_when {
            HideWhen::After(delay) => TimerHandle::after(delay, close),
            HideWhen::Condition(predicate) => {
                TimerHandle::when(self.inner.poll_interval, predicate, close)
            }
        };

        self.inner.adapter.show(message.as_deref());
        let replaced = slot.active.replace(Active {
            generation,
            message,
            _timer: timer,
        });
        drop(slot);

        if let Some(previous) = replaced {
            tracing::debug!(
                replaced = previous.generation,
                generation,
                "waiting indicator replaced"
            );
        } else {
            tracing::debug!(generation, "waiting indicator opened");
        }

        IndicatorSession {
            inner: self.inner.clone(),
            generation,
        }
    }

    /// Hide whatever session is open. Returns false if none was.
    pub fn close(&self) -> bool {
        self.inner.close(None)
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().active.is_some()
    }

    /// Message of the open session
    pub fn message(&self) -> Option<String> {
        self.inner
            .lock()
            .active
            .as_ref()
            .and_then(|active| active.message.clone())
    }
}

/// One opening of the waiting indicator
pub struct IndicatorSession {
    inner: Arc<Inner>,
    generation: u64,
}

impl IndicatorSession {
    /// Close this session if it is still the active one. Idempotent.
    pub fn close(&self) -> bool {
        self.inner.close(Some(self.generation))
    }

    /// Whether this session is still the one on screen
    pub fn is_active(&self) -> bool {
        self.inner
            .lock()
            .active
            .as_ref()
            .is_some_and(|active| active.generation == self.generation)
    }
}

#[cfg(test)]
#[path = "indicator_tests.rs"]
mod tests;
