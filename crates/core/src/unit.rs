// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ad unit state machine
//!
//! An ad unit is one configured slot of a given kind and index. The unit
//! tracks whether an ad is loaded, being loaded, or on screen. Transitions
//! are pure: they return the next unit and the events to publish.

use crate::clock::Clock;
use crate::error::LoadFailure;
use crate::event::AdEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// The kind of ad surface a unit serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdKind {
    Banner,
    Interstitial,
    Rewarded,
    Native,
    AppOpen,
}

impl AdKind {
    /// Every kind, in preload order
    pub const ALL: [AdKind; 5] = [
        AdKind::Banner,
        AdKind::Interstitial,
        AdKind::Rewarded,
        AdKind::Native,
        AdKind::AppOpen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdKind::Banner => "banner",
            AdKind::Interstitial => "interstitial",
            AdKind::Rewarded => "rewarded",
            AdKind::Native => "native",
            AdKind::AppOpen => "app_open",
        }
    }

    /// Full-screen ads are consumed by a single show
    pub fn is_full_screen(&self) -> bool {
        matches!(
            self,
            AdKind::Interstitial | AdKind::Rewarded | AdKind::AppOpen
        )
    }
}

impl fmt::Display for AdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown ad kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ad kind: {0} (expected banner, interstitial, rewarded, native or app_open)")]
pub struct ParseAdKindError(pub String);

impl FromStr for AdKind {
    type Err = ParseAdKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "banner" => Ok(AdKind::Banner),
            "interstitial" => Ok(AdKind::Interstitial),
            "rewarded" => Ok(AdKind::Rewarded),
            "native" | "native_overlay" => Ok(AdKind::Native),
            "app_open" | "appopen" => Ok(AdKind::AppOpen),
            _ => Err(ParseAdKindError(s.to_string())),
        }
    }
}

/// Identity of one configured unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub kind: AdKind,
    pub index: usize,
}

impl UnitId {
    pub fn new(kind: AdKind, index: usize) -> Self {
        Self { kind, index }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.index)
    }
}

/// Load/show state of a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    /// Nothing loaded
    Idle,
    /// A provider load is in flight
    Loading,
    /// An ad is loaded and can be shown until `expires_at`
    Ready,
    /// The ad is on screen
    ShowingContent,
    /// The last load or show failed
    Failed { reason: String },
}

/// Inputs that drive unit transitions
#[derive(Debug, Clone)]
pub enum UnitInput {
    /// Controller initialized; the unit may be used
    Initialize,
    /// A provider load is about to be issued
    BeginLoad,
    /// Provider returned an ad. `validity` sets the expiry window.
    LoadSucceeded { validity: Option<Duration> },
    /// Provider failed or returned nothing
    LoadFailed { failure: LoadFailure },
    /// Provider show is about to be issued
    BeginShow,
    /// The ad was dismissed (or hidden, for persistent kinds)
    ShowClosed,
    /// Provider reported a show failure
    ShowFailed { reason: String },
    /// Release the loaded ad; the unit stays initialized
    Destroy,
    /// Release the loaded ad and require re-initialization
    Teardown,
}

/// One addressable ad slot
#[derive(Debug, Clone)]
pub struct AdUnit {
    pub id: UnitId,
    pub state: UnitState,
    pub initialized: bool,
    /// When the last provider load was issued or failed. Drives cooldown.
    pub last_load_attempt_at: Option<Instant>,
    pub loaded_at: Option<Instant>,
    /// A Ready unit past this instant is stale
    pub expires_at: Option<Instant>,
    /// Bumped on destroy/teardown so late provider results can be discarded
    pub generation: u64,
}

impl AdUnit {
    /// Create an uninitialized unit in the Idle state
    pub fn new(id: UnitId) -> Self {
        Self {
            id,
            state: UnitState::Idle,
            initialized: false,
            last_load_attempt_at: None,
            loaded_at: None,
            expires_at: None,
            generation: 0,
        }
    }

    /// Whether the loaded ad is past its validity window
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Ready and not expired
    pub fn is_ready(&self, now: Instant) -> bool {
        self.initialized && self.state == UnitState::Ready && !self.is_expired(now)
    }

    pub fn is_loading(&self) -> bool {
        self.state == UnitState::Loading
    }

    pub fn is_showing(&self) -> bool {
        self.state == UnitState::ShowingContent
    }

    /// Pure transition function - returns new unit and events
    pub fn transition(&self, input: UnitInput, clock: &impl Clock) -> (AdUnit, Vec<AdEvent>) {
        let now = clock.now();
        let unit = self.id;

        match (&self.state, input) {
            (_, UnitInput::Initialize) => {
                let next = AdUnit {
                    initialized: true,
                    ..self.clone()
                };
                (next, vec![AdEvent::UnitInitialized { unit }])
            }

            (
                UnitState::Idle | UnitState::Failed { .. } | UnitState::Ready,
                UnitInput::BeginLoad,
            ) => {
                let next = AdUnit {
                    state: UnitState::Loading,
                    last_load_attempt_at: Some(now),
                    loaded_at: None,
                    expires_at: None,
                    ..self.clone()
                };
                (next, vec![AdEvent::LoadStarted { unit }])
            }

            (UnitState::Loading, UnitInput::LoadSucceeded { validity }) => {
                let next = AdUnit {
                    state: UnitState::Ready,
                    loaded_at: Some(now),
                    expires_at: validity.map(|window| now + window),
                    ..self.clone()
                };
                (next, vec![AdEvent::UnitLoaded { unit }])
            }

            (UnitState::Loading, UnitInput::LoadFailed { failure }) => {
                let reason = failure.to_string();
                let next = AdUnit {
                    state: UnitState::Failed {
                        reason: reason.clone(),
                    },
                    last_load_attempt_at: Some(now),
                    ..self.clone()
                };
                (next, vec![AdEvent::UnitLoadFailed { unit, reason }])
            }

            (UnitState::Ready, UnitInput::BeginShow) if !self.is_expired(now) => {
                let next = AdUnit {
                    state: UnitState::ShowingContent,
                    ..self.clone()
                };
                (next, vec![AdEvent::ShowStarted { unit }])
            }

            (UnitState::ShowingContent, UnitInput::ShowClosed) => {
                // Persistent surfaces (banner, native) can be shown again
                let next = if unit.kind.is_full_screen() {
                    AdUnit {
                        state: UnitState::Idle,
                        loaded_at: None,
                        expires_at: None,
                        ..self.clone()
                    }
                } else {
                    AdUnit {
                        state: UnitState::Ready,
                        ..self.clone()
                    }
                };
                (next, vec![AdEvent::ShowClosed { unit }])
            }

            (UnitState::ShowingContent, UnitInput::ShowFailed { reason }) => {
                let next = AdUnit {
                    state: UnitState::Failed {
                        reason: reason.clone(),
                    },
                    loaded_at: None,
                    expires_at: None,
                    ..self.clone()
                };
                (next, vec![AdEvent::ShowFailed { unit, reason }])
            }

            (_, UnitInput::Destroy) => {
                let next = AdUnit {
                    state: UnitState::Idle,
                    loaded_at: None,
                    expires_at: None,
                    generation: self.generation + 1,
                    ..self.clone()
                };
                (next, vec![AdEvent::UnitDestroyed { unit }])
            }

            (_, UnitInput::Teardown) => {
                let next = AdUnit {
                    state: UnitState::Idle,
                    initialized: false,
                    loaded_at: None,
                    expires_at: None,
                    generation: self.generation + 1,
                    ..self.clone()
                };
                (next, vec![AdEvent::UnitDestroyed { unit }])
            }

            // Invalid transitions - no change
            _ => (self.clone(), vec![]),
        }
    }
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
