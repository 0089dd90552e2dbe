// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-kind load cooldown
//!
//! After a load attempt a unit may not be loaded again until its kind's
//! cooldown has elapsed. Kinds without a configured cooldown are never
//! blocked.

use crate::unit::{AdKind, AdUnit};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Cooldown durations per ad kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    #[serde(with = "humantime_serde")]
    pub banner: Duration,
    #[serde(with = "humantime_serde")]
    pub interstitial: Duration,
    #[serde(with = "humantime_serde")]
    pub rewarded: Duration,
    #[serde(with = "humantime_serde")]
    pub native: Duration,
    #[serde(with = "humantime_serde")]
    pub app_open: Duration,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            banner: Duration::ZERO,
            interstitial: Duration::from_secs(5),
            rewarded: Duration::from_secs(5),
            native: Duration::ZERO,
            app_open: Duration::ZERO,
        }
    }
}

impl CooldownConfig {
    /// No cooldown for any kind
    pub fn none() -> Self {
        Self {
            banner: Duration::ZERO,
            interstitial: Duration::ZERO,
            rewarded: Duration::ZERO,
            native: Duration::ZERO,
            app_open: Duration::ZERO,
        }
    }

    pub fn for_kind(&self, kind: AdKind) -> Duration {
        match kind {
            AdKind::Banner => self.banner,
            AdKind::Interstitial => self.interstitial,
            AdKind::Rewarded => self.rewarded,
            AdKind::Native => self.native,
            AdKind::AppOpen => self.app_open,
        }
    }

    pub fn with_kind(mut self, kind: AdKind, duration: Duration) -> Self {
        let slot = match kind {
            AdKind::Banner => &mut self.banner,
            AdKind::Interstitial => &mut self.interstitial,
            AdKind::Rewarded => &mut self.rewarded,
            AdKind::Native => &mut self.native,
            AdKind::AppOpen => &mut self.app_open,
        };
        *slot = duration;
        self
    }
}

/// Decides whether a unit may issue a provider load right now
#[derive(Clone, Debug, Default)]
pub struct CooldownPolicy {
    config: CooldownConfig,
}

impl CooldownPolicy {
    pub fn new(config: CooldownConfig) -> Self {
        Self { config }
    }

    pub fn duration_for(&self, kind: AdKind) -> Duration {
        self.config.for_kind(kind)
    }

    /// Time left before the unit may load again, `None` if loading is allowed
    pub fn remaining(&self, unit: &AdUnit, now: Instant) -> Option<Duration> {
        let window = self.duration_for(unit.id.kind);
        let last = unit.last_load_attempt_at?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < window {
            Some(window - elapsed)
        } else {
            None
        }
    }

    pub fn can_attempt_load(&self, unit: &AdUnit, now: Instant) -> bool {
        self.remaining(unit, now).is_none()
    }
}

#[cfg(test)]
#[path = "cooldown_tests.rs"]
mod tests;
