// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ads configuration
//!
//! Loaded from TOML. Every section and field is optional; missing values
//! fall back to the defaults below.

use crate::cooldown::CooldownConfig;
use crate::error::ConfigError;
use crate::unit::{AdKind, UnitId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    pub units: UnitsConfig,
    pub cooldown: CooldownConfig,
    pub app_open: AppOpenConfig,
    pub indicator: IndicatorConfig,
    pub preload: PreloadConfig,
    pub connectivity: ConnectivityConfig,
}

/// Number of configured units per kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    pub banner: usize,
    pub interstitial: usize,
    pub rewarded: usize,
    pub native: usize,
    pub app_open: usize,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            banner: 1,
            interstitial: 1,
            rewarded: 1,
            native: 1,
            app_open: 1,
        }
    }
}

impl UnitsConfig {
    pub fn count(&self, kind: AdKind) -> usize {
        match kind {
            AdKind::Banner => self.banner,
            AdKind::Interstitial => self.interstitial,
            AdKind::Rewarded => self.rewarded,
            AdKind::Native => self.native,
            AdKind::AppOpen => self.app_open,
        }
    }

    /// Every configured unit, grouped by kind in preload order
    pub fn unit_ids(&self) -> Vec<UnitId> {
        AdKind::ALL
            .iter()
            .flat_map(|&kind| (0..self.count(kind)).map(move |index| UnitId::new(kind, index)))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppOpenConfig {
    /// How long a loaded app-open ad stays showable
    #[serde(with = "humantime_serde")]
    pub validity: Duration,
    /// Minimum time between foreground-triggered shows
    #[serde(with = "humantime_serde")]
    pub display_cooldown: Duration,
}

impl Default for AppOpenConfig {
    fn default() -> Self {
        Self {
            validity: Duration::from_secs(4 * 60 * 60),
            display_cooldown: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Upper bound on how long an orchestrated show keeps the indicator open
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub message: String,
    /// How often a hide condition is re-evaluated
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            message: "Loading Ad...".to_string(),
            poll_interval: Duration::from_millis(16),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    pub banner: bool,
    pub interstitial: bool,
    pub rewarded: bool,
    pub native: bool,
    pub app_open: bool,
    /// Pause between preloading consecutive kinds
    #[serde(with = "humantime_serde")]
    pub gap: Duration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            banner: false,
            interstitial: false,
            rewarded: false,
            native: false,
            app_open: false,
            gap: Duration::from_millis(500),
        }
    }
}

impl PreloadConfig {
    pub fn enabled(&self, kind: AdKind) -> bool {
        match kind {
            AdKind::Banner => self.banner,
            AdKind::Interstitial => self.interstitial,
            AdKind::Rewarded => self.rewarded,
            AdKind::Native => self.native,
            AdKind::AppOpen => self.app_open,
        }
    }

    /// Kinds to preload, in preload order
    pub fn kinds(&self) -> Vec<AdKind> {
        AdKind::ALL
            .into_iter()
            .filter(|kind| self.enabled(*kind))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Endpoint probed to decide whether the ad network is reachable
    pub url: String,
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Shown to the user when a retried load still fails
    pub hint: String,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            url: "https://admob.google.com/".to_string(),
            check_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(3),
            hint: "Make sure you have internet connection and try again".to_string(),
        }
    }
}

impl AdsConfig {
    /// Read and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AdsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indicator.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "indicator.timeout must be greater than zero".to_string(),
            ));
        }
        if self.indicator.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "indicator.poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.connectivity.url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "connectivity.url must not be empty".to_string(),
            ));
        }
        if self.connectivity.check_interval.is_zero() || self.connectivity.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "connectivity.check_interval and connectivity.timeout must be greater than zero"
                    .to_string(),
            ));
        }
        for kind in self.preload.kinds() {
            if self.units.count(kind) == 0 {
                return Err(ConfigError::Invalid(format!(
                    "preload.{kind} is set but no {kind} units are configured"
                )));
            }
        }
        Ok(())
    }

    /// Validity window applied to a freshly loaded ad of this kind
    pub fn validity_for(&self, kind: AdKind) -> Option<Duration> {
        match kind {
            AdKind::AppOpen => Some(self.app_open.validity),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
