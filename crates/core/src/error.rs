// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across the ad lifecycle

use crate::unit::UnitId;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a provider load did not produce an ad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// Provider-specific error code, when the provider reports one
    pub code: Option<i32>,
    pub message: String,
}

impl LoadFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// The provider completed without an ad and without an error
    pub fn unexpected_null() -> Self {
        Self::new("provider returned neither an ad nor an error")
    }

    /// The unit was destroyed while the load was in flight
    pub fn discarded() -> Self {
        Self::new("unit was reset while loading")
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for LoadFailure {}

/// Errors reported to clients of the ad controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdError {
    #[error("invalid {} ad controller at index {}", .unit.kind, .unit.index)]
    InvalidUnit { unit: UnitId },

    #[error("{unit} load failed: {failure}")]
    LoadFailed { unit: UnitId, failure: LoadFailure },

    #[error("{unit} show failed: {reason}")]
    ShowFailed { unit: UnitId, reason: String },

    #[error("{unit} is not ready")]
    NotReady { unit: UnitId },

    #[error("{unit} load cooldown active: {} remaining", format_remaining(.remaining))]
    CooldownActive { unit: UnitId, remaining: Duration },

    #[error("ads are unavailable: no connectivity or not initialized")]
    ConnectivityUnavailable,
}

impl AdError {
    /// Unit the error refers to, if any
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            AdError::InvalidUnit { unit }
            | AdError::LoadFailed { unit, .. }
            | AdError::ShowFailed { unit, .. }
            | AdError::NotReady { unit }
            | AdError::CooldownActive { unit, .. } => Some(*unit),
            AdError::ConnectivityUnavailable => None,
        }
    }
}

fn format_remaining(remaining: &Duration) -> String {
    // Millisecond precision is enough for a human reader
    let rounded = Duration::from_millis(remaining.as_millis() as u64);
    humantime::format_duration(rounded).to_string()
}

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
