// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events published by the ad controller

use crate::unit::UnitId;
use serde::{Deserialize, Serialize};

/// Events observable by any subscriber of the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdEvent {
    #[serde(rename = "unit:initialized")]
    UnitInitialized { unit: UnitId },

    #[serde(rename = "unit:load_started")]
    LoadStarted { unit: UnitId },

    #[serde(rename = "unit:loaded")]
    UnitLoaded { unit: UnitId },

    #[serde(rename = "unit:load_failed")]
    UnitLoadFailed { unit: UnitId, reason: String },

    #[serde(rename = "unit:show_started")]
    ShowStarted { unit: UnitId },

    #[serde(rename = "unit:show_closed")]
    ShowClosed { unit: UnitId },

    #[serde(rename = "unit:show_failed")]
    ShowFailed { unit: UnitId, reason: String },

    #[serde(rename = "unit:destroyed")]
    UnitDestroyed { unit: UnitId },

    /// Every enabled kind finished its initial load attempt
    #[serde(rename = "ads:initialized")]
    AllAdsInitialized,

    #[serde(rename = "ads:torn_down")]
    UnitsTornDown,

    #[serde(rename = "ads:connectivity")]
    ConnectivityChanged { online: bool },

    /// Human-readable error for display surfaces
    #[serde(rename = "ads:error")]
    Error { message: String },
}

impl AdEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            AdEvent::UnitInitialized { .. } => "unit:initialized",
            AdEvent::LoadStarted { .. } => "unit:load_started",
            AdEvent::UnitLoaded { .. } => "unit:loaded",
            AdEvent::UnitLoadFailed { .. } => "unit:load_failed",
            AdEvent::ShowStarted { .. } => "unit:show_started",
            AdEvent::ShowClosed { .. } => "unit:show_closed",
            AdEvent::ShowFailed { .. } => "unit:show_failed",
            AdEvent::UnitDestroyed { .. } => "unit:destroyed",
            AdEvent::AllAdsInitialized => "ads:initialized",
            AdEvent::UnitsTornDown => "ads:torn_down",
            AdEvent::ConnectivityChanged { .. } => "ads:connectivity",
            AdEvent::Error { .. } => "ads:error",
        }
    }

    /// Unit the event is about, if any
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            AdEvent::UnitInitialized { unit }
            | AdEvent::LoadStarted { unit }
            | AdEvent::UnitLoaded { unit }
            | AdEvent::UnitLoadFailed { unit, .. }
            | AdEvent::ShowStarted { unit }
            | AdEvent::ShowClosed { unit }
            | AdEvent::ShowFailed { unit, .. }
            | AdEvent::UnitDestroyed { unit } => Some(*unit),
            AdEvent::AllAdsInitialized
            | AdEvent::UnitsTornDown
            | AdEvent::ConnectivityChanged { .. }
            | AdEvent::Error { .. } => None,
        }
    }

    /// One-line summary for logs and the CLI
    pub fn log_summary(&self) -> String {
        let name = self.name();
        match self {
            AdEvent::UnitLoadFailed { unit, reason } | AdEvent::ShowFailed { unit, reason } => {
                format!("{name} unit={unit} reason={reason}")
            }
            AdEvent::ConnectivityChanged { online } => format!("{name} online={online}"),
            AdEvent::Error { message } => format!("{name} {message}"),
            _ => match self.unit() {
                Some(unit) => format!("{name} unit={unit}"),
                None => name.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
