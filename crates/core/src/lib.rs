// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! adkit-core: Core state for the adkit ad lifecycle engine
//!
//! This crate provides:
//! - The pure ad unit state machine and its events
//! - The per-kind load cooldown policy
//! - Error types shared by every layer
//! - TOML configuration

pub mod clock;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod event;
pub mod show;
pub mod traced;
pub mod unit;

// Re-exports
pub use clock::{Clock, FakeClock, TokioClock};
pub use config::{
    AdsConfig, AppOpenConfig, ConnectivityConfig, IndicatorConfig, PreloadConfig, UnitsConfig,
};
pub use cooldown::{CooldownConfig, CooldownPolicy};
pub use error::{AdError, ConfigError, LoadFailure};
pub use event::AdEvent;
pub use show::{show_channel, AdValue, Reward, ShowEvent, ShowEventReceiver, ShowEventSender};
pub use traced::TracedInput;
pub use unit::{AdKind, AdUnit, ParseAdKindError, UnitId, UnitInput, UnitState};
