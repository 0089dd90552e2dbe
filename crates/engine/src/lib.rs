// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! adkit ad lifecycle engine

mod app_open;
mod controller;
mod coordinator;
mod error;
mod indicator;
mod orchestrator;
mod providers;
mod registry;
mod timer;

pub use app_open::{AppOpenPresenter, DisplayThrottle};
pub use controller::{AdsController, ControllerDeps};
pub use coordinator::LoadCoordinator;
pub use error::InitError;
pub use indicator::{HideWhen, IndicatorSession, WaitingIndicator};
pub use orchestrator::{AutoLoadOptions, ShowCallbacks, ShowOrchestrator, ShowOutcome};
pub use providers::ProviderSet;
