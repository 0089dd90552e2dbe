// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the collaborators around the ad engine

pub mod connectivity;
pub mod indicator;
pub mod notify;
pub mod provider;
pub mod traced;

pub use connectivity::{
    ConnectivityGate, DomainProbe, ManualConnectivity, ProbeError, ProbeHandle, ProbeStatus,
};
pub use indicator::{IndicatorAdapter, NoOpIndicator};
pub use notify::{NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use provider::{
    AdHandle, AdProvider, Destroyable, LoadScript, Loadable, ProviderCall, ReadyQueryable,
    ScriptedProvider, ShowScript, Showable,
};
pub use traced::TracedProvider;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use indicator::{FakeIndicator, IndicatorCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
