// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ad provider capabilities
//!
//! A provider performs the actual load and show against an ad backend. Each
//! capability is its own trait so a backend only has to implement what its
//! kind supports; [`AdProvider`] is the full set the engine registers per kind.

mod scripted;

pub use scripted::{LoadScript, ProviderCall, ScriptedProvider, ShowScript};

use adkit_core::{LoadFailure, ShowEventSender, UnitId};
use async_trait::async_trait;

/// Opaque reference to a loaded ad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdHandle {
    pub id: String,
}

impl AdHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Loads ads for a unit
#[async_trait]
pub trait Loadable: Send + Sync + 'static {
    /// Load an ad. `Ok(None)` means the backend finished without an ad or an error.
    async fn load(&self, unit: UnitId) -> Result<Option<AdHandle>, LoadFailure>;
}

/// Presents a loaded ad
pub trait Showable: Send + Sync + 'static {
    /// Start showing the loaded ad. Progress is reported through `events`
    /// and must end with [`adkit_core::ShowEvent::Closed`] or
    /// [`adkit_core::ShowEvent::Failed`].
    fn show(&self, unit: UnitId, events: ShowEventSender);

    /// Hide a persistent ad (banner, native). Full-screen ads ignore this.
    fn hide(&self, _unit: UnitId) {}
}

/// Reports whether the backend still holds a showable ad
pub trait ReadyQueryable: Send + Sync + 'static {
    fn is_ready(&self, unit: UnitId) -> bool;
}

/// Releases backend resources for a unit
pub trait Destroyable: Send + Sync + 'static {
    fn destroy(&self, unit: UnitId);
}

/// Every capability the engine needs from a provider
pub trait AdProvider: Loadable + Showable + ReadyQueryable + Destroyable {}

impl<T> AdProvider for T where T: Loadable + Showable + ReadyQueryable + Destroyable {}
