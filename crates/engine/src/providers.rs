// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-kind provider registration

use adkit_adapters::AdProvider;
use adkit_core::AdKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Providers keyed by the ad kind they serve
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: HashMap<AdKind, Arc<dyn AdProvider>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` for one kind, replacing any previous registration
    pub fn with<P: AdProvider>(mut self, kind: AdKind, provider: P) -> Self {
        self.providers.insert(kind, Arc::new(provider));
        self
    }

    /// Register the same provider for every kind
    pub fn with_all<P: AdProvider + Clone>(mut self, provider: P) -> Self {
        for kind in AdKind::ALL {
            self.providers.insert(kind, Arc::new(provider.clone()));
        }
        self
    }

    pub fn get(&self, kind: AdKind) -> Option<Arc<dyn AdProvider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn contains(&self, kind: AdKind) -> bool {
        self.providers.contains_key(&kind)
    }
}
