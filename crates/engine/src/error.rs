// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for building the ads controller

use adkit_core::{AdKind, ConfigError};
use thiserror::Error;

/// Errors that prevent an [`AdsController`](crate::AdsController) from being built
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no provider registered for {0} ads")]
    MissingProvider(AdKind),
}
