// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing infrastructure for unit transitions

use crate::unit::UnitInput;

/// Inputs that should be traced when applied
///
/// Provides consistent naming and structured fields for logging.
pub trait TracedInput {
    /// Input name for log records (e.g., "begin_load", "show_closed")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl TracedInput for UnitInput {
    fn name(&self) -> &'static str {
        match self {
            UnitInput::Initialize => "initialize",
            UnitInput::BeginLoad => "begin_load",
            UnitInput::LoadSucceeded { .. } => "load_succeeded",
            UnitInput::LoadFailed { .. } => "load_failed",
            UnitInput::BeginShow => "begin_show",
            UnitInput::ShowClosed => "show_closed",
            UnitInput::ShowFailed { .. } => "show_failed",
            UnitInput::Destroy => "destroy",
            UnitInput::Teardown => "teardown",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            UnitInput::LoadSucceeded {
                validity: Some(validity),
            } => vec![("validity_ms", validity.as_millis().to_string())],
            UnitInput::LoadFailed { failure } => vec![("error", failure.to_string())],
            UnitInput::ShowFailed { reason } => vec![("error", reason.clone())],
            _ => vec![],
        }
    }
}
