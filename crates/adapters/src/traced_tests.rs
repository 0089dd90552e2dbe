// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::provider::{ProviderCall, ScriptedProvider};
use adkit_core::{show_channel, AdKind, ShowEvent};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn interstitial() -> UnitId {
    UnitId::new(AdKind::Interstitial, 0)
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_load_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedProvider::new(ScriptedProvider::new());
        traced.load(interstitial()).await
    });

    assert!(matches!(result, Ok(Some(_))), "load should succeed: {:?}", result);
    assert!(
        logs.contains("provider.load"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("interstitial"),
        "Should log unit kind. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("starting"),
        "Should log entry message. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("ad loaded"),
        "Should log completion. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_load_logs_failure_with_error() {
    let (logs, result) = with_tracing(|| async {
        let provider = ScriptedProvider::new();
        provider.fail_next(1, LoadFailure::with_code(3, "no fill"));
        TracedProvider::new(provider).load(interstitial()).await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("load failed"),
        "Should log failure. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("no fill (code 3)"),
        "Should log provider error. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_load_warns_on_empty_result() {
    let (logs, result) = with_tracing(|| async {
        let provider = ScriptedProvider::new();
        provider.push_load(crate::provider::LoadScript::Null);
        TracedProvider::new(provider).load(interstitial()).await
    });

    assert_eq!(result, Ok(None));
    assert!(
        logs.contains("no ad and no error"),
        "Should warn about empty result. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_show_and_destroy_log_spans() {
    let (logs, _) = with_tracing(|| async {
        let provider = ScriptedProvider::new();
        provider.set_loaded(interstitial(), true);
        let traced = TracedProvider::new(provider);
        let (tx, _rx) = show_channel();

        traced.show(interstitial(), tx);
        traced.destroy(interstitial());
    });

    assert!(
        logs.contains("provider.show"),
        "Should log show span. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("provider.destroy"),
        "Should log destroy span. Logs:\n{}",
        logs
    );
}

// =============================================================================
// Delegation tests - verify traced wrapper delegates to inner provider
// =============================================================================

#[tokio::test]
async fn traced_provider_delegates_every_capability() {
    let banner = UnitId::new(AdKind::Banner, 1);
    let provider =
        ScriptedProvider::new().with_show(crate::provider::ShowScript::HoldUntilHidden);
    let traced = TracedProvider::new(provider.clone());

    traced.load(banner).await.unwrap();
    assert!(traced.is_ready(banner));

    let (tx, mut rx) = show_channel();
    traced.show(banner, tx);
    traced.hide(banner);
    traced.destroy(banner);

    assert_eq!(
        provider.calls(),
        vec![
            ProviderCall::Load(banner),
            ProviderCall::Show(banner),
            ProviderCall::Hide(banner),
            ProviderCall::Destroy(banner),
        ]
    );
    assert_eq!(rx.recv().await, Some(ShowEvent::Opened));
}
