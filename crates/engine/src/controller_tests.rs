// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use adkit_adapters::{
    FakeIndicator, FakeNotifyAdapter, IndicatorCall, ManualConnectivity, ProviderCall,
    ScriptedProvider, ShowScript,
};
use adkit_core::{ConfigError, UnitState};
use std::sync::atomic::AtomicBool;
use tokio::sync::watch;
use tokio::time::sleep;

struct Harness {
    controller: AdsController,
    provider: ScriptedProvider,
    indicator: FakeIndicator,
}

fn build(config: AdsConfig, provider: ScriptedProvider) -> Harness {
    let indicator = FakeIndicator::new();
    let controller = AdsController::new(
        config,
        ControllerDeps {
            providers: ProviderSet::new().with_all(provider.clone()),
            indicator: Arc::new(indicator.clone()),
            notify: Arc::new(FakeNotifyAdapter::new()),
        },
        TokioClock,
    )
    .unwrap();
    Harness {
        controller,
        provider,
        indicator,
    }
}

async fn setup(provider: ScriptedProvider) -> Harness {
    let h = build(AdsConfig::default(), provider);
    h.controller.initialize().await;
    h
}

fn drain(events: &mut broadcast::Receiver<AdEvent>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(event.name());
    }
    names
}

/// Gate backed by a plain watch channel, so tests can end the stream
struct ChannelGate(watch::Receiver<bool>);

impl ConnectivityGate for ChannelGate {
    fn is_online(&self) -> bool {
        *self.0.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.clone()
    }
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn missing_provider_is_rejected() {
    let result = AdsController::new(
        AdsConfig::default(),
        ControllerDeps {
            providers: ProviderSet::new().with(AdKind::Banner, ScriptedProvider::new()),
            indicator: Arc::new(FakeIndicator::new()),
            notify: Arc::new(FakeNotifyAdapter::new()),
        },
        TokioClock,
    );

    assert!(matches!(
        result,
        Err(InitError::MissingProvider(AdKind::Interstitial))
    ));
}

#[test]
fn kinds_without_units_need_no_provider() {
    let mut config = AdsConfig::default();
    config.units.interstitial = 0;
    config.units.rewarded = 0;
    config.units.native = 0;
    config.units.app_open = 0;

    let result = AdsController::new(
        config,
        ControllerDeps {
            providers: ProviderSet::new().with(AdKind::Banner, ScriptedProvider::new()),
            indicator: Arc::new(FakeIndicator::new()),
            notify: Arc::new(FakeNotifyAdapter::new()),
        },
        TokioClock,
    );

    assert!(result.is_ok());
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = AdsConfig::default();
    config.indicator.timeout = Duration::ZERO;

    let result = AdsController::new(
        config,
        ControllerDeps {
            providers: ProviderSet::new().with_all(ScriptedProvider::new()),
            indicator: Arc::new(FakeIndicator::new()),
            notify: Arc::new(FakeNotifyAdapter::new()),
        },
        TokioClock,
    );

    assert!(matches!(
        result,
        Err(InitError::Config(ConfigError::Invalid(_)))
    ));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn operations_fail_before_initialize() {
    let h = build(AdsConfig::default(), ScriptedProvider::new());

    assert_eq!(
        h.controller.load(AdKind::Interstitial, 0).await,
        Err(AdError::ConnectivityUnavailable)
    );
    assert!(!h.controller.is_ready(AdKind::Interstitial, 0));
    assert_eq!(
        h.controller
            .show(AdKind::Interstitial, 0, ShowCallbacks::new())
            .await,
        ShowOutcome::Failed(AdError::ConnectivityUnavailable)
    );
    assert_eq!(
        h.controller.hide(AdKind::Banner, 0),
        Err(AdError::ConnectivityUnavailable)
    );
    assert!(h.provider.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_show_is_published() {
    let h = build(AdsConfig::default(), ScriptedProvider::new());
    let mut events = h.controller.subscribe();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = seen.clone();
    let callbacks = ShowCallbacks::new()
        .on_load_failed(move |e| log.lock().unwrap().push(e))
        .on_failed(|_| panic!("load failures go to on_load_failed"));

    let outcome = h
        .controller
        .show_with_auto_load(AdKind::Interstitial, 0, AutoLoadOptions::default(), callbacks)
        .await;

    assert_eq!(outcome, ShowOutcome::Failed(AdError::ConnectivityUnavailable));
    assert_eq!(*seen.lock().unwrap(), vec![AdError::ConnectivityUnavailable]);
    let mut errors = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let AdEvent::Error { message } = event {
            errors.push(message);
        }
    }
    assert_eq!(
        errors,
        vec!["ads are unavailable: no connectivity or not initialized"]
    );
}

#[tokio::test(start_paused = true)]
async fn initialize_preloads_kinds_in_order() {
    let mut config = AdsConfig::default();
    config.preload.banner = true;
    config.preload.interstitial = true;
    config.preload.app_open = true;
    let h = build(config, ScriptedProvider::new());
    let mut events = h.controller.subscribe();
    let started = tokio::time::Instant::now();

    h.controller.initialize().await;
    assert!(started.elapsed() >= Duration::from_secs(1));
    sleep(Duration::from_millis(1)).await;

    assert_eq!(
        h.provider.calls(),
        vec![
            ProviderCall::Load(UnitId::new(AdKind::Banner, 0)),
            ProviderCall::Load(UnitId::new(AdKind::Interstitial, 0)),
            ProviderCall::Load(UnitId::new(AdKind::AppOpen, 0)),
        ]
    );
    let names = drain(&mut events);
    assert_eq!(names.iter().filter(|n| **n == "unit:initialized").count(), 5);
    assert!(names.contains(&"ads:initialized"));
    assert!(h.controller.is_ready(AdKind::AppOpen, 0));
}

#[tokio::test(start_paused = true)]
async fn initialize_twice_is_a_no_op() {
    let h = setup(ScriptedProvider::new()).await;
    let mut events = h.controller.subscribe();

    h.controller.initialize().await;

    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn teardown_destroys_every_unit() {
    let h = setup(ScriptedProvider::new()).await;
    h.controller.load(AdKind::Interstitial, 0).await.unwrap();
    h.controller
        .show_waiting_for(Duration::from_secs(10), "Please wait");
    let mut events = h.controller.subscribe();

    h.controller.teardown();

    assert!(!h.controller.is_available());
    assert!(!h.indicator.is_visible());
    let destroyed = h
        .provider
        .calls()
        .into_iter()
        .filter(|call| matches!(call, ProviderCall::Destroy(_)))
        .count();
    assert_eq!(destroyed, 5);
    for unit in h.controller.units() {
        assert!(!unit.initialized);
        assert_eq!(unit.state, UnitState::Idle);
    }
    assert_eq!(drain(&mut events).last(), Some(&"ads:torn_down"));
    assert_eq!(
        h.controller.load(AdKind::Interstitial, 0).await,
        Err(AdError::ConnectivityUnavailable)
    );
}

#[tokio::test(start_paused = true)]
async fn run_follows_connectivity() {
    let h = build(AdsConfig::default(), ScriptedProvider::new());
    let (tx, rx) = watch::channel(false);
    let mut events = h.controller.subscribe();
    let task = {
        let controller = h.controller.clone();
        tokio::spawn(async move { controller.run(&ChannelGate(rx)).await })
    };

    sleep(Duration::from_millis(10)).await;
    assert!(!h.controller.is_available());

    tx.send(true).unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(h.controller.is_available());

    tx.send(false).unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(!h.controller.is_available());

    tx.send(true).unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(h.controller.is_available());

    drop(tx);
    task.await.unwrap();

    let changes: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|name| name.starts_with("ads:"))
        .collect();
    assert_eq!(
        changes,
        vec![
            "ads:connectivity",
            "ads:initialized",
            "ads:connectivity",
            "ads:torn_down",
            "ads:connectivity",
            "ads:initialized",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn run_initializes_immediately_when_online() {
    let h = build(AdsConfig::default(), ScriptedProvider::new());
    let gate = ManualConnectivity::online();
    let task = {
        let controller = h.controller.clone();
        let gate = gate.clone();
        tokio::spawn(async move { controller.run(&gate).await })
    };

    sleep(Duration::from_millis(10)).await;
    assert!(h.controller.is_available());

    task.abort();
}

// =============================================================================
// Unit operations
// =============================================================================

#[tokio::test(start_paused = true)]
async fn out_of_range_index_is_invalid() {
    let h = setup(ScriptedProvider::new()).await;

    let err = h.controller.load(AdKind::Interstitial, 3).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid interstitial ad controller at index 3"
    );
}

#[tokio::test(start_paused = true)]
async fn hide_closes_a_persistent_banner() {
    let provider = ScriptedProvider::new().with_show(ShowScript::HoldUntilHidden);
    let h = setup(provider).await;
    h.controller.load(AdKind::Banner, 0).await.unwrap();

    let show = {
        let controller = h.controller.clone();
        tokio::spawn(async move {
            controller
                .show(AdKind::Banner, 0, ShowCallbacks::new())
                .await
        })
    };
    sleep(Duration::from_millis(10)).await;
    assert_eq!(
        h.controller.unit(AdKind::Banner, 0).unwrap().state,
        UnitState::ShowingContent
    );

    h.controller.hide(AdKind::Banner, 0).unwrap();

    assert_eq!(show.await.unwrap(), ShowOutcome::Closed);
    assert_eq!(
        h.controller.unit(AdKind::Banner, 0).unwrap().state,
        UnitState::Ready
    );
    assert!(h.controller.is_ready(AdKind::Banner, 0));
}

#[tokio::test(start_paused = true)]
async fn destroy_releases_one_unit() {
    let h = setup(ScriptedProvider::new()).await;
    h.controller.load(AdKind::Banner, 0).await.unwrap();

    h.controller.destroy(AdKind::Banner, 0).unwrap();

    let unit = h.controller.unit(AdKind::Banner, 0).unwrap();
    assert_eq!(unit.state, UnitState::Idle);
    assert!(unit.initialized);
    assert!(!h.controller.is_ready(AdKind::Banner, 0));
    assert!(h
        .provider
        .calls()
        .contains(&ProviderCall::Destroy(UnitId::new(AdKind::Banner, 0))));

    h.controller.load(AdKind::Banner, 0).await.unwrap();
    assert_eq!(h.provider.load_calls(), 2);
}

// =============================================================================
// Waiting indicator
// =============================================================================

#[tokio::test(start_paused = true)]
async fn waiting_for_hides_after_duration() {
    let h = setup(ScriptedProvider::new()).await;

    h.controller
        .show_waiting_for(Duration::from_secs(2), "Please wait");
    assert_eq!(h.indicator.last_message(), Some("Please wait".to_string()));

    sleep(Duration::from_secs(2) + Duration::from_millis(1)).await;
    assert!(!h.indicator.is_visible());
}

#[tokio::test(start_paused = true)]
async fn waiting_until_hides_when_condition_holds() {
    let h = setup(ScriptedProvider::new()).await;
    let done = Arc::new(AtomicBool::new(false));
    let flag = done.clone();

    h.controller
        .show_waiting_until(move || flag.load(Ordering::SeqCst), "");
    sleep(Duration::from_millis(50)).await;
    assert!(h.indicator.is_visible());

    done.store(true, Ordering::SeqCst);
    sleep(Duration::from_millis(20)).await;
    assert!(!h.indicator.is_visible());
    assert_eq!(
        h.indicator.calls(),
        vec![IndicatorCall::Show(None), IndicatorCall::Hide]
    );
}

#[tokio::test(start_paused = true)]
async fn hide_waiting_reports_whether_shown() {
    let h = setup(ScriptedProvider::new()).await;
    h.controller
        .show_waiting_for(Duration::from_secs(10), "Loading Ad...");

    assert!(h.controller.hide_waiting());
    assert!(!h.controller.hide_waiting());
}
