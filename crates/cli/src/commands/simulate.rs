// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted ad flows against the sandbox provider

use crate::adapters::{ConsoleIndicator, ConsoleNotifier};
use crate::output::{self, OutputFormat, Timeline};
use adkit_adapters::{LoadScript, ManualConnectivity, ScriptedProvider, TracedProvider};
use adkit_core::{AdEvent, AdKind, AdsConfig, LoadFailure, Reward, TokioClock, UnitId};
use adkit_engine::{
    AdsController, AutoLoadOptions, ControllerDeps, ProviderSet, ShowCallbacks, ShowOutcome,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

#[derive(Args)]
pub struct SimulateArgs {
    /// Configuration file; defaults are used when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: SimulateCommand,
}

#[derive(Subcommand)]
pub enum SimulateCommand {
    /// Show an ad, loading it first if needed
    Show(ShowArgs),
    /// Issue concurrent loads of one unit
    Load(LoadArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Ad kind (banner, interstitial, rewarded, native, app-open)
    kind: AdKind,

    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Number of provider loads that fail before one succeeds
    #[arg(long, default_value_t = 0)]
    fail_loads: usize,

    /// Provider load latency in milliseconds
    #[arg(long, default_value_t = 200)]
    latency_ms: u64,

    /// How long the ad stays on screen, in milliseconds
    #[arg(long, default_value_t = 500)]
    show_ms: u64,

    /// Do not load the unit when it is not ready
    #[arg(long)]
    no_auto_load: bool,

    /// Do not retry a failed load
    #[arg(long)]
    no_retry: bool,

    /// Do not show the waiting indicator
    #[arg(long)]
    no_indicator: bool,

    /// Start without connectivity
    #[arg(long)]
    offline: bool,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Ad kind (banner, interstitial, rewarded, native, app-open)
    kind: AdKind,

    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Number of concurrent callers
    #[arg(long, default_value_t = 3)]
    callers: usize,

    /// Provider load latency in milliseconds
    #[arg(long, default_value_t = 200)]
    latency_ms: u64,

    /// Make the provider load fail
    #[arg(long)]
    fail: bool,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn handle(args: SimulateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => AdsConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AdsConfig::default(),
    };

    match args.command {
        SimulateCommand::Show(show) => simulate_show(config, show).await,
        SimulateCommand::Load(load) => simulate_load(config, load).await,
    }
}

/// Controller wired to the scripted provider and console adapters
struct Sandbox {
    controller: AdsController,
    runner: JoinHandle<()>,
}

impl Sandbox {
    async fn start(
        config: AdsConfig,
        provider: &ScriptedProvider,
        timeline: Timeline,
        online: bool,
    ) -> Result<Self> {
        let controller = AdsController::new(
            config,
            ControllerDeps {
                providers: ProviderSet::new().with_all(TracedProvider::new(provider.clone())),
                indicator: Arc::new(ConsoleIndicator::new(timeline)),
                notify: Arc::new(ConsoleNotifier::new(timeline)),
            },
            TokioClock,
        )?;

        let mut events = controller.subscribe();
        let gate = ManualConnectivity::new(online);
        let runner = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.run(&gate).await })
        };

        if online {
            loop {
                match events.recv().await {
                    Ok(AdEvent::AllAdsInitialized) => break,
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => bail!("controller stopped before initializing"),
                }
            }
        }

        Ok(Self { controller, runner })
    }

    fn stop(self) {
        self.runner.abort();
    }
}

async fn simulate_show(config: AdsConfig, args: ShowArgs) -> Result<()> {
    let timeline = Timeline::start();
    let mut provider = ScriptedProvider::new()
        .with_latency(Duration::from_millis(args.latency_ms))
        .with_show_duration(Duration::from_millis(args.show_ms));
    if args.kind == AdKind::Rewarded {
        provider = provider.with_reward(Reward {
            kind: "coins".to_string(),
            amount: 10,
        });
    }
    provider.fail_next(args.fail_loads, LoadFailure::with_code(3, "no fill"));

    let sandbox = Sandbox::start(config, &provider, timeline, !args.offline).await?;
    let options = AutoLoadOptions {
        auto_load_if_not_ready: !args.no_auto_load,
        auto_load_if_closed: true,
        auto_load_if_load_failed: !args.no_retry,
        show_waiting_indicator: !args.no_indicator,
    };
    let callbacks = ShowCallbacks::new()
        .on_loaded(move || timeline.line("loaded"))
        .on_open(move || timeline.line("opened"))
        .on_impression(move || timeline.line("impression"))
        .on_clicked(move || timeline.line("clicked"))
        .on_paid(move |value| timeline.line(format!("paid {} {}", value.micros, value.currency)))
        .on_reward(move |reward| timeline.line(format!("reward {} {}", reward.amount, reward.kind)))
        .on_close(move || timeline.line("closed"))
        .on_load_failed(move |e| timeline.line(format!("load failed: {e}")))
        .on_failed(move |e| timeline.line(format!("show failed: {e}")));

    timeline.line(format!("show {} requested", UnitId::new(args.kind, args.index)));
    let outcome = sandbox
        .controller
        .show_with_auto_load(args.kind, args.index, options, callbacks)
        .await;
    sandbox.stop();

    println!();
    println!("Provider loads: {}", provider.load_calls());
    println!("Provider shows: {}", provider.show_calls());
    match outcome {
        ShowOutcome::Closed => println!("Outcome: closed"),
        ShowOutcome::Skipped => println!("Outcome: skipped (not ready)"),
        ShowOutcome::Failed(e) => return Err(e.into()),
    }
    Ok(())
}

#[derive(Serialize)]
struct LoadReport {
    unit: String,
    callers: usize,
    provider_loads: usize,
    succeeded: usize,
    errors: Vec<String>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unit: {}", self.unit)?;
        writeln!(f, "Callers: {}", self.callers)?;
        writeln!(f, "Provider loads: {}", self.provider_loads)?;
        write!(f, "Succeeded: {}", self.succeeded)?;
        for error in &self.errors {
            write!(f, "\nFailed: {error}")?;
        }
        Ok(())
    }
}

async fn simulate_load(config: AdsConfig, args: LoadArgs) -> Result<()> {
    if args.callers == 0 {
        bail!("--callers must be at least 1");
    }

    let mut provider = ScriptedProvider::new().with_latency(Duration::from_millis(args.latency_ms));
    if args.fail {
        provider = provider
            .with_default_load(LoadScript::Fail(LoadFailure::with_code(3, "no fill")));
    }
    let sandbox = Sandbox::start(config, &provider, Timeline::start(), true).await?;

    let (kind, index) = (args.kind, args.index);
    let tasks: Vec<_> = (0..args.callers)
        .map(|_| {
            let controller = sandbox.controller.clone();
            tokio::spawn(async move { controller.load(kind, index).await })
        })
        .collect();
    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        outcomes.push(task.await?);
    }
    sandbox.stop();

    let report = LoadReport {
        unit: UnitId::new(kind, index).to_string(),
        callers: args.callers,
        provider_loads: provider.load_calls(),
        succeeded: outcomes.iter().filter(|outcome| outcome.is_ok()).count(),
        errors: outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err().map(ToString::to_string))
            .collect(),
    };
    output::print(&report, args.format);

    match outcomes.into_iter().find_map(Result::err) {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
