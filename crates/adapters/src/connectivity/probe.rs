// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP reachability probe
//!
//! Periodically issues a GET against a configured endpoint. The endpoint is
//! reachable when it answers with a success status within the timeout.

use super::ConnectivityGate;
use adkit_core::ConnectivityConfig;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Errors from a single probe request
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("probe task failed: {0}")]
    Task(String),
}

/// Snapshot of probe results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeStatus {
    pub online: bool,
    pub checks: u64,
    pub consecutive_failures: u32,
    pub last_latency: Option<Duration>,
    pub last_success: Option<Instant>,
    pub last_error: Option<String>,
}

/// Connectivity gate backed by periodic HTTP checks
#[derive(Clone)]
pub struct DomainProbe {
    url: String,
    interval: Duration,
    agent: ureq::Agent,
    status: Arc<Mutex<ProbeStatus>>,
    tx: Arc<watch::Sender<bool>>,
}

impl DomainProbe {
    /// Create a probe. It reports offline until the first successful check.
    pub fn new(config: &ConnectivityConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        let (tx, _) = watch::channel(false);
        Self {
            url: config.url.clone(),
            interval: config.check_interval,
            agent,
            status: Arc::new(Mutex::new(ProbeStatus::default())),
            tx: Arc::new(tx),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run one check, record the result, and publish any state change
    pub async fn check_now(&self) -> Result<Duration, ProbeError> {
        let agent = self.agent.clone();
        let url = self.url.clone();

        let result = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            match agent.get(&url).call() {
                Ok(_) => Ok(start.elapsed()),
                Err(ureq::Error::StatusCode(code)) => Err(ProbeError::Status(code)),
                Err(e) => Err(ProbeError::Request(e.to_string())),
            }
        })
        .await
        .unwrap_or_else(|e| Err(ProbeError::Task(e.to_string())));

        self.record(&result);
        result
    }

    /// Spawn the periodic check loop
    pub fn start(&self) -> ProbeHandle {
        let probe = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(probe.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let _ = probe.check_now().await;
            }
        });
        ProbeHandle { task }
    }

    pub fn status(&self) -> ProbeStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Multi-line human-readable summary
    pub fn status_report(&self) -> String {
        let status = self.status();
        let mut report = String::new();
        let _ = writeln!(report, "Domain: {}", self.url);
        let _ = writeln!(
            report,
            "Status: {}",
            if status.online { "online" } else { "offline" }
        );
        let _ = writeln!(report, "Checks: {}", status.checks);
        let _ = writeln!(report, "Consecutive failures: {}", status.consecutive_failures);
        if let Some(latency) = status.last_latency {
            let _ = writeln!(report, "Last latency: {}ms", latency.as_millis());
        }
        match status.last_success {
            Some(at) => {
                let _ = writeln!(report, "Last success: {}s ago", at.elapsed().as_secs());
            }
            None => {
                let _ = writeln!(report, "Last success: never");
            }
        }
        if let Some(error) = &status.last_error {
            let _ = writeln!(report, "Last error: {}", error);
        }
        report
    }

    fn record(&self, result: &Result<Duration, ProbeError>) {
        let online = {
            let mut status = self.status.lock().unwrap_or_else(|e| e.into_inner());
            status.checks += 1;
            match result {
                Ok(latency) => {
                    status.online = true;
                    status.consecutive_failures = 0;
                    status.last_latency = Some(*latency);
                    status.last_success = Some(Instant::now());
                    status.last_error = None;
                    tracing::debug!(url = %self.url, latency_ms = latency.as_millis() as u64, "probe succeeded");
                }
                Err(e) => {
                    status.online = false;
                    status.consecutive_failures += 1;
                    status.last_error = Some(e.to_string());
                    tracing::debug!(
                        url = %self.url,
                        failures = status.consecutive_failures,
                        error = %e,
                        "probe failed"
                    );
                }
            }
            status.online
        };

        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            tracing::info!(url = %self.url, online, "connectivity changed");
        }
    }
}

impl ConnectivityGate for DomainProbe {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Running probe loop; stopped on drop
pub struct ProbeHandle {
    task: JoinHandle<()>,
}

impl ProbeHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
