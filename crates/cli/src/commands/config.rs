// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration commands

use crate::output::{self, OutputFormat};
use adkit_core::{AdKind, AdsConfig};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the default configuration as TOML
    Default,
    /// Validate a configuration file and summarize it
    Check {
        /// Path to the TOML file
        path: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
struct KindSummary {
    kind: AdKind,
    units: usize,
    #[serde(with = "humantime_serde")]
    cooldown: std::time::Duration,
    preload: bool,
}

#[derive(Serialize)]
struct ConfigSummary {
    path: String,
    kinds: Vec<KindSummary>,
    #[serde(with = "humantime_serde")]
    indicator_timeout: std::time::Duration,
    probe_url: String,
}

impl ConfigSummary {
    fn new(path: String, config: &AdsConfig) -> Self {
        let kinds = AdKind::ALL
            .into_iter()
            .map(|kind| KindSummary {
                kind,
                units: config.units.count(kind),
                cooldown: config.cooldown.for_kind(kind),
                preload: config.preload.enabled(kind),
            })
            .collect();
        Self {
            path,
            kinds,
            indicator_timeout: config.indicator.timeout,
            probe_url: config.connectivity.url.clone(),
        }
    }
}

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: ok", self.path)?;
        writeln!(f)?;
        writeln!(f, "{:<14} {:>5} {:>10} PRELOAD", "KIND", "UNITS", "COOLDOWN")?;
        for kind in &self.kinds {
            writeln!(
                f,
                "{:<14} {:>5} {:>10} {}",
                kind.kind.as_str(),
                kind.units,
                humantime::format_duration(kind.cooldown).to_string(),
                if kind.preload { "yes" } else { "no" }
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Indicator timeout: {}",
            humantime::format_duration(self.indicator_timeout)
        )?;
        write!(f, "Probe URL: {}", self.probe_url)
    }
}

pub fn handle(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Default => {
            print!("{}", AdsConfig::default().to_toml_string()?);
            Ok(())
        }
        ConfigCommand::Check { path, format } => {
            let config = AdsConfig::load(&path)?;
            let summary = ConfigSummary::new(path.display().to_string(), &config);
            output::print(&summary, format);
            Ok(())
        }
    }
}
