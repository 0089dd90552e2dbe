// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn empty_document_yields_defaults() {
    let config = AdsConfig::from_toml_str("").unwrap();
    assert_eq!(config, AdsConfig::default());
    assert_eq!(config.indicator.message, "Loading Ad...");
    assert_eq!(config.indicator.timeout, Duration::from_secs(10));
    assert_eq!(config.app_open.validity, Duration::from_secs(4 * 3600));
    assert_eq!(config.preload.gap, Duration::from_millis(500));
    assert_eq!(config.connectivity.url, "https://admob.google.com/");
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = AdsConfig::from_toml_str(
        r#"
        [units]
        interstitial = 3

        [cooldown]
        rewarded = "2s"

        [preload]
        interstitial = true
        gap = "250ms"
        "#,
    )
    .unwrap();

    assert_eq!(config.units.count(AdKind::Interstitial), 3);
    assert_eq!(config.units.count(AdKind::Banner), 1);
    assert_eq!(config.cooldown.for_kind(AdKind::Rewarded), Duration::from_secs(2));
    assert_eq!(
        config.cooldown.for_kind(AdKind::Interstitial),
        Duration::from_secs(5)
    );
    assert_eq!(config.preload.kinds(), vec![AdKind::Interstitial]);
    assert_eq!(config.preload.gap, Duration::from_millis(250));
}

#[test]
fn unit_ids_follow_kind_order() {
    let units = UnitsConfig {
        banner: 0,
        interstitial: 2,
        rewarded: 1,
        native: 0,
        app_open: 1,
    };
    assert_eq!(
        units.unit_ids(),
        vec![
            UnitId::new(AdKind::Interstitial, 0),
            UnitId::new(AdKind::Interstitial, 1),
            UnitId::new(AdKind::Rewarded, 0),
            UnitId::new(AdKind::AppOpen, 0),
        ]
    );
}

#[test]
fn preload_order_is_fixed() {
    let preload = PreloadConfig {
        app_open: true,
        banner: true,
        rewarded: true,
        ..PreloadConfig::default()
    };
    assert_eq!(
        preload.kinds(),
        vec![AdKind::Banner, AdKind::Rewarded, AdKind::AppOpen]
    );
}

#[test]
fn zero_indicator_timeout_is_rejected() {
    let err = AdsConfig::from_toml_str("[indicator]\ntimeout = \"0s\"\n").unwrap_err();
    assert!(err.to_string().contains("indicator.timeout"));
}

#[test]
fn empty_probe_url_is_rejected() {
    let err = AdsConfig::from_toml_str("[connectivity]\nurl = \"  \"\n").unwrap_err();
    assert!(err.to_string().contains("connectivity.url"));
}

#[test]
fn preload_without_units_is_rejected() {
    let err =
        AdsConfig::from_toml_str("[units]\nnative = 0\n[preload]\nnative = true\n").unwrap_err();
    assert!(err.to_string().contains("preload.native"));
}

#[test]
fn malformed_duration_is_a_parse_error() {
    let err = AdsConfig::from_toml_str("[cooldown]\ninterstitial = \"soon\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn default_config_survives_toml_roundtrip() {
    let text = AdsConfig::default().to_toml_string().unwrap();
    assert!(text.contains("[indicator]"));
    assert_eq!(AdsConfig::from_toml_str(&text).unwrap(), AdsConfig::default());
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[app_open]\nvalidity = \"1h\"").unwrap();

    let config = AdsConfig::load(file.path()).unwrap();
    assert_eq!(config.validity_for(AdKind::AppOpen), Some(Duration::from_secs(3600)));
    assert_eq!(config.validity_for(AdKind::Interstitial), None);
}

#[test]
fn load_missing_file_names_path() {
    let err = AdsConfig::load("/nonexistent/adkit.toml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/adkit.toml"));
}
