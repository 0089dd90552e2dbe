// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::unit::AdKind;
use yare::parameterized;

fn unit() -> UnitId {
    UnitId::new(AdKind::Interstitial, 0)
}

#[parameterized(
    loaded = { AdEvent::UnitLoaded { unit: unit() }, "unit:loaded" },
    load_failed = { AdEvent::UnitLoadFailed { unit: unit(), reason: "x".into() }, "unit:load_failed" },
    closed = { AdEvent::ShowClosed { unit: unit() }, "unit:show_closed" },
    initialized = { AdEvent::AllAdsInitialized, "ads:initialized" },
    torn_down = { AdEvent::UnitsTornDown, "ads:torn_down" },
    error = { AdEvent::Error { message: "x".into() }, "ads:error" },
)]
fn serialized_type_matches_name(event: AdEvent, expected: &str) {
    assert_eq!(event.name(), expected);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], expected);
}

#[test]
fn events_roundtrip_through_json() {
    let event = AdEvent::UnitLoadFailed {
        unit: UnitId::new(AdKind::AppOpen, 2),
        reason: "no fill (code 3)".to_string(),
    };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"kind\":\"app_open\""));
    let parsed: AdEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, event);
}

#[test]
fn log_summary_includes_reason() {
    let event = AdEvent::ShowFailed {
        unit: unit(),
        reason: "activity destroyed".to_string(),
    };
    assert_eq!(
        event.log_summary(),
        "unit:show_failed unit=interstitial#0 reason=activity destroyed"
    );
    assert_eq!(AdEvent::AllAdsInitialized.log_summary(), "ads:initialized");
}

#[test]
fn global_events_have_no_unit() {
    assert_eq!(AdEvent::UnitsTornDown.unit(), None);
    assert_eq!(
        AdEvent::UnitDestroyed { unit: unit() }.unit(),
        Some(unit())
    );
}
