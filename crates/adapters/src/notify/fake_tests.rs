// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_notify_records_calls() {
    let adapter = FakeNotifyAdapter::new();

    adapter.notify("Loading failed").await.unwrap();
    adapter.notify("Try again").await.unwrap();

    assert_eq!(adapter.messages(), vec!["Loading failed", "Try again"]);
}

#[tokio::test]
async fn fake_notify_can_fail_but_still_records() {
    let adapter = FakeNotifyAdapter::new();
    adapter.set_fail(true);

    let result = adapter.notify("hint").await;

    assert!(result.is_err());
    assert_eq!(adapter.calls().len(), 1);
}
