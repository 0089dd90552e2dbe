// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events a provider reports while an ad is on screen

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Revenue reported for an impression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdValue {
    /// Value in micros of `currency`
    pub micros: i64,
    pub currency: String,
}

/// Reward granted by a rewarded ad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub kind: String,
    pub amount: u32,
}

/// One step of a show, in the order the provider reports them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ShowEvent {
    Opened,
    Impression,
    Clicked,
    Paid(AdValue),
    Rewarded(Reward),
    /// Dismissed by the user, or hidden for persistent kinds
    Closed,
    Failed(String),
}

impl ShowEvent {
    /// Whether the show is over after this event
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShowEvent::Closed | ShowEvent::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShowEvent::Opened => "opened",
            ShowEvent::Impression => "impression",
            ShowEvent::Clicked => "clicked",
            ShowEvent::Paid(_) => "paid",
            ShowEvent::Rewarded(_) => "rewarded",
            ShowEvent::Closed => "closed",
            ShowEvent::Failed(_) => "failed",
        }
    }
}

/// Channel half a provider reports show events through
pub type ShowEventSender = mpsc::UnboundedSender<ShowEvent>;
pub type ShowEventReceiver = mpsc::UnboundedReceiver<ShowEvent>;

/// Create the channel for one show
pub fn show_channel() -> (ShowEventSender, ShowEventReceiver) {
    mpsc::unbounded_channel()
}
