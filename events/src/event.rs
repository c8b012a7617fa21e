//! Normalized game events delivered to the sink.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Category of a normalized game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Experience-point gain.
    Fame,
    /// Currency gain.
    Silver,
    /// Another player picked up an item.
    Loot,
    /// A player kill.
    Kill,
    /// The observed player died.
    Death,
    /// Informational message (link online/offline and similar).
    Info,
}

impl EventKind {
    /// The stable string tag used by sinks and serialized output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fame => "fame",
            Self::Silver => "silver",
            Self::Loot => "loot",
            Self::Kill => "kill",
            Self::Death => "death",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized game event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    /// Event category.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Human-readable one-line message.
    pub message: String,
    /// Structured payload for kinds that carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<EventPayload>,
    /// When the event was interpreted.
    pub timestamp: DateTime<Utc>,
}

impl GameEvent {
    /// Creates an event stamped now.
    #[must_use]
    pub fn new(kind: EventKind, message: String, payload: Option<EventPayload>) -> Self {
        Self {
            kind,
            message,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Creates an informational event with no payload.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventKind::Info, message.into(), None)
    }
}

/// Structured payload per event kind. All amounts are display units
/// (raw fixed-point divided by 10000 and floored).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Fame(FamePayload),
    Silver(SilverPayload),
    Loot(LootPayload),
    Kill(KillPayload),
    Death(DeathPayload),
}

/// Payload for [`EventKind::Fame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FamePayload {
    /// Points gained in this event.
    pub gained: i64,
    /// Running total after this event.
    pub total: i64,
    /// Points gained this session.
    pub session: i64,
}

/// Payload for [`EventKind::Silver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SilverPayload {
    /// Amount in this event.
    pub amount: i64,
    /// Amount gained this session.
    pub session: i64,
    /// Player who picked it up.
    pub looted_by: String,
    /// Source the currency came from.
    pub looted_from: String,
}

/// Payload for [`EventKind::Loot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LootPayload {
    /// Resolved item name, or an `Item#<id>` placeholder.
    pub item_name: String,
    pub item_id: i32,
    pub quantity: i32,
    pub looted_by: String,
    pub looted_from: String,
}

/// Payload for [`EventKind::Kill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillPayload {
    pub session_kills: u64,
}

/// Payload for [`EventKind::Death`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathPayload {
    pub session_deaths: u64,
    /// Victim name when the event carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victim: Option<String>,
    /// Killer name when the event carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer: Option<String>,
}

/// Formats a currency amount the way the game abbreviates it.
#[must_use]
pub fn format_amount(amount: i64) -> String {
    if amount >= 1_000_000 {
        format!("{:.1}M", amount as f64 / 1_000_000.0)
    } else if amount >= 1_000 {
        format!("{:.1}k", amount as f64 / 1_000.0)
    } else {
        amount.to_string()
    }
}
