//! Game-event interpretation for the photon-lens observer.
//!
//! Sits behind the [`photon`] parser: takes decoded (code, parameter
//! table) pairs, resolves the true event code, maintains per-session
//! accounting, and emits normalized [`GameEvent`]s to an [`EventSink`].
//! Also hosts discovery mode, which catalogues every event code observed.
//!
//! # Design Principles
//!
//! - **Branch on variants, never on type identity** - Parameter access
//!   goes through the typed [`protocol16::Value`] accessors.
//! - **Non-blocking delivery** - A slow consumer costs a dropped event
//!   and a counter bump, never a stall on the capture thread.
//! - **Monotone session state** - Totals and session counters never
//!   decrease.

pub mod codes;
mod discovery;
mod event;
mod interpreter;
mod items;
mod sink;

pub use discovery::{DiscoveredEvent, Discovery, DiscoveryError, DiscoveryResult};
pub use event::{
    format_amount, DeathPayload, EventKind, EventPayload, FamePayload, GameEvent, KillPayload,
    LootPayload, SilverPayload,
};
pub use interpreter::{resolve_event_code, Interpreter, SessionSnapshot};
pub use items::{
    format_item_name, placeholder_name, ItemIndex, ItemIndexError, ItemIndexResult,
};
pub use sink::{CallbackSink, ChannelSink, EventSink, SinkFull};
