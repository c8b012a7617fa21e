//! Introspection and replay tools for the photon-lens observer.
//!
//! This crate provides utilities for working with captured payload files:
//!
//! - Inspect packet structure (header, commands, message codes)
//! - Replay captures through a full service pipeline
//! - Build the documented wire-scenario fixtures
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not
//!   afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the
//!   parser is doing.

mod fixtures;
mod inspect;

pub use fixtures::{scenario_payloads, ScenarioPayload};
pub use inspect::{
    inspect_payload, CommandReport, InspectReport, MessageReport, PacketHeaderReport,
};
