//! Service layer for the photon-lens observer.
//!
//! Wires the [`photon`] parser and the [`events`] interpreter into one
//! [`Service`] that packet sources push payloads into and frontends
//! (TUI, CLI, APIs) consume from through bounded channels: game events,
//! periodic stats snapshots, and an online/offline edge signal.
//!
//! The packet capture driver itself lives outside this workspace; its
//! contract is the [`PacketSource`] trait plus the port and filter
//! constants in [`source`].
//!
//! # Design Principles
//!
//! - **One shared counter set** - Parser and interpreter count into the
//!   same [`photon::Stats`].
//! - **Drop, never block** - Every channel send from the capture path is
//!   non-blocking.
//! - **Startup errors surface, steady-state errors do not.**

mod config;
mod error;
mod service;
pub mod source;

pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use service::Service;
pub use source::{PacketSource, SourceError, BPF_FILTER, OFFLINE_AFTER, PORT_GAME, PORT_MASTER};
