//! Photon protocol packet parsing.
//!
//! Photon layers a packet/command structure over raw UDP. This crate walks
//! that structure: the 12-byte packet header, the command records inside
//! it, fragment reassembly for oversized payloads, and the message framing
//! that carries Protocol16 parameter tables. Decoded messages are handed
//! to a [`PacketHandler`].
//!
//! # Design Principles
//!
//! - **Never propagate bad input** - Malformed commands and messages are
//!   dropped where they are found; `parse_packet` has no error path.
//! - **Bounded decoding** - Length fields are validated before use and
//!   reassembly buffers are capped by [`Limits`].
//! - **Concurrent by default** - `parse_packet` takes `&self` and is safe
//!   to call from multiple capture threads.

mod fragments;
mod handler;
mod limits;
mod parser;
mod stats;

pub use fragments::{FragmentOutcome, FragmentStore};
pub use handler::PacketHandler;
pub use limits::Limits;
pub use parser::Parser;
pub use stats::{Stats, StatsSnapshot};

use std::time::Duration;

/// Photon packet header length in bytes.
pub const PACKET_HEADER_LEN: usize = 12;
/// Command header length in bytes (included in the command length field).
pub const COMMAND_HEADER_LEN: usize = 12;
/// Fragment sub-header length in bytes.
pub const FRAGMENT_HEADER_LEN: usize = 20;

/// Command type: peer disconnect; aborts the rest of the packet.
pub const CMD_DISCONNECT: u8 = 4;
/// Command type: reliable message payload.
pub const CMD_SEND_RELIABLE: u8 = 6;
/// Command type: unreliable message payload (4-byte sub-sequence prefix).
pub const CMD_SEND_UNRELIABLE: u8 = 7;
/// Command type: one fragment of an oversized reliable payload.
pub const CMD_SEND_FRAGMENT: u8 = 8;

/// Message type: operation request.
pub const MSG_OPERATION_REQUEST: u8 = 2;
/// Message type: operation response.
pub const MSG_OPERATION_RESPONSE: u8 = 3;
/// Message type: event data.
pub const MSG_EVENT_DATA: u8 = 4;
/// Message type: internal request; handled as a request.
pub const MSG_INTERNAL_REQUEST: u8 = 6;
/// Message type: internal response; handled as a response.
pub const MSG_INTERNAL_RESPONSE: u8 = 7;

/// Pending fragments older than this are evicted.
pub const FRAGMENT_TTL: Duration = Duration::from_secs(30);
/// How often the background sweeper scans for expired fragments.
pub const FRAGMENT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);
