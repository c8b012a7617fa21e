//! The inbound packet-source contract.
//!
//! Capture drivers (libpcap and friends) live outside this workspace.
//! This module fixes the terms they are expected to honor: pre-filter to
//! the game's UDP ports, extract the UDP payload, and push it into
//! [`Service::feed`] with the addressing tuple.
//!
//! [`Service::feed`]: crate::Service::feed

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Master/login server UDP port.
pub const PORT_MASTER: u16 = 5055;
/// Game server UDP port.
pub const PORT_GAME: u16 = 5056;

/// The capture filter a pcap-style driver should apply.
pub const BPF_FILTER: &str = "udp and (port 5055 or port 5056)";

/// The link is considered offline after this long without a packet.
pub const OFFLINE_AFTER: Duration = Duration::from_secs(5);

/// Result type for packet-source startup.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors a packet source can surface at startup.
#[derive(Debug)]
pub enum SourceError {
    /// The capture device could not be opened.
    Open(String),
    /// The capture filter was rejected.
    Filter(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(detail) => write!(f, "failed to open capture device: {detail}"),
            Self::Filter(detail) => write!(f, "failed to apply capture filter: {detail}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A driver that captures UDP payloads and pushes them into the service.
///
/// Implementations call the delivery function once per qualifying UDP
/// datagram, from however many capture threads they use; the service end
/// is safe for concurrent delivery.
pub trait PacketSource: Send {
    /// Human-readable names of the capture interfaces available.
    fn interfaces(&self) -> Vec<String>;

    /// Starts capturing, delivering each payload through `deliver`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the device cannot be opened or the
    /// filter cannot be applied. Once running, capture errors are the
    /// driver's own concern.
    fn start(&mut self, deliver: DeliverFn) -> SourceResult<()>;

    /// Stops capturing. Idempotent.
    fn stop(&mut self);
}

/// Delivery callback handed to a [`PacketSource`]:
/// `(payload, src_ip, dst_ip, src_port, dst_port)`.
pub type DeliverFn = Box<dyn Fn(&[u8], IpAddr, IpAddr, u16, u16) + Send + Sync>;
