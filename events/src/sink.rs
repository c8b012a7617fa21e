//! The outbound event contract.

use std::fmt;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::event::GameEvent;

/// Delivery failed because the sink is at capacity.
///
/// The interpreter drops the event and counts it; it never blocks on a
/// slow consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkFull;

impl fmt::Display for SinkFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("event sink is full")
    }
}

impl std::error::Error for SinkFull {}

/// Receives normalized game events from the interpreter.
///
/// `deliver` runs on the capture thread and must not block.
pub trait EventSink: Send + Sync {
    /// Delivers one event, or reports backpressure.
    ///
    /// # Errors
    ///
    /// Returns [`SinkFull`] when the event cannot be accepted without
    /// blocking; the caller drops the event.
    fn deliver(&self, event: GameEvent) -> Result<(), SinkFull>;
}

/// A sink backed by a bounded channel.
///
/// `deliver` uses a non-blocking send; a full channel reports
/// [`SinkFull`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<GameEvent>,
}

impl ChannelSink {
    /// Creates a sink with the given capacity and its receiving half.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<GameEvent>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn deliver(&self, event: GameEvent) -> Result<(), SinkFull> {
        self.tx.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) | TrySendError::Disconnected(_) => SinkFull,
        })
    }
}

/// A sink that invokes a callback directly on the capture thread.
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: Fn(GameEvent) + Send + Sync,
{
    /// Wraps a callback as a sink. The callback must be fast; it runs
    /// inside `parse_packet`.
    #[must_use]
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventSink for CallbackSink<F>
where
    F: Fn(GameEvent) + Send + Sync,
{
    fn deliver(&self, event: GameEvent) -> Result<(), SinkFull> {
        (self.callback)(event);
        Ok(())
    }
}
