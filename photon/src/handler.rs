//! The dispatch seam between the parser and its consumer.

use protocol16::Parameters;

/// Receives decoded Photon messages from a [`Parser`].
///
/// Implementations must be cheap and non-blocking: the callbacks run on
/// the capture thread, inside `parse_packet`.
///
/// [`Parser`]: crate::Parser
pub trait PacketHandler: Send + Sync {
    /// An operation request (client to server).
    fn on_request(&self, operation_code: u8, params: Parameters);

    /// An operation response (server to client).
    ///
    /// `debug_message` is the optional diagnostic string some responses
    /// carry; `None` when the wire marked it null.
    fn on_response(
        &self,
        operation_code: u8,
        return_code: i16,
        debug_message: Option<String>,
        params: Parameters,
    );

    /// A game event (server to client).
    ///
    /// `event_code` is the raw envelope byte; codes above 255 are tunneled
    /// through parameter key 252 and resolved by the consumer.
    fn on_event(&self, event_code: u8, params: Parameters);
}
