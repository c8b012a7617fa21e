//! The Photon protocol state machine.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use bytestream::ByteReader;
use crossbeam_channel::{bounded, tick, Sender};
use protocol16::decode_parameters;
use tracing::{debug, trace};

use crate::fragments::{FragmentOutcome, FragmentStore};
use crate::handler::PacketHandler;
use crate::limits::Limits;
use crate::stats::Stats;
use crate::{
    CMD_DISCONNECT, CMD_SEND_FRAGMENT, CMD_SEND_RELIABLE, CMD_SEND_UNRELIABLE,
    COMMAND_HEADER_LEN, FRAGMENT_HEADER_LEN, FRAGMENT_SWEEP_INTERVAL, FRAGMENT_TTL,
    MSG_EVENT_DATA, MSG_INTERNAL_REQUEST, MSG_INTERNAL_RESPONSE, MSG_OPERATION_REQUEST,
    MSG_OPERATION_RESPONSE, PACKET_HEADER_LEN,
};

/// Packet flags value marking an encrypted packet.
const FLAG_ENCRYPTED: u8 = 1;
/// Packet flags value marking a CRC field after the header.
const FLAG_CRC: u8 = 0xCC;

/// Parses raw UDP payloads as Photon packets and dispatches the decoded
/// messages to a [`PacketHandler`].
///
/// `parse_packet` is safe to call concurrently from multiple capture
/// threads. The parser owns a background sweeper that evicts stale
/// fragment reassembly entries every [`FRAGMENT_SWEEP_INTERVAL`]; call
/// [`close`](Self::close) (idempotent) to stop it. Dropping the parser
/// closes it as well.
pub struct Parser<H> {
    handler: H,
    stats: Arc<Stats>,
    fragments: Arc<FragmentStore>,
    sweeper: std::sync::Mutex<Option<Sweeper>>,
}

struct Sweeper {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl<H: PacketHandler> Parser<H> {
    /// Creates a parser with default [`Limits`] and starts its sweeper.
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self::with_limits(handler, Limits::default())
    }

    /// Creates a parser with explicit limits and starts its sweeper.
    #[must_use]
    pub fn with_limits(handler: H, limits: Limits) -> Self {
        Self::with_stats(handler, limits, Arc::new(Stats::new()))
    }

    /// Creates a parser sharing an externally owned [`Stats`] bundle.
    ///
    /// Embedders use this to give the parser and its handler one counter
    /// set (the handler counts dropped sink deliveries).
    #[must_use]
    pub fn with_stats(handler: H, limits: Limits, stats: Arc<Stats>) -> Self {
        let fragments = Arc::new(FragmentStore::new(limits));
        let sweeper = spawn_sweeper(
            Arc::clone(&fragments),
            Arc::clone(&stats),
            FRAGMENT_TTL,
            FRAGMENT_SWEEP_INTERVAL,
        );
        Self {
            handler,
            stats,
            fragments,
            sweeper: std::sync::Mutex::new(Some(sweeper)),
        }
    }

    /// The parser's statistics, shareable with external consumers.
    #[must_use]
    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// The handler this parser dispatches to.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Number of fragment reassemblies currently in flight.
    #[must_use]
    pub fn pending_fragments(&self) -> usize {
        self.fragments.len()
    }

    /// Stops the background sweeper. Idempotent; in-flight
    /// `parse_packet` calls run to completion.
    pub fn close(&self) {
        let sweeper = match self.sweeper.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(sweeper) = sweeper {
            // The sweeper exits on a dropped or signaled stop channel.
            let _ = sweeper.stop.send(());
            let _ = sweeper.thread.join();
        }
    }

    /// Parses one UDP payload.
    ///
    /// Never fails and never panics: malformed input is counted and
    /// dropped at the smallest enclosing structure.
    pub fn parse_packet(&self, payload: &[u8]) {
        self.stats.record_packet(payload.len());

        if payload.len() < PACKET_HEADER_LEN {
            self.stats.incr_packets_malformed();
            return;
        }

        let mut reader = ByteReader::new(payload);
        // peer id (2), flags, command count, timestamp (4), challenge (4);
        // only flags and command count matter here.
        let _ = reader.skip(2);
        let Ok(flags) = reader.read_u8() else { return };
        let Ok(command_count) = reader.read_u8() else {
            return;
        };
        let _ = reader.skip(8);

        if flags == FLAG_ENCRYPTED {
            trace!("skipping encrypted packet");
            self.stats.incr_packets_encrypted();
            return;
        }
        if flags == FLAG_CRC {
            // The CRC value is tolerated but not verified.
            self.stats.incr_packets_with_crc();
            if reader.skip(4).is_err() {
                self.stats.incr_packets_malformed();
                return;
            }
        }

        for _ in 0..command_count {
            if reader.remaining() < COMMAND_HEADER_LEN {
                break;
            }

            let Ok(command_type) = reader.read_u8() else {
                break;
            };
            // channel id, command flags, reserved
            let _ = reader.skip(3);
            let Ok(command_length) = reader.read_u32() else {
                break;
            };
            let Ok(sequence_number) = reader.read_i32() else {
                break;
            };

            // The command length includes its own 12-byte header.
            let Some(data_length) = (command_length as usize).checked_sub(COMMAND_HEADER_LEN)
            else {
                self.stats.incr_packets_malformed();
                break;
            };
            if reader.remaining() < data_length {
                debug!(
                    data_length,
                    remaining = reader.remaining(),
                    "command length exceeds packet"
                );
                break;
            }

            match command_type {
                CMD_DISCONNECT => {
                    trace!("disconnect command, dropping remaining commands");
                    return;
                }
                CMD_SEND_RELIABLE => {
                    let Ok(body) = reader.read_bytes_borrowed(data_length) else {
                        break;
                    };
                    self.handle_message(body);
                }
                CMD_SEND_UNRELIABLE => {
                    // Unreliable commands carry a 4-byte sub-sequence
                    // before the message body.
                    if data_length < 4 {
                        let _ = reader.skip(data_length);
                        continue;
                    }
                    let _ = reader.skip(4);
                    let Ok(body) = reader.read_bytes_borrowed(data_length - 4) else {
                        break;
                    };
                    self.handle_message(body);
                }
                CMD_SEND_FRAGMENT => {
                    let Ok(body) = reader.read_bytes_borrowed(data_length) else {
                        break;
                    };
                    self.handle_fragment(body, sequence_number);
                }
                _ => {
                    let _ = reader.skip(data_length);
                }
            }
        }

        self.stats.incr_packets_processed();
    }

    /// Decodes one message body (from a reliable command or a completed
    /// reassembly) and dispatches it.
    fn handle_message(&self, data: &[u8]) {
        if data.len() < 2 {
            return;
        }

        let signal_byte = data[0];
        if signal_byte != 243 && signal_byte != 253 {
            return;
        }

        let message_type = data[1];
        if message_type > 128 {
            trace!(message_type, "skipping encrypted message");
            return;
        }

        let body = &data[2..];
        match message_type {
            MSG_OPERATION_REQUEST | MSG_INTERNAL_REQUEST => self.decode_request(body),
            MSG_OPERATION_RESPONSE | MSG_INTERNAL_RESPONSE => self.decode_response(body),
            MSG_EVENT_DATA => self.decode_event(body),
            _ => {}
        }
    }

    fn decode_request(&self, data: &[u8]) {
        let mut reader = ByteReader::new(data);
        let Ok(operation_code) = reader.read_u8() else {
            return;
        };
        let params = decode_parameters(&mut reader);
        trace!(operation_code, params = params.len(), "request");
        self.stats.incr_requests_decoded();
        self.handler.on_request(operation_code, params);
    }

    fn decode_response(&self, data: &[u8]) {
        if data.len() < 4 {
            return;
        }
        let mut reader = ByteReader::new(data);
        let Ok(operation_code) = reader.read_u8() else {
            return;
        };
        let Ok(return_code) = reader.read_i16() else {
            return;
        };

        // Optional debug string: a leading null tag (0 or '*') means
        // "no message" and consumes just the tag byte.
        let mut debug_message = None;
        if let Ok(value_tag) = reader.read_u8() {
            if value_tag != 0 && value_tag != 42 {
                debug_message = reader.read_string().ok();
            }
        }

        let params = decode_parameters(&mut reader);
        trace!(operation_code, return_code, params = params.len(), "response");
        self.stats.incr_responses_decoded();
        self.handler
            .on_response(operation_code, return_code, debug_message, params);
    }

    fn decode_event(&self, data: &[u8]) {
        let mut reader = ByteReader::new(data);
        let Ok(event_code) = reader.read_u8() else {
            return;
        };
        let params = decode_parameters(&mut reader);
        trace!(event_code, params = params.len(), "event");
        self.stats.incr_events_decoded();
        self.handler.on_event(event_code, params);
    }

    /// Handles one send-fragment command body.
    ///
    /// The reassembly key is the start sequence number from the fragment
    /// sub-header, not the command's own sequence number.
    fn handle_fragment(&self, data: &[u8], _sequence_number: i32) {
        if data.len() < FRAGMENT_HEADER_LEN {
            return;
        }

        let mut reader = ByteReader::new(data);
        let Ok(start_sequence) = reader.read_i32() else {
            return;
        };
        // fragment count and fragment number are not needed for
        // offset-based reassembly.
        let _ = reader.skip(8);
        let Ok(total_length) = reader.read_i32() else {
            return;
        };
        let Ok(fragment_offset) = reader.read_u32() else {
            return;
        };

        let fragment_data = reader.remaining_bytes();
        self.stats.incr_fragments_received();

        match self.fragments.insert(
            start_sequence,
            total_length,
            fragment_offset as usize,
            fragment_data,
        ) {
            FragmentOutcome::Completed(payload) => {
                debug!(
                    start_sequence,
                    bytes = payload.len(),
                    "reassembled fragmented payload"
                );
                self.stats.incr_fragments_completed();
                self.handle_message(&payload);
            }
            FragmentOutcome::Rejected => {
                debug!(start_sequence, total_length, "fragment rejected by limits");
                self.stats.incr_packets_malformed();
            }
            FragmentOutcome::Stored | FragmentOutcome::Discarded => {}
        }
    }
}

impl<H> Drop for Parser<H> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.sweeper.lock() {
            if let Some(sweeper) = guard.take() {
                let _ = sweeper.stop.send(());
                let _ = sweeper.thread.join();
            }
        }
    }
}

fn spawn_sweeper(
    fragments: Arc<FragmentStore>,
    stats: Arc<Stats>,
    ttl: Duration,
    interval: Duration,
) -> Sweeper {
    let (stop_tx, stop_rx) = bounded::<()>(1);
    let ticker = tick(interval);
    let thread = std::thread::spawn(move || loop {
        crossbeam_channel::select! {
            recv(ticker) -> _ => {
                let expired = fragments.sweep(ttl);
                if expired > 0 {
                    debug!(expired, "evicted expired fragments");
                    stats.add_fragments_expired(expired as u64);
                }
            }
            recv(stop_rx) -> _ => return,
        }
    });
    Sweeper {
        stop: stop_tx,
        thread,
    }
}
