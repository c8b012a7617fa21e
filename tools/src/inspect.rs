//! Structural inspection of a single UDP payload.
//!
//! Walks the same wire layout as the parser but keeps everything instead
//! of dispatching it, producing a serializable report.

use bytestream::ByteReader;
use photon::{
    CMD_DISCONNECT, CMD_SEND_FRAGMENT, CMD_SEND_RELIABLE, CMD_SEND_UNRELIABLE,
    COMMAND_HEADER_LEN, PACKET_HEADER_LEN,
};
use protocol16::decode_parameters;
use serde::Serialize;

/// Report for one inspected payload.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Total payload size in bytes.
    pub payload_len: usize,
    /// Header fields, absent when the payload is shorter than a header.
    pub header: Option<PacketHeaderReport>,
    /// One entry per command walked.
    pub commands: Vec<CommandReport>,
}

/// Decoded Photon packet header fields.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PacketHeaderReport {
    pub peer_id: u16,
    pub flags: u8,
    pub command_count: u8,
    pub encrypted: bool,
    pub crc_enabled: bool,
}

/// One command record.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command_type: u8,
    pub kind: &'static str,
    pub length: u32,
    pub sequence_number: i32,
    /// Message framing, for message-bearing commands that decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageReport>,
}

/// Message framing inside a reliable or unreliable command.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MessageReport {
    pub signal_byte: u8,
    pub message_type: u8,
    pub code: u8,
    pub param_count: usize,
}

fn command_kind(command_type: u8) -> &'static str {
    match command_type {
        CMD_DISCONNECT => "disconnect",
        CMD_SEND_RELIABLE => "send-reliable",
        CMD_SEND_UNRELIABLE => "send-unreliable",
        CMD_SEND_FRAGMENT => "send-fragment",
        _ => "other",
    }
}

/// Inspects one payload. Never fails; truncation simply ends the walk.
#[must_use]
pub fn inspect_payload(payload: &[u8]) -> InspectReport {
    let mut report = InspectReport {
        payload_len: payload.len(),
        header: None,
        commands: Vec::new(),
    };

    if payload.len() < PACKET_HEADER_LEN {
        return report;
    }

    let mut reader = ByteReader::new(payload);
    let Ok(peer_id) = reader.read_u16() else {
        return report;
    };
    let Ok(flags) = reader.read_u8() else {
        return report;
    };
    let Ok(command_count) = reader.read_u8() else {
        return report;
    };
    let _ = reader.skip(8);

    let encrypted = flags == 1;
    let crc_enabled = flags == 0xCC;
    report.header = Some(PacketHeaderReport {
        peer_id,
        flags,
        command_count,
        encrypted,
        crc_enabled,
    });

    if encrypted {
        return report;
    }
    if crc_enabled && reader.skip(4).is_err() {
        return report;
    }

    for _ in 0..command_count {
        if reader.remaining() < COMMAND_HEADER_LEN {
            break;
        }
        let Ok(command_type) = reader.read_u8() else {
            break;
        };
        let _ = reader.skip(3);
        let Ok(length) = reader.read_u32() else {
            break;
        };
        let Ok(sequence_number) = reader.read_i32() else {
            break;
        };
        let Some(data_length) = (length as usize).checked_sub(COMMAND_HEADER_LEN) else {
            break;
        };
        if reader.remaining() < data_length {
            break;
        }
        let Ok(body) = reader.read_bytes_borrowed(data_length) else {
            break;
        };

        let message = match command_type {
            CMD_SEND_RELIABLE => inspect_message(body),
            CMD_SEND_UNRELIABLE if body.len() >= 4 => inspect_message(&body[4..]),
            _ => None,
        };

        report.commands.push(CommandReport {
            command_type,
            kind: command_kind(command_type),
            length,
            sequence_number,
            message,
        });
    }

    report
}

fn inspect_message(data: &[u8]) -> Option<MessageReport> {
    if data.len() < 3 {
        return None;
    }
    let signal_byte = data[0];
    if signal_byte != 243 && signal_byte != 253 {
        return None;
    }
    let message_type = data[1];
    let code = data[2];
    let mut reader = ByteReader::new(&data[3..]);
    let params = decode_parameters(&mut reader);
    Some(MessageReport {
        signal_byte,
        message_type,
        code,
        param_count: params.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytestream::ByteWriter;
    use protocol16::{encode_parameters, Parameters, Value};

    fn event_packet(event_code: u8, params: &Parameters) -> Vec<u8> {
        let mut message = ByteWriter::new();
        message.write_u8(243);
        message.write_u8(4);
        message.write_u8(event_code);
        encode_parameters(&mut message, params).unwrap();
        let message = message.finish();

        let mut writer = ByteWriter::new();
        writer.write_u16(7);
        writer.write_u8(0);
        writer.write_u8(1);
        writer.write_u32(0);
        writer.write_u32(0);
        writer.write_u8(6);
        writer.write_u8(0);
        writer.write_u8(0);
        writer.write_u8(0);
        writer.write_u32((12 + message.len()) as u32);
        writer.write_i32(3);
        writer.write_bytes(&message);
        writer.finish()
    }

    #[test]
    fn short_payload_has_no_header() {
        let report = inspect_payload(&[0x00]);
        assert!(report.header.is_none());
        assert!(report.commands.is_empty());
        assert_eq!(report.payload_len, 1);
    }

    #[test]
    fn event_packet_reports_message() {
        let params: Parameters = [(1u8, Value::I32(100))].into_iter().collect();
        let report = inspect_payload(&event_packet(81, &params));

        let header = report.header.unwrap();
        assert_eq!(header.peer_id, 7);
        assert_eq!(header.command_count, 1);
        assert!(!header.encrypted);

        assert_eq!(report.commands.len(), 1);
        let command = &report.commands[0];
        assert_eq!(command.kind, "send-reliable");
        assert_eq!(command.sequence_number, 3);
        let message = command.message.unwrap();
        assert_eq!(message.code, 81);
        assert_eq!(message.param_count, 1);
    }

    #[test]
    fn encrypted_packet_stops_at_header() {
        let mut payload = vec![0u8; 12];
        payload[2] = 1;
        let report = inspect_payload(&payload);
        assert!(report.header.unwrap().encrypted);
        assert!(report.commands.is_empty());
    }

    #[test]
    fn report_serializes() {
        let params = Parameters::new();
        let report = inspect_payload(&event_packet(81, &params));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["commands"][0]["kind"], "send-reliable");
    }
}
