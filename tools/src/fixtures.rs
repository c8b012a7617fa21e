//! Builders for the documented wire-scenario payloads.
//!
//! These are the end-to-end scenarios the test suites pin down; having
//! them as files makes manual replay and debugger sessions easy.

use bytestream::ByteWriter;
use protocol16::{encode_parameters, Parameters, Value};

/// One named fixture payload.
#[derive(Debug, Clone)]
pub struct ScenarioPayload {
    /// File-friendly scenario name.
    pub name: &'static str,
    /// What the scenario exercises.
    pub description: &'static str,
    /// Raw UDP payload bytes.
    pub bytes: Vec<u8>,
}

fn photon_packet(command_count: u8, commands: &[u8]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.write_u16(0);
    writer.write_u8(0);
    writer.write_u8(command_count);
    writer.write_u32(0);
    writer.write_u32(0);
    writer.write_bytes(commands);
    writer.finish()
}

fn reliable_command(sequence: i32, message: &[u8]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.write_u8(6);
    writer.write_u8(0);
    writer.write_u8(0);
    writer.write_u8(0);
    writer.write_u32((12 + message.len()) as u32);
    writer.write_i32(sequence);
    writer.write_bytes(message);
    writer.finish()
}

fn event_message(event_code: u8, params: &Parameters) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    writer.write_u8(243);
    writer.write_u8(4);
    writer.write_u8(event_code);
    encode_parameters(&mut writer, params)
        .unwrap_or_else(|err| unreachable!("fixture values always encode: {err}"));
    writer.finish()
}

fn fragment_command(
    sequence: i32,
    start_sequence: i32,
    fragment_count: u32,
    fragment_number: u32,
    total_length: i32,
    fragment_offset: u32,
    data: &[u8],
) -> Vec<u8> {
    let mut body = ByteWriter::new();
    body.write_i32(start_sequence);
    body.write_u32(fragment_count);
    body.write_u32(fragment_number);
    body.write_i32(total_length);
    body.write_u32(fragment_offset);
    body.write_bytes(data);
    let body = body.finish();

    let mut writer = ByteWriter::new();
    writer.write_u8(8);
    writer.write_u8(0);
    writer.write_u8(0);
    writer.write_u8(0);
    writer.write_u32((12 + body.len()) as u32);
    writer.write_i32(sequence);
    writer.write_bytes(&body);
    writer.finish()
}

/// Builds every documented scenario payload.
#[must_use]
pub fn scenario_payloads() -> Vec<ScenarioPayload> {
    let mut payloads = Vec::new();

    payloads.push(ScenarioPayload {
        name: "s1_malformed",
        description: "single byte, counted as malformed",
        bytes: vec![0x00],
    });

    payloads.push(ScenarioPayload {
        name: "s2_empty",
        description: "minimal header, zero commands",
        bytes: photon_packet(0, &[]),
    });

    let s3_params: Parameters = [(1u8, Value::I32(100))].into_iter().collect();
    payloads.push(ScenarioPayload {
        name: "s3_low_fame",
        description: "one reliable event, code 81, total below the filter",
        bytes: photon_packet(1, &reliable_command(1, &event_message(81, &s3_params))),
    });

    let s4_params: Parameters = [
        (1u8, Value::I64(50_000_000_000)),
        (2u8, Value::I64(10_000_000)),
        (3u8, Value::I64(0)),
        (252u8, Value::I16(82)),
    ]
    .into_iter()
    .collect();
    payloads.push(ScenarioPayload {
        name: "s4_fame_detailed",
        description: "detailed experience update, emits one fame event",
        bytes: photon_packet(1, &reliable_command(1, &event_message(82, &s4_params))),
    });

    let s5_params: Parameters = [
        (1u8, Value::Str("Monster".into())),
        (2u8, Value::Str("Player1".into())),
        (3u8, Value::Bool(true)),
        (4u8, Value::I32(0)),
        (5u8, Value::I64(50_000_000)),
        (252u8, Value::I16(275)),
    ]
    .into_iter()
    .collect();
    payloads.push(ScenarioPayload {
        name: "s5_silver_pickup",
        description: "another player picks up currency",
        bytes: photon_packet(1, &reliable_command(1, &event_message(19, &s5_params))),
    });

    // S6 is two payloads: each carries one fragment of a kill event.
    let mut kill_message = event_message(170, &Parameters::new());
    kill_message.resize(200, 0);
    payloads.push(ScenarioPayload {
        name: "s6_fragment_1of2",
        description: "first half of a fragmented kill event",
        bytes: photon_packet(
            1,
            &fragment_command(10, 42, 2, 0, 200, 0, &kill_message[..100]),
        ),
    });
    payloads.push(ScenarioPayload {
        name: "s6_fragment_2of2",
        description: "second half of a fragmented kill event",
        bytes: photon_packet(
            1,
            &fragment_command(11, 42, 2, 1, 200, 100, &kill_message[100..]),
        ),
    });

    payloads
}
