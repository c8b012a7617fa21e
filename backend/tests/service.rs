//! End-to-end service tests: payloads in, events and stats out.

use std::net::{IpAddr, Ipv4Addr};

use backend::ServiceConfig;
use bytestream::ByteWriter;
use events::{codes, EventKind, EventPayload, FamePayload};
use protocol16::{encode_parameters, Parameters, Value};

fn addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
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

fn reliable_event(event_code: u8, params: &Parameters) -> Vec<u8> {
    let mut message = ByteWriter::new();
    message.write_u8(243);
    message.write_u8(4);
    message.write_u8(event_code);
    encode_parameters(&mut message, params).unwrap();
    let message = message.finish();

    let mut command = ByteWriter::new();
    command.write_u8(6);
    command.write_u8(0);
    command.write_u8(0);
    command.write_u8(0);
    command.write_u32((12 + message.len()) as u32);
    command.write_i32(1);
    command.write_bytes(&message);
    command.finish()
}

fn feed(service: &backend::Service, payload: &[u8]) {
    service.feed(payload, addr(), addr(), 5056, 40000);
}

#[test]
fn fame_event_flows_to_consumer() {
    let service = ServiceConfig::new().start().unwrap();
    let events = service.events();

    let params: Parameters = [
        (1u8, Value::I64(50_000_000_000)),
        (2u8, Value::I64(10_000_000)),
        (252u8, Value::I16(82)),
    ]
    .into_iter()
    .collect();
    feed(&service, &photon_packet(1, &reliable_event(82, &params)));

    // First receivable event is the online edge info, then the fame event.
    let first = events.try_recv().unwrap();
    assert_eq!(first.kind, EventKind::Info);
    let second = events.try_recv().unwrap();
    assert_eq!(second.kind, EventKind::Fame);
    assert_eq!(
        second.payload,
        Some(EventPayload::Fame(FamePayload {
            gained: 1000,
            total: 5_000_000,
            session: 1000,
        }))
    );
    assert_eq!(service.session().fame, 1000);

    service.stop();
}

#[test]
fn online_edge_fires_once() {
    let service = ServiceConfig::new().start().unwrap();
    let online = service.online_updates();
    assert!(!service.is_online());

    feed(&service, &photon_packet(0, &[]));
    feed(&service, &photon_packet(0, &[]));

    assert!(service.is_online());
    assert_eq!(online.try_recv(), Ok(true));
    // Only the edge is signaled, not every packet.
    assert!(online.try_recv().is_err());

    service.stop();
}

#[test]
fn stats_reflect_fed_packets() {
    let service = ServiceConfig::new().start().unwrap();

    feed(&service, &[0x00]); // malformed
    feed(&service, &photon_packet(0, &[]));

    let snapshot = service.stats_snapshot();
    assert_eq!(snapshot.packets_received, 2);
    assert_eq!(snapshot.packets_malformed, 1);
    assert_eq!(snapshot.packets_processed, 1);

    let summary = service.stats_summary();
    assert!(summary.contains("Packets: 2"));

    service.stop();
}

#[test]
fn kill_and_death_accounting() {
    let service = ServiceConfig::new().start().unwrap();
    let events = service.events();

    feed(
        &service,
        &photon_packet(1, &reliable_event(170, &Parameters::new())),
    );
    feed(
        &service,
        &photon_packet(1, &reliable_event(171, &Parameters::new())),
    );

    let kinds: Vec<EventKind> = events.try_iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec![EventKind::Info, EventKind::Kill, EventKind::Death]);

    let session = service.session();
    assert_eq!(session.kills, 1);
    assert_eq!(session.deaths, 1);

    service.stop();
}

#[test]
fn discovery_saved_on_stop() {
    let dir = std::env::temp_dir().join(format!("photon-lens-service-{}", std::process::id()));
    let path = dir.join("discovered.json");

    let service = ServiceConfig::new().discovery_output(&path).start().unwrap();
    let params: Parameters = [(252u8, Value::I16(codes::IN_COMBAT_STATE))]
        .into_iter()
        .collect();
    feed(&service, &photon_packet(1, &reliable_event(1, &params)));

    let discovered = service.discovered_events().unwrap();
    assert!(discovered.contains_key(&codes::IN_COMBAT_STATE));

    service.stop();

    let contents = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["257"]["code"], 257);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn stop_is_idempotent_and_feed_still_safe() {
    let service = ServiceConfig::new().start().unwrap();
    service.stop();
    service.stop();
    assert!(!service.is_running());
    // Feeding after stop parses but the sweeper is gone; must not panic.
    feed(&service, &photon_packet(0, &[]));
    assert_eq!(service.stats_snapshot().packets_received, 1);
}

#[test]
fn missing_item_index_is_a_startup_error() {
    let result = ServiceConfig::new()
        .item_index_path("/nonexistent/items.json")
        .start();
    assert!(matches!(result, Err(backend::ServiceError::ItemIndex(_))));
}
