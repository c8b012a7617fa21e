//! The game-event interpreter: raw parameter tables in, normalized
//! events and session accounting out.

use std::sync::{Arc, Mutex};

use photon::{PacketHandler, Stats};
use protocol16::{Parameters, Value};
use serde::Serialize;
use tracing::debug;

use crate::codes;
use crate::discovery::Discovery;
use crate::event::{
    format_amount, DeathPayload, EventKind, EventPayload, FamePayload, GameEvent, KillPayload,
    LootPayload, SilverPayload,
};
use crate::items::{placeholder_name, ItemIndex};
use crate::sink::EventSink;

/// Fixed-point denominator: 10000 raw units per display unit.
const FIX_POINT: i64 = 10_000;

/// Experience totals below this raw value (100 display units) are treated
/// as an unrelated event reusing the same parameter shape.
const MIN_FAME_TOTAL: i64 = 1_000_000;

/// Per-session accounting. All counters are monotone non-decreasing.
#[derive(Debug, Default)]
struct SessionState {
    /// Last accepted experience total, raw fixed-point units.
    total_fame_raw: i64,
    /// Experience gained this session, display units.
    session_fame: i64,
    /// Currency gained this session, display units.
    session_silver: i64,
    kills: u64,
    deaths: u64,
    loot: u64,
}

/// A copy of the session counters for external consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Experience gained this session, display units.
    pub fame: i64,
    /// Currency gained this session, display units.
    pub silver: i64,
    pub kills: u64,
    pub deaths: u64,
    pub loot: u64,
}

/// Interprets decoded Photon messages as game events.
///
/// Implements [`PacketHandler`] so it can sit directly behind a
/// [`photon::Parser`]. Session state lives under one mutex; a single
/// event updates all of its counters atomically with respect to other
/// events. Sink delivery is non-blocking; a full sink drops the event
/// and bumps the shared `events_dropped` counter.
pub struct Interpreter<S> {
    sink: S,
    stats: Arc<Stats>,
    items: Option<Arc<ItemIndex>>,
    discovery: Option<Discovery>,
    session: Mutex<SessionState>,
}

impl<S: EventSink> Interpreter<S> {
    /// Creates an interpreter delivering to `sink` and counting into
    /// `stats` (shared with the parser).
    #[must_use]
    pub fn new(sink: S, stats: Arc<Stats>) -> Self {
        Self {
            sink,
            stats,
            items: None,
            discovery: None,
            session: Mutex::new(SessionState::default()),
        }
    }

    /// Attaches an item name index for loot resolution.
    #[must_use]
    pub fn with_items(mut self, items: Arc<ItemIndex>) -> Self {
        self.items = Some(items);
        self
    }

    /// Enables discovery mode: every observed event code is catalogued.
    #[must_use]
    pub fn with_discovery(mut self) -> Self {
        self.discovery = Some(Discovery::new());
        self
    }

    /// The discovery catalogue, when discovery mode is on.
    #[must_use]
    pub fn discovery(&self) -> Option<&Discovery> {
        self.discovery.as_ref()
    }

    /// Copies the current session counters.
    #[must_use]
    pub fn session(&self) -> SessionSnapshot {
        self.session.lock().map_or_else(
            |_| SessionSnapshot::default(),
            |session| SessionSnapshot {
                fame: session.session_fame,
                silver: session.session_silver,
                kills: session.kills,
                deaths: session.deaths,
                loot: session.loot,
            },
        )
    }

    fn emit(&self, kind: EventKind, message: String, payload: EventPayload) {
        let event = GameEvent::new(kind, message, Some(payload));
        if self.sink.deliver(event).is_err() {
            self.stats.incr_events_dropped();
        }
    }

    /// Experience updates, simple (81) and detailed (82) formats.
    ///
    /// Both carry the new total in key 1; the detailed format adds the
    /// gain in key 2. The two codes can fire for the same underlying
    /// gain, so an unchanged total is a duplicate and the total is never
    /// allowed to go down.
    fn handle_fame(&self, params: &Parameters) {
        let new_total = params.i64_at(1);
        if new_total < MIN_FAME_TOTAL {
            debug!(new_total, "ignoring low experience total");
            return;
        }

        let Ok(mut session) = self.session.lock() else {
            return;
        };

        if new_total == session.total_fame_raw {
            return;
        }
        if session.total_fame_raw > 0 && new_total < session.total_fame_raw {
            debug!(
                stored = session.total_fame_raw,
                new_total, "ignoring decreasing experience total"
            );
            return;
        }

        let detailed = params.contains(2);
        let raw_gain = if detailed {
            params.i64_at(2)
        } else if session.total_fame_raw > 0 {
            new_total - session.total_fame_raw
        } else {
            // First observation: record the baseline, nothing to report.
            session.total_fame_raw = new_total;
            return;
        };

        let raw_gain = if raw_gain < 0 {
            self.stats.incr_packets_malformed();
            0
        } else {
            raw_gain
        };

        let gained = raw_gain / FIX_POINT;
        let total = new_total / FIX_POINT;

        if gained > 0 {
            session.session_fame += gained;
            session.total_fame_raw = new_total;
            let session_fame = session.session_fame;
            drop(session);

            self.emit(
                EventKind::Fame,
                format!("FAME: +{gained} | Total: {total} | Session: {session_fame}"),
                EventPayload::Fame(FamePayload {
                    gained,
                    total,
                    session: session_fame,
                }),
            );
        } else if !detailed {
            session.total_fame_raw = new_total;
        }
    }

    /// Another player picked something up (code 275).
    fn handle_other_grabbed_loot(&self, params: &Parameters) {
        let looted_from = params.str_at(1).to_owned();
        let looted_by = params.str_at(2).to_owned();
        let is_silver = params.bool_at(3);
        let item_id = params.i32_at(4);

        if is_silver {
            let raw_amount = params.i64_at(5);
            let amount = if raw_amount < 0 {
                self.stats.incr_packets_malformed();
                0
            } else {
                raw_amount / FIX_POINT
            };

            let Ok(mut session) = self.session.lock() else {
                return;
            };
            session.session_silver += amount;
            let session_silver = session.session_silver;
            drop(session);

            self.emit(
                EventKind::Silver,
                format!(
                    "{looted_by} looted silver ({}) from {looted_from} | Session: {}",
                    format_amount(amount),
                    format_amount(session_silver)
                ),
                EventPayload::Silver(SilverPayload {
                    amount,
                    session: session_silver,
                    looted_by,
                    looted_from,
                }),
            );
        } else {
            let quantity = params.i32_at(5);
            let item_name = self
                .items
                .as_ref()
                .and_then(|items| items.name_for(item_id))
                .unwrap_or_else(|| placeholder_name(item_id));

            let Ok(mut session) = self.session.lock() else {
                return;
            };
            session.loot += 1;
            drop(session);

            self.emit(
                EventKind::Loot,
                format!("{looted_by} looted {item_name} (x{quantity}) from {looted_from}"),
                EventPayload::Loot(LootPayload {
                    item_name,
                    item_id,
                    quantity,
                    looted_by,
                    looted_from,
                }),
            );
        }
    }

    fn handle_killed_player(&self, _params: &Parameters) {
        let Ok(mut session) = self.session.lock() else {
            return;
        };
        session.kills += 1;
        let kills = session.kills;
        drop(session);

        self.emit(
            EventKind::Kill,
            format!("Player killed! (Session: {kills} kills)"),
            EventPayload::Kill(KillPayload {
                session_kills: kills,
            }),
        );
    }

    fn handle_died(&self, _params: &Parameters) {
        let Ok(mut session) = self.session.lock() else {
            return;
        };
        session.deaths += 1;
        let deaths = session.deaths;
        drop(session);

        self.emit(
            EventKind::Death,
            format!("You died! (Session: {deaths} deaths)"),
            EventPayload::Death(DeathPayload {
                session_deaths: deaths,
                victim: None,
                killer: None,
            }),
        );
    }
}

/// Widens the envelope byte and applies the key-252 override.
///
/// The game uses event codes past 255; those arrive with the true code in
/// parameter 252, which takes precedence over the envelope byte.
#[must_use]
pub fn resolve_event_code(envelope_code: u8, params: &Parameters) -> i16 {
    match params.get(codes::PARAM_EVENT_CODE).and_then(Value::as_i64) {
        Some(code) => code as i16,
        None => i16::from(envelope_code),
    }
}

impl<S: EventSink> PacketHandler for Interpreter<S> {
    fn on_request(&self, operation_code: u8, params: Parameters) {
        debug!(operation_code, params = params.len(), "operation request");
    }

    fn on_response(
        &self,
        operation_code: u8,
        return_code: i16,
        debug_message: Option<String>,
        params: Parameters,
    ) {
        debug!(
            operation_code,
            return_code,
            debug_message = debug_message.as_deref().unwrap_or(""),
            params = params.len(),
            "operation response"
        );
    }

    fn on_event(&self, event_code: u8, params: Parameters) {
        let code = resolve_event_code(event_code, &params);

        let handled = match code {
            codes::UPDATE_FAME | codes::UPDATE_FAME_DETAILS => {
                self.handle_fame(&params);
                true
            }
            // Balance updates are consumed but never surfaced: loot
            // pickups already arrive via OTHER_GRABBED_LOOT, and
            // surfacing the balance would double-count them.
            codes::UPDATE_MONEY => {
                debug!(balance = params.i64_at(1), "balance update");
                true
            }
            codes::HEALTH_UPDATE => {
                debug!(params = params.len(), "health update");
                true
            }
            codes::NEW_CHARACTER => {
                debug!(name = params.str_at(1), "new character");
                true
            }
            codes::NEW_LOOT => {
                debug!(params = params.len(), "new loot");
                true
            }
            codes::OTHER_GRABBED_LOOT => {
                self.handle_other_grabbed_loot(&params);
                true
            }
            codes::KILLED_PLAYER => {
                self.handle_killed_player(&params);
                true
            }
            codes::DIED => {
                self.handle_died(&params);
                true
            }
            _ => {
                debug!(code, params = params.len(), "unhandled event");
                false
            }
        };

        if let Some(discovery) = &self.discovery {
            discovery.record(code, &params, handled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use crossbeam_channel::Receiver;

    fn interpreter() -> (Interpreter<ChannelSink>, Receiver<GameEvent>) {
        let (sink, rx) = ChannelSink::bounded(64);
        let interpreter = Interpreter::new(sink, Arc::new(Stats::new()));
        (interpreter, rx)
    }

    fn fame_params(total: i64) -> Parameters {
        [(1u8, Value::I64(total))].into_iter().collect()
    }

    #[test]
    fn resolve_uses_envelope_by_default() {
        assert_eq!(resolve_event_code(81, &Parameters::new()), 81);
    }

    #[test]
    fn resolve_prefers_key_252() {
        let params: Parameters = [(252u8, Value::I16(275))].into_iter().collect();
        assert_eq!(resolve_event_code(98, &params), 275);
    }

    #[test]
    fn resolve_widens_larger_integers() {
        let params: Parameters = [(252u8, Value::I32(257))].into_iter().collect();
        assert_eq!(resolve_event_code(1, &params), 257);
        let params: Parameters = [(252u8, Value::I64(170))].into_iter().collect();
        assert_eq!(resolve_event_code(1, &params), 170);
    }

    #[test]
    fn low_total_is_filtered() {
        let (interpreter, rx) = interpreter();
        interpreter.on_event(81, fame_params(100));
        assert!(rx.try_recv().is_err());
        assert_eq!(interpreter.session().fame, 0);
    }

    #[test]
    fn first_observation_sets_baseline_silently() {
        let (interpreter, rx) = interpreter();
        interpreter.on_event(81, fame_params(50_000_000_000));
        assert!(rx.try_recv().is_err());

        // The baseline is recorded; the next simple update reports the
        // difference.
        interpreter.on_event(81, fame_params(50_010_000_000));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Fame);
        assert_eq!(
            event.payload,
            Some(EventPayload::Fame(FamePayload {
                gained: 1000,
                total: 5_001_000,
                session: 1000,
            }))
        );
    }

    #[test]
    fn detailed_format_uses_gain_parameter() {
        let (interpreter, rx) = interpreter();
        let params: Parameters = [
            (1u8, Value::I64(50_000_000_000)),
            (2u8, Value::I64(10_000_000)),
            (3u8, Value::I64(0)),
            (252u8, Value::I16(82)),
        ]
        .into_iter()
        .collect();

        interpreter.on_event(81, params.clone());
        let event = rx.try_recv().unwrap();
        assert_eq!(
            event.payload,
            Some(EventPayload::Fame(FamePayload {
                gained: 1000,
                total: 5_000_000,
                session: 1000,
            }))
        );

        // An identical second delivery deduplicates on the total.
        interpreter.on_event(81, params);
        assert!(rx.try_recv().is_err());
        assert_eq!(interpreter.session().fame, 1000);
    }

    #[test]
    fn decreasing_total_is_discarded() {
        let (interpreter, rx) = interpreter();
        interpreter.on_event(81, fame_params(50_000_000_000));
        interpreter.on_event(81, fame_params(40_000_000_000));
        assert!(rx.try_recv().is_err());
        assert_eq!(interpreter.session().fame, 0);
    }

    #[test]
    fn negative_detailed_gain_clamps_and_counts_malformed() {
        let (sink, rx) = ChannelSink::bounded(8);
        let stats = Arc::new(Stats::new());
        let interpreter = Interpreter::new(sink, Arc::clone(&stats));
        let params: Parameters = [
            (1u8, Value::I64(50_000_000_000)),
            (2u8, Value::I64(-10_000_000)),
        ]
        .into_iter()
        .collect();
        interpreter.on_event(82, params);
        assert!(rx.try_recv().is_err());
        assert_eq!(stats.events_dropped(), 0);
        assert_eq!(stats.packets_malformed(), 1);
    }

    #[test]
    fn silver_pickup_accumulates_session() {
        let (interpreter, rx) = interpreter();
        let params: Parameters = [
            (1u8, Value::Str("Monster".into())),
            (2u8, Value::Str("Player1".into())),
            (3u8, Value::Bool(true)),
            (4u8, Value::I32(0)),
            (5u8, Value::I64(50_000_000)),
            (252u8, Value::I16(codes::OTHER_GRABBED_LOOT)),
        ]
        .into_iter()
        .collect();

        interpreter.on_event(19, params);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Silver);
        assert_eq!(
            event.payload,
            Some(EventPayload::Silver(SilverPayload {
                amount: 5000,
                session: 5000,
                looted_by: "Player1".into(),
                looted_from: "Monster".into(),
            }))
        );
        assert_eq!(interpreter.session().silver, 5000);
    }

    #[test]
    fn item_pickup_without_index_uses_placeholder() {
        let (interpreter, rx) = interpreter();
        let params: Parameters = [
            (1u8, Value::Str("Player2".into())),
            (2u8, Value::Str("Player1".into())),
            (3u8, Value::Bool(false)),
            (4u8, Value::I32(712)),
            (5u8, Value::I32(3)),
            (252u8, Value::I16(codes::OTHER_GRABBED_LOOT)),
        ]
        .into_iter()
        .collect();

        interpreter.on_event(19, params);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Loot);
        assert_eq!(
            event.payload,
            Some(EventPayload::Loot(LootPayload {
                item_name: "Item#712".into(),
                item_id: 712,
                quantity: 3,
                looted_by: "Player1".into(),
                looted_from: "Player2".into(),
            }))
        );
        assert_eq!(interpreter.session().loot, 1);
    }

    #[test]
    fn item_pickup_resolves_through_index() {
        let (sink, rx) = ChannelSink::bounded(8);
        let index = ItemIndex::from_json_str(
            r#"{"items": {"simpleitem": [{"@uniquename": "T4_BAG"}]}}"#,
        )
        .unwrap();
        let interpreter =
            Interpreter::new(sink, Arc::new(Stats::new())).with_items(index.into_shared());

        let params: Parameters = [
            (1u8, Value::Str("Chest".into())),
            (2u8, Value::Str("Player1".into())),
            (3u8, Value::Bool(false)),
            (4u8, Value::I32(0)),
            (5u8, Value::I32(1)),
            (252u8, Value::I16(codes::OTHER_GRABBED_LOOT)),
        ]
        .into_iter()
        .collect();

        interpreter.on_event(19, params);
        let event = rx.try_recv().unwrap();
        match event.payload {
            Some(EventPayload::Loot(payload)) => assert_eq!(payload.item_name, "T4 Bag"),
            other => panic!("expected loot payload, got {other:?}"),
        }
    }

    #[test]
    fn kill_and_death_counters() {
        let (interpreter, rx) = interpreter();
        interpreter.on_event(170, Parameters::new());
        interpreter.on_event(170, Parameters::new());
        interpreter.on_event(171, Parameters::new());

        let first = rx.try_recv().unwrap();
        assert_eq!(
            first.payload,
            Some(EventPayload::Kill(KillPayload { session_kills: 1 }))
        );
        let second = rx.try_recv().unwrap();
        assert_eq!(
            second.payload,
            Some(EventPayload::Kill(KillPayload { session_kills: 2 }))
        );
        let third = rx.try_recv().unwrap();
        assert_eq!(third.kind, EventKind::Death);

        let session = interpreter.session();
        assert_eq!(session.kills, 2);
        assert_eq!(session.deaths, 1);
    }

    #[test]
    fn balance_update_not_surfaced() {
        let (interpreter, rx) = interpreter();
        let params: Parameters = [(1u8, Value::I64(123_450_000))].into_iter().collect();
        interpreter.on_event(80, params);
        assert!(rx.try_recv().is_err());
        assert_eq!(interpreter.session().silver, 0);
    }

    #[test]
    fn debug_only_events_not_surfaced() {
        let (interpreter, rx) = interpreter();
        interpreter.on_event(6, Parameters::new());
        interpreter.on_event(29, Parameters::new());
        interpreter.on_event(98, Parameters::new());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_sink_counts_dropped_events() {
        let (sink, rx) = ChannelSink::bounded(1);
        let stats = Arc::new(Stats::new());
        let interpreter = Interpreter::new(sink, Arc::clone(&stats));

        interpreter.on_event(170, Parameters::new());
        interpreter.on_event(170, Parameters::new());

        assert_eq!(stats.events_dropped(), 1);
        // The session counter still advanced for the dropped event.
        assert_eq!(interpreter.session().kills, 2);
        drop(rx);
    }

    #[test]
    fn discovery_records_handled_and_unhandled() {
        let (sink, _rx) = ChannelSink::bounded(8);
        let interpreter = Interpreter::new(sink, Arc::new(Stats::new())).with_discovery();

        interpreter.on_event(170, Parameters::new());
        interpreter.on_event(200, Parameters::new());

        let discovery = interpreter.discovery().unwrap();
        let snapshot = discovery.snapshot();
        assert!(snapshot.contains_key(&170));
        assert!(snapshot.contains_key(&200));
    }

    #[test]
    fn session_counters_monotone() {
        let (interpreter, _rx) = interpreter();
        let mut last = SessionSnapshot::default();
        let events: [(u8, Parameters); 4] = [
            (81, fame_params(50_000_000_000)),
            (81, fame_params(50_010_000_000)),
            (170, Parameters::new()),
            (171, Parameters::new()),
        ];
        for (code, params) in events {
            interpreter.on_event(code, params);
            let now = interpreter.session();
            assert!(now.fame >= last.fame);
            assert!(now.silver >= last.silver);
            assert!(now.kills >= last.kills);
            assert!(now.deaths >= last.deaths);
            assert!(now.loot >= last.loot);
            last = now;
        }
    }
}
