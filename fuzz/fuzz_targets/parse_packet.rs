#![no_main]

use libfuzzer_sys::fuzz_target;
use photon::{Limits, PacketHandler, Parser};
use protocol16::Parameters;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
struct Counter {
    dispatched: AtomicU64,
}

impl PacketHandler for Counter {
    fn on_request(&self, _operation_code: u8, _params: Parameters) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    fn on_response(
        &self,
        _operation_code: u8,
        _return_code: i16,
        _debug_message: Option<String>,
        _params: Parameters,
    ) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    fn on_event(&self, _event_code: u8, _params: Parameters) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }
}

fuzz_target!(|data: &[u8]| {
    let parser = Parser::with_limits(Counter::default(), Limits::for_testing());

    // Feed the raw input, then re-frame chunks of it so the command walk
    // and the fragment path both see hostile layouts.
    parser.parse_packet(data);

    let mut idx = 0usize;
    while idx < data.len() && idx < 4096 {
        let len = (data[idx] as usize % 96).saturating_add(1);
        idx += 1;
        let end = (idx + len).min(data.len());
        parser.parse_packet(&data[idx..end]);
        idx = end;
    }

    let received = parser.stats().packets_received();
    assert!(received >= 1, "every payload is counted");
    parser.close();
});
