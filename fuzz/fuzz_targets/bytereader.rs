#![no_main]

use bytestream::ByteReader;
use libfuzzer_sys::fuzz_target;
use protocol16::{decode_parameters, decode_value};

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Use input bytes to drive a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 10;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_u16();
            }
            2 => {
                let _ = reader.read_u32();
            }
            3 => {
                let _ = reader.read_i64();
            }
            4 => {
                let _ = reader.read_f64();
            }
            5 => {
                let _ = reader.read_string();
            }
            6 => {
                let n = data[idx.saturating_sub(1)] as usize;
                let _ = reader.read_bytes(n);
            }
            7 => {
                let _ = reader.peek(4);
            }
            8 => {
                let _ = reader.skip(1);
            }
            _ => {
                let tag = data[idx.saturating_sub(1)];
                let _ = decode_value(&mut reader, tag);
            }
        }
    }

    // A full parameter-table decode over the raw input must also hold.
    let mut reader = ByteReader::new(data);
    let _ = decode_parameters(&mut reader);
});
