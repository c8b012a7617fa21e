use bytestream::{ByteReader, ByteWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<u16>().prop_map(Op::U16),
        any::<u32>().prop_map(Op::U32),
        any::<u64>().prop_map(Op::U64),
        any::<i16>().prop_map(Op::I16),
        any::<i32>().prop_map(Op::I32),
        any::<i64>().prop_map(Op::I64),
        any::<f32>().prop_map(Op::F32),
        any::<f64>().prop_map(Op::F64),
        any::<bool>().prop_map(Op::Bool),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Op::Bytes),
        ".{0,32}".prop_map(Op::Str),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = ByteWriter::new();

        for op in &ops {
            match op {
                Op::U8(v) => writer.write_u8(*v),
                Op::U16(v) => writer.write_u16(*v),
                Op::U32(v) => writer.write_u32(*v),
                Op::U64(v) => writer.write_u64(*v),
                Op::I16(v) => writer.write_i16(*v),
                Op::I32(v) => writer.write_i32(*v),
                Op::I64(v) => writer.write_i64(*v),
                Op::F32(v) => writer.write_f32(*v),
                Op::F64(v) => writer.write_f64(*v),
                Op::Bool(v) => writer.write_bool(*v),
                Op::Bytes(v) => {
                    writer.write_u16(v.len() as u16);
                    writer.write_bytes(v);
                }
                Op::Str(v) => writer.write_string(v),
            }
        }

        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);

        for op in &ops {
            match op {
                Op::U8(v) => prop_assert_eq!(reader.read_u8().unwrap(), *v),
                Op::U16(v) => prop_assert_eq!(reader.read_u16().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(reader.read_u32().unwrap(), *v),
                Op::U64(v) => prop_assert_eq!(reader.read_u64().unwrap(), *v),
                Op::I16(v) => prop_assert_eq!(reader.read_i16().unwrap(), *v),
                Op::I32(v) => prop_assert_eq!(reader.read_i32().unwrap(), *v),
                Op::I64(v) => prop_assert_eq!(reader.read_i64().unwrap(), *v),
                Op::F32(v) => {
                    let read = reader.read_f32().unwrap();
                    prop_assert_eq!(read.to_bits(), v.to_bits());
                }
                Op::F64(v) => {
                    let read = reader.read_f64().unwrap();
                    prop_assert_eq!(read.to_bits(), v.to_bits());
                }
                Op::Bool(v) => prop_assert_eq!(reader.read_bool().unwrap(), *v),
                Op::Bytes(v) => {
                    let len = reader.read_u16().unwrap() as usize;
                    prop_assert_eq!(len, v.len());
                    prop_assert_eq!(&reader.read_bytes(len).unwrap(), v);
                }
                Op::Str(v) => prop_assert_eq!(&reader.read_string().unwrap(), v),
            }
        }

        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_reader_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut reader = ByteReader::new(&data);
        let mut idx = 0usize;
        while idx < data.len() {
            match data[idx] % 7 {
                0 => { let _ = reader.read_u8(); }
                1 => { let _ = reader.read_u32(); }
                2 => { let _ = reader.read_i64(); }
                3 => { let _ = reader.read_string(); }
                4 => { let _ = reader.read_bytes(data[idx] as usize); }
                5 => { let _ = reader.skip(1); }
                _ => { let _ = reader.read_f64(); }
            }
            idx += 1;
        }
    }
}
