use super::codec::{ByteReader, ByteWriter};
use super::error::DecodeError;

fn varuint_bytes(v: u64) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_varuint(v);
    w.into_vec()
}

#[test]
fn fixed_width_is_little_endian() {
    let mut w = ByteWriter::new();
    w.write_u16(0x0102);
    w.write_u32(0x0304_0506);
    w.write_u64(0x0708_090a_0b0c_0d0e);

    assert_eq!(
        w.as_slice(),
        &[
            0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 0x0e, 0x0d, 0x0c, 0x0b, 0x0a, 0x09, 0x08, 0x07
        ]
    );

    let mut r = ByteReader::new(w.as_slice());
    assert_eq!(r.read_u16().unwrap(), 0x0102);
    assert_eq!(r.read_u32().unwrap(), 0x0304_0506);
    assert_eq!(r.read_u64().unwrap(), 0x0708_090a_0b0c_0d0e);
    assert!(r.is_empty());
}

#[test]
fn varuint_known_encodings() {
    assert_eq!(varuint_bytes(0), [0x00]);
    assert_eq!(varuint_bytes(127), [0x7f]);
    assert_eq!(varuint_bytes(128), [0x80, 0x01]);
    assert_eq!(varuint_bytes(624_485), [0xe5, 0x8e, 0x26]);
    assert_eq!(varuint_bytes(u64::MAX).len(), 10);
}

#[test]
fn varuint_max_value_decodes() {
    let bytes = varuint_bytes(u64::MAX);
    let mut r = ByteReader::new(&bytes);
    assert_eq!(r.read_varuint().unwrap(), u64::MAX);
}

#[test]
fn varuint_without_terminator_is_malformed() {
    let bytes = [0xffu8; 11];
    let mut r = ByteReader::new(&bytes);
    assert_eq!(
        r.read_varuint(),
        Err(DecodeError::MalformedVarint { offset: 0 })
    );
}

#[test]
fn varuint_overflowing_tenth_byte_is_malformed() {
    let mut bytes = vec![0xffu8; 9];
    bytes.push(0x02);
    let mut r = ByteReader::new(&bytes);
    assert_eq!(
        r.read_varuint(),
        Err(DecodeError::MalformedVarint { offset: 0 })
    );
}

#[test]
fn varuint_cut_short_is_truncated() {
    let bytes = [0x80u8, 0x80];
    let mut r = ByteReader::new(&bytes);
    assert_eq!(
        r.read_varuint(),
        Err(DecodeError::TruncatedInput {
            offset: 2,
            needed: 1
        })
    );
}

#[test]
fn varuint_u32_rejects_wide_values() {
    let bytes = varuint_bytes(u64::from(u32::MAX) + 1);
    let mut r = ByteReader::new(&bytes);
    assert_eq!(
        r.read_varuint_u32(),
        Err(DecodeError::MalformedVarint { offset: 0 })
    );
}

#[test]
fn string_roundtrip_and_prefix() {
    let mut w = ByteWriter::new();
    w.write_str("héllo");
    assert_eq!(w.as_slice()[0], 6);

    let mut r = ByteReader::new(w.as_slice());
    assert_eq!(r.read_str().unwrap(), "héllo");
}

#[test]
fn invalid_utf8_is_rejected() {
    let bytes = [3u8, b'a', 0xff, b'b'];
    let mut r = ByteReader::new(&bytes);
    assert_eq!(r.read_str(), Err(DecodeError::InvalidUtf8 { offset: 2 }));
}

#[test]
fn declared_length_past_end_is_truncated() {
    let bytes = [10u8, 1, 2, 3];
    let mut r = ByteReader::new(&bytes);
    assert_eq!(
        r.read_bytes(),
        Err(DecodeError::TruncatedInput {
            offset: 4,
            needed: 7
        })
    );
}

#[test]
fn huge_declared_length_fails_before_allocating() {
    let mut w = ByteWriter::new();
    w.write_varuint(u64::MAX);
    let mut r = ByteReader::new(w.as_slice());
    assert!(matches!(
        r.read_bytes(),
        Err(DecodeError::TruncatedInput { .. })
    ));
}

#[test]
fn sub_reader_reports_absolute_offsets() {
    let bytes = [0xaau8, 0xbb, 0x01];
    let mut r = ByteReader::new(&bytes);
    r.read_u8().unwrap();

    let mut sub = r.sub_reader(2).unwrap();
    assert_eq!(sub.offset(), 1);
    sub.read_u16().unwrap();
    assert_eq!(
        sub.read_u8(),
        Err(DecodeError::TruncatedInput {
            offset: 3,
            needed: 1
        })
    );
    assert!(r.is_empty());
}

#[test]
fn capacity_hint_is_clamped_to_input() {
    let bytes = [0u8; 4];
    let r = ByteReader::new(&bytes);
    assert_eq!(r.capacity_hint(1_000_000), 4);
    assert_eq!(r.capacity_hint(2), 2);
}
