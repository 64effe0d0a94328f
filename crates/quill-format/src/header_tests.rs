use super::codec::{ByteReader, ByteWriter};
use super::constants::MAGIC;
use super::error::DecodeError;
use super::header::{Header, Version};

fn read(bytes: &[u8]) -> Result<Header, DecodeError> {
    Header::read(&mut ByteReader::new(bytes))
}

#[test]
fn header_layout() {
    let mut w = ByteWriter::new();
    Header::new(Version::CURRENT, 3).write(&mut w);

    assert_eq!(
        w.as_slice(),
        b"QUILLIMG\x01\x00\x00\x00\x03".as_slice()
    );
}

#[test]
fn header_roundtrip() {
    let h = Header::new(Version { major: 1, minor: 7 }, 300);
    let mut w = ByteWriter::new();
    h.write(&mut w);

    let decoded = read(w.as_slice()).unwrap();
    assert_eq!(decoded, h);
    assert_eq!(decoded.magic, MAGIC);
}

#[test]
fn header_default_version() {
    assert_eq!(Version::default(), Version { major: 1, minor: 0 });
    assert!(Version::default().is_supported());
    assert_eq!(Version::default().to_string(), "1.0");
}

#[test]
fn wrong_magic() {
    assert_eq!(
        read(b"QUILLBAD\x01\x00\x00\x00\x00"),
        Err(DecodeError::InvalidMagic)
    );
    assert_eq!(read(b"PK\x03\x04"), Err(DecodeError::InvalidMagic));
}

#[test]
fn magic_prefix_is_truncated() {
    assert_eq!(
        read(b"QUIL"),
        Err(DecodeError::TruncatedInput {
            offset: 4,
            needed: 4
        })
    );
    assert_eq!(
        read(b""),
        Err(DecodeError::TruncatedInput {
            offset: 0,
            needed: 8
        })
    );
}

#[test]
fn unsupported_major() {
    assert_eq!(
        read(b"QUILLIMG\x02\x00\x05\x00\x00"),
        Err(DecodeError::UnsupportedVersion { major: 2, minor: 5 })
    );
}

#[test]
fn any_minor_accepted() {
    let h = read(b"QUILLIMG\x01\x00\xff\xff\x00").unwrap();
    assert_eq!(
        h.version,
        Version {
            major: 1,
            minor: 0xffff
        }
    );
    assert_eq!(h.section_count, 0);
}

#[test]
fn missing_section_count() {
    assert_eq!(
        read(b"QUILLIMG\x01\x00\x00\x00"),
        Err(DecodeError::TruncatedInput {
            offset: 12,
            needed: 1
        })
    );
}
