//! Image header: magic, format version and section count.
//!
//! ```text
//! magic          : b"QUILLIMG"
//! version_major  : u16
//! version_minor  : u16
//! section_count  : varuint
//! ```

use crate::codec::{ByteReader, ByteWriter};
use crate::constants::{MAGIC, SUPPORTED_MAJOR_VERSIONS, VERSION_MAJOR, VERSION_MINOR};
use crate::error::DecodeError;

/// Format version of an image.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    /// The version this implementation writes.
    pub const CURRENT: Self = Self {
        major: VERSION_MAJOR,
        minor: VERSION_MINOR,
    };

    pub fn is_supported(self) -> bool {
        SUPPORTED_MAJOR_VERSIONS.contains(&self.major)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 8],
    pub version: Version,
    pub section_count: u64,
}

impl Header {
    pub fn new(version: Version, section_count: usize) -> Self {
        Self {
            magic: MAGIC,
            version,
            section_count: section_count as u64,
        }
    }

    pub fn write(&self, w: &mut ByteWriter) {
        w.write_raw(&self.magic);
        w.write_u16(self.version.major);
        w.write_u16(self.version.minor);
        w.write_varuint(self.section_count);
    }

    /// Read and check the header.
    ///
    /// A prefix of the magic is reported as truncation; anything else that
    /// differs from it is `InvalidMagic`.
    pub fn read(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let available = r.remaining().min(MAGIC.len());
        let mut head = r.clone();
        if head.read_raw(available)? != &MAGIC[..available] {
            return Err(DecodeError::InvalidMagic);
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(r.read_raw(MAGIC.len())?);

        let version = Version {
            major: r.read_u16()?,
            minor: r.read_u16()?,
        };
        if !version.is_supported() {
            return Err(DecodeError::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
            });
        }

        let section_count = r.read_varuint()?;
        Ok(Self {
            magic,
            version,
            section_count,
        })
    }
}
