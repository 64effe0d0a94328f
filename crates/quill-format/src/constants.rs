//! Image format constants.

/// Magic bytes identifying a Quill application image.
pub const MAGIC: [u8; 8] = *b"QUILLIMG";

/// Major format version written by this implementation.
///
/// A different major version means a different byte layout, so readers
/// reject any major they do not list in [`SUPPORTED_MAJOR_VERSIONS`].
pub const VERSION_MAJOR: u16 = 1;

/// Minor format version written by this implementation.
///
/// Minor revisions only append: new section kinds or trailing fields at the
/// end of a known payload. Readers accept any minor.
pub const VERSION_MINOR: u16 = 0;

/// Major versions this implementation can decode.
pub const SUPPORTED_MAJOR_VERSIONS: &[u16] = &[1];

/// Header size before the section count varuint: magic + major + minor.
pub const FIXED_HEADER_SIZE: usize = 12;

/// Maximum encoded width of a varuint (enough for a `u64`).
pub const MAX_VARINT_LEN: usize = 10;

/// Default cap on the number of sections in one image.
pub const DEFAULT_MAX_SECTION_COUNT: usize = 256;

/// Default cap on a single section payload (256 MiB).
pub const DEFAULT_MAX_SECTION_LEN: usize = 256 * 1024 * 1024;
