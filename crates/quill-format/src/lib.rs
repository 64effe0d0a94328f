//! Binary image format for the Quill virtual machine.
//!
//! This crate contains:
//! - Primitive codec (little-endian integers, varuints, strings, byte blocks)
//! - Data model for every table an image carries
//! - Section codec and image layout (header, canonical order, opaque passthrough)
//! - Human-readable dump

pub mod codec;
pub mod colors;
pub mod constants;
pub mod dump;
pub mod entries;
pub mod error;
pub mod header;
pub mod ids;
pub mod image;
pub mod section;

#[cfg(test)]
mod codec_tests;
#[cfg(test)]
mod header_tests;

pub use codec::{ByteReader, ByteWriter, Decode, Encode};
pub use colors::Colors;
pub use constants::{MAGIC, SUPPORTED_MAJOR_VERSIONS, VERSION_MAJOR, VERSION_MINOR};
pub use dump::dump;
pub use entries::{
    DataClass, DataIndexEntry, DataSegment, ExportEntry, ExportKind, ExternalFunctionEntry,
    ExternalFunctionIndexEntry, FunctionEntry, FunctionIndexEntry, ImportEntry, ImportKind,
    ImportModuleEntry, InitializedData, LocalVariable, LocalVariableList, MemoryKind,
    ModuleVersion, Namespace, Property, TypeEntry, UninitData, ValueKind,
};
pub use error::DecodeError;
pub use header::{Header, Version};
pub use ids::{
    DataIndex, ExportIndex, ExternalIndex, FunctionIndex, ImportIndex, LocalListIndex,
    ModuleIndex, TypeIndex,
};
pub use image::{Image, Limits};
pub use section::{
    KnownSection, OpaqueSection, Section, SectionKind, decode_section_header, encode_section,
};

/// Compile-time check that a parsed image can be shared across threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Image>();
};
