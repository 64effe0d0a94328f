//! Section codec: one tagged, length-delimited block per section kind.
//!
//! Wire shape of every section:
//!
//! ```text
//! kind           : u8
//! payload_length : varuint
//! payload        : payload_length bytes
//! ```
//!
//! Known kinds are decoded from a reader confined to their payload. Unknown
//! kinds are carried as [`OpaqueSection`], and bytes a newer minor revision
//! appended to a known payload stay with their [`Section::Known`], so a newer
//! image re-serializes byte-for-byte through an older toolchain.

use crate::codec::{ByteReader, ByteWriter, Decode, Encode, decode_list, encode_list};
use crate::entries::{
    DataIndexEntry, ExportEntry, ExternalFunctionEntry, ExternalFunctionIndexEntry,
    FunctionEntry, FunctionIndexEntry, ImportEntry, ImportModuleEntry, InitializedData,
    LocalVariableList, Property, TypeEntry, UninitData,
};
use crate::error::DecodeError;
use crate::ids::FunctionIndex;

/// Section kind, including kinds this implementation does not know.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SectionKind {
    Property,
    Type,
    Function,
    LocalVariableList,
    ReadOnlyData,
    ReadWriteData,
    UninitData,
    Import,
    Export,
    ImportModule,
    ExternalFunction,
    StartFunction,
    FunctionIndex,
    DataIndex,
    ExternalFunctionIndex,
    Unknown(u8),
}

impl SectionKind {
    /// Every known kind, in canonical order.
    pub const KNOWN: [SectionKind; 15] = [
        Self::Property,
        Self::Type,
        Self::Function,
        Self::LocalVariableList,
        Self::ReadOnlyData,
        Self::ReadWriteData,
        Self::UninitData,
        Self::Import,
        Self::Export,
        Self::ImportModule,
        Self::ExternalFunction,
        Self::StartFunction,
        Self::FunctionIndex,
        Self::DataIndex,
        Self::ExternalFunctionIndex,
    ];

    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0x01 => Self::Property,
            0x10 => Self::Type,
            0x11 => Self::Function,
            0x12 => Self::LocalVariableList,
            0x20 => Self::ReadOnlyData,
            0x21 => Self::ReadWriteData,
            0x22 => Self::UninitData,
            0x30 => Self::Import,
            0x31 => Self::Export,
            0x32 => Self::ImportModule,
            0x40 => Self::ExternalFunction,
            0x50 => Self::StartFunction,
            0x60 => Self::FunctionIndex,
            0x61 => Self::DataIndex,
            0x62 => Self::ExternalFunctionIndex,
            other => Self::Unknown(other),
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::Property => 0x01,
            Self::Type => 0x10,
            Self::Function => 0x11,
            Self::LocalVariableList => 0x12,
            Self::ReadOnlyData => 0x20,
            Self::ReadWriteData => 0x21,
            Self::UninitData => 0x22,
            Self::Import => 0x30,
            Self::Export => 0x31,
            Self::ImportModule => 0x32,
            Self::ExternalFunction => 0x40,
            Self::StartFunction => 0x50,
            Self::FunctionIndex => 0x60,
            Self::DataIndex => 0x61,
            Self::ExternalFunctionIndex => 0x62,
            Self::Unknown(tag) => tag,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Type => "type",
            Self::Function => "function",
            Self::LocalVariableList => "local_variable",
            Self::ReadOnlyData => "read_only_data",
            Self::ReadWriteData => "read_write_data",
            Self::UninitData => "uninit_data",
            Self::Import => "import",
            Self::Export => "export",
            Self::ImportModule => "import_module",
            Self::ExternalFunction => "external_function",
            Self::StartFunction => "start_function",
            Self::FunctionIndex => "function_index",
            Self::DataIndex => "data_index",
            Self::ExternalFunctionIndex => "external_function_index",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(tag) => write!(f, "unknown({tag:#04x})"),
            known => f.write_str(known.name()),
        }
    }
}

/// Decoded payload of a known section kind.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum KnownSection {
    Property(Property),
    Type(Vec<TypeEntry>),
    Function(Vec<FunctionEntry>),
    LocalVariableList(Vec<LocalVariableList>),
    ReadOnlyData(Vec<InitializedData>),
    ReadWriteData(Vec<InitializedData>),
    UninitData(Vec<UninitData>),
    Import(Vec<ImportEntry>),
    Export(Vec<ExportEntry>),
    ImportModule(Vec<ImportModuleEntry>),
    ExternalFunction(Vec<ExternalFunctionEntry>),
    StartFunction(Vec<FunctionIndex>),
    FunctionIndex(Vec<FunctionIndexEntry>),
    DataIndex(Vec<DataIndexEntry>),
    ExternalFunctionIndex(Vec<ExternalFunctionIndexEntry>),
}

impl KnownSection {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Property(_) => SectionKind::Property,
            Self::Type(_) => SectionKind::Type,
            Self::Function(_) => SectionKind::Function,
            Self::LocalVariableList(_) => SectionKind::LocalVariableList,
            Self::ReadOnlyData(_) => SectionKind::ReadOnlyData,
            Self::ReadWriteData(_) => SectionKind::ReadWriteData,
            Self::UninitData(_) => SectionKind::UninitData,
            Self::Import(_) => SectionKind::Import,
            Self::Export(_) => SectionKind::Export,
            Self::ImportModule(_) => SectionKind::ImportModule,
            Self::ExternalFunction(_) => SectionKind::ExternalFunction,
            Self::StartFunction(_) => SectionKind::StartFunction,
            Self::FunctionIndex(_) => SectionKind::FunctionIndex,
            Self::DataIndex(_) => SectionKind::DataIndex,
            Self::ExternalFunctionIndex(_) => SectionKind::ExternalFunctionIndex,
        }
    }

    /// Number of entries (a Property section counts as one).
    pub fn len(&self) -> usize {
        match self {
            Self::Property(_) => 1,
            Self::Type(v) => v.len(),
            Self::Function(v) => v.len(),
            Self::LocalVariableList(v) => v.len(),
            Self::ReadOnlyData(v) | Self::ReadWriteData(v) => v.len(),
            Self::UninitData(v) => v.len(),
            Self::Import(v) => v.len(),
            Self::Export(v) => v.len(),
            Self::ImportModule(v) => v.len(),
            Self::ExternalFunction(v) => v.len(),
            Self::StartFunction(v) => v.len(),
            Self::FunctionIndex(v) => v.len(),
            Self::DataIndex(v) => v.len(),
            Self::ExternalFunctionIndex(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn encode_payload(&self, w: &mut ByteWriter) {
        match self {
            Self::Property(p) => p.encode(w),
            Self::Type(v) => encode_list(w, v),
            Self::Function(v) => encode_list(w, v),
            Self::LocalVariableList(v) => encode_list(w, v),
            Self::ReadOnlyData(v) | Self::ReadWriteData(v) => encode_list(w, v),
            Self::UninitData(v) => encode_list(w, v),
            Self::Import(v) => encode_list(w, v),
            Self::Export(v) => encode_list(w, v),
            Self::ImportModule(v) => encode_list(w, v),
            Self::ExternalFunction(v) => encode_list(w, v),
            Self::StartFunction(v) => encode_list(w, v),
            Self::FunctionIndex(v) => encode_list(w, v),
            Self::DataIndex(v) => encode_list(w, v),
            Self::ExternalFunctionIndex(v) => encode_list(w, v),
        }
    }

    /// Write the whole section: header and payload.
    pub fn encode(&self, w: &mut ByteWriter) {
        self.encode_with_trailing(w, &[]);
    }

    /// Write the whole section with `trailing` appended to the payload.
    pub fn encode_with_trailing(&self, w: &mut ByteWriter, trailing: &[u8]) {
        let mut payload = ByteWriter::new();
        self.encode_payload(&mut payload);
        payload.write_raw(trailing);
        encode_section(w, self.kind().tag(), payload.as_slice());
    }

    /// Decode the payload of a known kind. Returns `None` for unknown kinds.
    ///
    /// Bytes left in `r` after the payload's declared contents belong to a
    /// newer minor revision and are left unread for the caller to keep.
    pub fn decode_payload(
        kind: SectionKind,
        r: &mut ByteReader<'_>,
    ) -> Result<Option<Self>, DecodeError> {
        let section = match kind {
            SectionKind::Property => Self::Property(Property::decode(r)?),
            SectionKind::Type => Self::Type(decode_list(r)?),
            SectionKind::Function => Self::Function(decode_list(r)?),
            SectionKind::LocalVariableList => Self::LocalVariableList(decode_list(r)?),
            SectionKind::ReadOnlyData => Self::ReadOnlyData(decode_list(r)?),
            SectionKind::ReadWriteData => Self::ReadWriteData(decode_list(r)?),
            SectionKind::UninitData => Self::UninitData(decode_list(r)?),
            SectionKind::Import => Self::Import(decode_list(r)?),
            SectionKind::Export => Self::Export(decode_list(r)?),
            SectionKind::ImportModule => Self::ImportModule(decode_list(r)?),
            SectionKind::ExternalFunction => Self::ExternalFunction(decode_list(r)?),
            SectionKind::StartFunction => Self::StartFunction(decode_list(r)?),
            SectionKind::FunctionIndex => Self::FunctionIndex(decode_list(r)?),
            SectionKind::DataIndex => Self::DataIndex(decode_list(r)?),
            SectionKind::ExternalFunctionIndex => Self::ExternalFunctionIndex(decode_list(r)?),
            SectionKind::Unknown(_) => return Ok(None),
        };
        Ok(Some(section))
    }
}

/// Section of a kind this implementation does not know, kept verbatim.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OpaqueSection {
    pub tag: u8,
    pub bytes: Vec<u8>,
}

impl OpaqueSection {
    pub fn encode(&self, w: &mut ByteWriter) {
        encode_section(w, self.tag, &self.bytes);
    }
}

/// One section of an image.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Section {
    Known {
        section: KnownSection,
        /// Payload bytes past the decoded contents, written by a newer minor
        /// revision. Re-emitted unchanged after the payload.
        trailing: Vec<u8>,
    },
    Opaque(OpaqueSection),
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Known { section, .. } => section.kind(),
            Self::Opaque(s) => SectionKind::Unknown(s.tag),
        }
    }

    pub fn as_known(&self) -> Option<&KnownSection> {
        match self {
            Self::Known { section, .. } => Some(section),
            Self::Opaque(_) => None,
        }
    }

    /// Payload bytes this implementation could not interpret but keeps.
    pub fn trailing(&self) -> &[u8] {
        match self {
            Self::Known { trailing, .. } => trailing,
            Self::Opaque(_) => &[],
        }
    }

    /// Write tag, payload length and payload.
    pub fn encode(&self, w: &mut ByteWriter) {
        match self {
            Self::Known { section, trailing } => section.encode_with_trailing(w, trailing),
            Self::Opaque(s) => s.encode(w),
        }
    }

    /// Decode a section body whose header has already been read.
    ///
    /// `payload` must be confined to exactly the declared payload bytes.
    pub fn decode(tag: u8, payload: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let kind = SectionKind::from_tag(tag);
        match KnownSection::decode_payload(kind, payload)? {
            Some(section) => {
                if !payload.is_empty() {
                    tracing::trace!(
                        section = %kind,
                        offset = payload.offset(),
                        kept = payload.remaining(),
                        "keeping trailing payload bytes"
                    );
                }
                Ok(Self::Known {
                    section,
                    trailing: payload.read_rest().to_vec(),
                })
            }
            None => Ok(Self::Opaque(OpaqueSection {
                tag,
                bytes: payload.read_rest().to_vec(),
            })),
        }
    }
}

impl From<KnownSection> for Section {
    fn from(section: KnownSection) -> Self {
        Self::Known {
            section,
            trailing: Vec::new(),
        }
    }
}

impl From<OpaqueSection> for Section {
    fn from(s: OpaqueSection) -> Self {
        Self::Opaque(s)
    }
}

/// Write a section header followed by its payload.
pub fn encode_section(w: &mut ByteWriter, tag: u8, payload: &[u8]) {
    w.write_u8(tag);
    w.write_len(payload.len());
    w.write_raw(payload);
}

/// Read a section header: the kind tag and the declared payload length.
///
/// The length is returned unchecked so the caller can apply its limits
/// before confining a reader to it.
pub fn decode_section_header(r: &mut ByteReader<'_>) -> Result<(u8, u64), DecodeError> {
    let tag = r.read_u8()?;
    let len = r.read_varuint()?;
    Ok((tag, len))
}
