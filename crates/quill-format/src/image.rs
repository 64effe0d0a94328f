//! In-memory image and its layout on the wire.

use crate::codec::{ByteReader, ByteWriter};
use crate::constants::{DEFAULT_MAX_SECTION_COUNT, DEFAULT_MAX_SECTION_LEN};
use crate::entries::{
    DataIndexEntry, ExportEntry, ExportKind, ExternalFunctionEntry, ExternalFunctionIndexEntry,
    FunctionEntry, FunctionIndexEntry, ImportEntry, ImportKind, ImportModuleEntry,
    InitializedData, LocalVariableList, Property, TypeEntry, UninitData,
};
use crate::error::DecodeError;
use crate::header::{Header, Version};
use crate::ids::FunctionIndex;
use crate::section::{KnownSection, OpaqueSection, Section, SectionKind, decode_section_header};

/// Structural caps applied while decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of sections declared in the header.
    pub max_section_count: usize,
    /// Maximum declared payload length of one section.
    pub max_section_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_section_count: DEFAULT_MAX_SECTION_COUNT,
            max_section_len: DEFAULT_MAX_SECTION_LEN,
        }
    }
}

/// A complete application image.
///
/// Sections are kept in the order they were added or read. The same kind may
/// appear more than once; accessors see the first one and the validator
/// rejects the image.
///
/// Section order is not significant on the wire: [`Image::deserialize`]
/// accepts any order and [`Image::serialize`] always writes canonical order,
/// so an image read in another order re-serializes with its sections moved
/// and every section's bytes unchanged.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Image {
    pub version: Version,
    pub sections: Vec<Section>,
}

macro_rules! section_slice {
    ($(#[$meta:meta])* $fn_name:ident, $variant:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(&self) -> &[$ty] {
            self.known().find_map(|s| match s {
                KnownSection::$variant(v) => Some(v.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
        }
    };
}

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: impl Into<Section>) {
        self.sections.push(section.into());
    }

    /// Encode the image.
    ///
    /// Known sections are written in canonical order (stable for repeated
    /// kinds), followed by opaque sections in their original order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut known: Vec<&Section> = self
            .sections
            .iter()
            .filter(|s| s.kind().is_known())
            .collect();
        known.sort_by_key(|s| s.kind().tag());

        let mut w = ByteWriter::new();
        Header::new(self.version, self.sections.len()).write(&mut w);
        for section in known {
            section.encode(&mut w);
        }
        for section in self.opaque_sections() {
            section.encode(&mut w);
        }
        w.into_vec()
    }

    /// Decode an image without validating cross-references.
    ///
    /// Sections may appear in any order.
    pub fn deserialize(bytes: &[u8], limits: &Limits) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);
        let header = Header::read(&mut r)?;

        if header.section_count > limits.max_section_count as u64 {
            return Err(DecodeError::LimitExceeded {
                what: "section count",
                value: header.section_count,
                limit: limits.max_section_count as u64,
            });
        }

        let count = header.section_count as usize;
        let mut sections = Vec::with_capacity(r.capacity_hint(count));
        for _ in 0..count {
            let (tag, len) = decode_section_header(&mut r)?;
            if len > limits.max_section_len as u64 {
                return Err(DecodeError::LimitExceeded {
                    what: "section length",
                    value: len,
                    limit: limits.max_section_len as u64,
                });
            }
            let mut payload = r.sub_reader(len as usize)?;
            let section = Section::decode(tag, &mut payload)?;
            tracing::trace!(section = %section.kind(), len, "decoded section");
            sections.push(section);
        }

        if !r.is_empty() {
            return Err(DecodeError::TrailingBytes { offset: r.offset() });
        }

        Ok(Self {
            version: header.version,
            sections,
        })
    }

    fn known(&self) -> impl Iterator<Item = &KnownSection> {
        self.sections.iter().filter_map(Section::as_known)
    }

    /// First section of the given kind.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind() == kind)
    }

    pub fn opaque_sections(&self) -> impl Iterator<Item = &OpaqueSection> {
        self.sections.iter().filter_map(|s| match s {
            Section::Opaque(o) => Some(o),
            Section::Known { .. } => None,
        })
    }

    pub fn property(&self) -> Option<&Property> {
        self.known().find_map(|s| match s {
            KnownSection::Property(p) => Some(p),
            _ => None,
        })
    }

    section_slice!(types, Type, TypeEntry);
    section_slice!(functions, Function, FunctionEntry);
    section_slice!(local_variable_lists, LocalVariableList, LocalVariableList);
    section_slice!(read_only_data, ReadOnlyData, InitializedData);
    section_slice!(read_write_data, ReadWriteData, InitializedData);
    section_slice!(uninit_data, UninitData, UninitData);
    section_slice!(imports, Import, ImportEntry);
    section_slice!(exports, Export, ExportEntry);
    section_slice!(external_functions, ExternalFunction, ExternalFunctionEntry);
    section_slice!(
        /// Raw contents of the start section; a valid image has exactly one.
        start_functions,
        StartFunction,
        FunctionIndex
    );
    section_slice!(import_modules, ImportModule, ImportModuleEntry);
    section_slice!(
        /// Targets of the public function space, one per public index.
        function_index,
        FunctionIndex,
        FunctionIndexEntry
    );
    section_slice!(
        /// Targets of the public data space, one per public index.
        data_index,
        DataIndex,
        DataIndexEntry
    );
    section_slice!(
        external_function_index,
        ExternalFunctionIndex,
        ExternalFunctionIndexEntry
    );

    /// Size of the public function space: imported plus internal functions.
    pub fn public_function_count(&self) -> usize {
        let imported = self
            .imports()
            .iter()
            .filter(|i| matches!(i.kind, ImportKind::Function { .. }))
            .count();
        imported + self.functions().len()
    }

    /// Size of the public data space: imported plus internal data segments.
    pub fn public_data_count(&self) -> usize {
        let imported = self
            .imports()
            .iter()
            .filter(|i| matches!(i.kind, ImportKind::Data { .. }))
            .count();
        imported
            + self.read_only_data().len()
            + self.read_write_data().len()
            + self.uninit_data().len()
    }

    /// Import-module entry with this name.
    pub fn import_module(&self, name: &str) -> Option<&ImportModuleEntry> {
        self.import_modules().iter().find(|m| m.name == name)
    }

    pub fn start_function(&self) -> Option<FunctionIndex> {
        self.start_functions().first().copied()
    }

    /// First export with this name, in either namespace.
    pub fn export(&self, name: &str) -> Option<&ExportEntry> {
        self.exports().iter().find(|e| e.name == name)
    }

    pub fn export_of(&self, name: &str, kind: ExportKind) -> Option<&ExportEntry> {
        self.exports()
            .iter()
            .find(|e| e.kind == kind && e.name == name)
    }

    /// Signature of an internal function, if both indices resolve.
    pub fn signature_of(&self, function: FunctionIndex) -> Option<&TypeEntry> {
        let f = self.functions().get(function.as_usize())?;
        self.types().get(f.type_index.as_usize())
    }
}
