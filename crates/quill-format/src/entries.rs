//! Table entries and their payload encodings.
//!
//! Each entry type implements [`Encode`] and [`Decode`]; the section codec
//! wraps lists of them with a varuint count. Decoding is permissive about
//! cross-references (an out-of-range index decodes fine) and strict about
//! shape (an unknown enumeration byte is [`DecodeError::InvalidTag`]).

use serde::{Deserialize, Serialize};

use crate::codec::{ByteReader, ByteWriter, Decode, Encode};
use crate::error::DecodeError;
use crate::ids::{FunctionIndex, LocalListIndex, ModuleIndex, TypeIndex};

fn invalid_tag(what: &'static str, tag: u8, offset: usize) -> DecodeError {
    DecodeError::InvalidTag { what, tag, offset }
}

/// Kind of an operand value (parameter, result).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ValueKind {
    I32 = 0,
    I64 = 1,
    F32 = 2,
    F64 = 3,
}

impl ValueKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::I32),
            1 => Some(Self::I64),
            2 => Some(Self::F32),
            3 => Some(Self::F64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl Encode for ValueKind {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_u8(*self as u8);
    }
}

impl Decode for ValueKind {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = r.offset();
        let tag = r.read_u8()?;
        Self::from_u8(tag).ok_or_else(|| invalid_tag("value kind", tag, offset))
    }
}

/// Kind of a value stored in memory (data segments, local variables).
///
/// Same as [`ValueKind`] plus an untyped byte run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MemoryKind {
    I32 = 0,
    I64 = 1,
    F32 = 2,
    F64 = 3,
    Bytes = 4,
}

impl MemoryKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::I32),
            1 => Some(Self::I64),
            2 => Some(Self::F32),
            3 => Some(Self::F64),
            4 => Some(Self::Bytes),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bytes => "bytes",
        }
    }
}

impl Encode for MemoryKind {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_u8(*self as u8);
    }
}

impl Decode for MemoryKind {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = r.offset();
        let tag = r.read_u8()?;
        Self::from_u8(tag).ok_or_else(|| invalid_tag("memory kind", tag, offset))
    }
}

/// Mutability/initialization class of a data segment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DataClass {
    ReadOnly = 0,
    ReadWrite = 1,
    Uninit = 2,
}

impl DataClass {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::ReadOnly),
            1 => Some(Self::ReadWrite),
            2 => Some(Self::Uninit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::ReadWrite => "read_write",
            Self::Uninit => "uninit",
        }
    }
}

impl std::fmt::Display for DataClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Encode for DataClass {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_u8(*self as u8);
    }
}

impl Decode for DataClass {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = r.offset();
        let tag = r.read_u8()?;
        Self::from_u8(tag).ok_or_else(|| invalid_tag("data class", tag, offset))
    }
}

fn encode_kinds(w: &mut ByteWriter, kinds: &[ValueKind]) {
    w.write_len(kinds.len());
    for kind in kinds {
        kind.encode(w);
    }
}

fn decode_kinds(r: &mut ByteReader<'_>) -> Result<Vec<ValueKind>, DecodeError> {
    // One byte per kind, so the length check doubles as a truncation check.
    let count = r.read_len()?;
    (0..count).map(|_| ValueKind::decode(r)).collect()
}

/// Function signature.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct TypeEntry {
    #[serde(default)]
    pub params: Vec<ValueKind>,
    #[serde(default)]
    pub results: Vec<ValueKind>,
}

impl TypeEntry {
    pub fn new(params: Vec<ValueKind>, results: Vec<ValueKind>) -> Self {
        Self { params, results }
    }
}

impl Encode for TypeEntry {
    fn encode(&self, w: &mut ByteWriter) {
        encode_kinds(w, &self.params);
        encode_kinds(w, &self.results);
    }
}

impl Decode for TypeEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let params = decode_kinds(r)?;
        let results = decode_kinds(r)?;
        Ok(Self { params, results })
    }
}

/// Function body: signature, locals and opaque bytecode.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub type_index: TypeIndex,
    pub local_list_index: LocalListIndex,
    pub code: Vec<u8>,
}

impl FunctionEntry {
    pub fn new(type_index: TypeIndex, local_list_index: LocalListIndex, code: Vec<u8>) -> Self {
        Self {
            type_index,
            local_list_index,
            code,
        }
    }
}

impl Encode for FunctionEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_varuint(u64::from(self.type_index.0));
        w.write_varuint(u64::from(self.local_list_index.0));
        w.write_bytes(&self.code);
    }
}

impl Decode for FunctionEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let type_index = TypeIndex(r.read_varuint_u32()?);
        let local_list_index = LocalListIndex(r.read_varuint_u32()?);
        let code = r.read_bytes()?.to_vec();
        Ok(Self {
            type_index,
            local_list_index,
            code,
        })
    }
}

/// One local storage slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LocalVariable {
    pub kind: MemoryKind,
    /// Actual size in bytes (before any slot padding the VM applies).
    pub length: u32,
    pub align: u16,
}

impl LocalVariable {
    /// A scalar slot sized and aligned to its own width.
    pub fn scalar(kind: ValueKind) -> Self {
        let (kind, width) = match kind {
            ValueKind::I32 => (MemoryKind::I32, 4),
            ValueKind::I64 => (MemoryKind::I64, 8),
            ValueKind::F32 => (MemoryKind::F32, 4),
            ValueKind::F64 => (MemoryKind::F64, 8),
        };
        Self {
            kind,
            length: width,
            align: width as u16,
        }
    }

    /// An untyped byte buffer.
    pub fn bytes(length: u32, align: u16) -> Self {
        Self {
            kind: MemoryKind::Bytes,
            length,
            align,
        }
    }
}

impl Encode for LocalVariable {
    fn encode(&self, w: &mut ByteWriter) {
        self.kind.encode(w);
        w.write_varuint(u64::from(self.length));
        w.write_u16(self.align);
    }
}

impl Decode for LocalVariable {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let kind = MemoryKind::decode(r)?;
        let length = r.read_varuint_u32()?;
        let align = r.read_u16()?;
        Ok(Self {
            kind,
            length,
            align,
        })
    }
}

/// Local storage layout of one function (or block).
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct LocalVariableList {
    #[serde(default)]
    pub variables: Vec<LocalVariable>,
}

impl LocalVariableList {
    pub fn new(variables: Vec<LocalVariable>) -> Self {
        Self { variables }
    }
}

impl Encode for LocalVariableList {
    fn encode(&self, w: &mut ByteWriter) {
        crate::codec::encode_list(w, &self.variables);
    }
}

impl Decode for LocalVariableList {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            variables: crate::codec::decode_list(r)?,
        })
    }
}

/// Read-only or read-write data with initial contents.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct InitializedData {
    pub kind: MemoryKind,
    pub align: u16,
    pub bytes: Vec<u8>,
}

impl Encode for InitializedData {
    fn encode(&self, w: &mut ByteWriter) {
        self.kind.encode(w);
        w.write_u16(self.align);
        w.write_bytes(&self.bytes);
    }
}

impl Decode for InitializedData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let kind = MemoryKind::decode(r)?;
        let align = r.read_u16()?;
        let bytes = r.read_bytes()?.to_vec();
        Ok(Self { kind, align, bytes })
    }
}

/// Zero-filled data: only its size and alignment are stored.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UninitData {
    pub kind: MemoryKind,
    pub align: u16,
    pub length: u32,
}

impl Encode for UninitData {
    fn encode(&self, w: &mut ByteWriter) {
        self.kind.encode(w);
        w.write_u16(self.align);
        w.write_varuint(u64::from(self.length));
    }
}

impl Decode for UninitData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let kind = MemoryKind::decode(r)?;
        let align = r.read_u16()?;
        let length = r.read_varuint_u32()?;
        Ok(Self {
            kind,
            align,
            length,
        })
    }
}

/// A data segment in one of the three classes.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum DataSegment {
    ReadOnly(InitializedData),
    ReadWrite(InitializedData),
    Uninit(UninitData),
}

impl DataSegment {
    pub fn class(&self) -> DataClass {
        match self {
            Self::ReadOnly(_) => DataClass::ReadOnly,
            Self::ReadWrite(_) => DataClass::ReadWrite,
            Self::Uninit(_) => DataClass::Uninit,
        }
    }

    pub fn align(&self) -> u16 {
        match self {
            Self::ReadOnly(d) | Self::ReadWrite(d) => d.align,
            Self::Uninit(d) => d.align,
        }
    }
}

/// What an import expects to be bound to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportKind {
    Function { type_index: TypeIndex },
    Data { class: DataClass, kind: MemoryKind },
}

const IMPORT_FUNCTION: u8 = 0;
const IMPORT_DATA: u8 = 1;

impl Encode for ImportKind {
    fn encode(&self, w: &mut ByteWriter) {
        match self {
            Self::Function { type_index } => {
                w.write_u8(IMPORT_FUNCTION);
                w.write_varuint(u64::from(type_index.0));
            }
            Self::Data { class, kind } => {
                w.write_u8(IMPORT_DATA);
                class.encode(w);
                kind.encode(w);
            }
        }
    }
}

impl Decode for ImportKind {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = r.offset();
        match r.read_u8()? {
            IMPORT_FUNCTION => Ok(Self::Function {
                type_index: TypeIndex(r.read_varuint_u32()?),
            }),
            IMPORT_DATA => Ok(Self::Data {
                class: DataClass::decode(r)?,
                kind: MemoryKind::decode(r)?,
            }),
            tag => Err(invalid_tag("import kind", tag, offset)),
        }
    }
}

/// External dependency, resolved later by the linker.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ImportEntry {
    pub module: String,
    pub name: String,
    pub kind: ImportKind,
}

impl ImportEntry {
    pub fn function(module: &str, name: &str, type_index: TypeIndex) -> Self {
        Self {
            module: module.to_string(),
            name: name.to_string(),
            kind: ImportKind::Function { type_index },
        }
    }
}

impl Encode for ImportEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_str(&self.module);
        w.write_str(&self.name);
        self.kind.encode(w);
    }
}

impl Decode for ImportEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let module = r.read_str()?.to_string();
        let name = r.read_str()?.to_string();
        let kind = ImportKind::decode(r)?;
        Ok(Self { module, name, kind })
    }
}

/// Which table an export's index points into.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ExportKind {
    Function = 0,
    ReadOnlyData = 1,
    ReadWriteData = 2,
    UninitData = 3,
}

/// Name scope for exports: functions and data never share names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Namespace {
    Function,
    Data,
}

impl ExportKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Function),
            1 => Some(Self::ReadOnlyData),
            2 => Some(Self::ReadWriteData),
            3 => Some(Self::UninitData),
            _ => None,
        }
    }

    pub fn namespace(self) -> Namespace {
        match self {
            Self::Function => Namespace::Function,
            _ => Namespace::Data,
        }
    }

    pub fn data_class(self) -> Option<DataClass> {
        match self {
            Self::Function => None,
            Self::ReadOnlyData => Some(DataClass::ReadOnly),
            Self::ReadWriteData => Some(DataClass::ReadWrite),
            Self::UninitData => Some(DataClass::Uninit),
        }
    }

    pub fn for_data(class: DataClass) -> Self {
        match class {
            DataClass::ReadOnly => Self::ReadOnlyData,
            DataClass::ReadWrite => Self::ReadWriteData,
            DataClass::Uninit => Self::UninitData,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::ReadOnlyData => "read_only",
            Self::ReadWriteData => "read_write",
            Self::UninitData => "uninit",
        }
    }
}

impl Encode for ExportKind {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_u8(*self as u8);
    }
}

impl Decode for ExportKind {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let offset = r.offset();
        let tag = r.read_u8()?;
        Self::from_u8(tag).ok_or_else(|| invalid_tag("export kind", tag, offset))
    }
}

/// Internal item exposed under a public name.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ExportEntry {
    pub name: String,
    pub kind: ExportKind,
    /// Index into the table selected by `kind`.
    pub index: u32,
}

impl ExportEntry {
    pub fn function(name: &str, function: FunctionIndex) -> Self {
        Self {
            name: name.to_string(),
            kind: ExportKind::Function,
            index: function.0,
        }
    }
}

impl Encode for ExportEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_str(&self.name);
        self.kind.encode(w);
        w.write_varuint(u64::from(self.index));
    }
}

impl Decode for ExportEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let name = r.read_str()?.to_string();
        let kind = ExportKind::decode(r)?;
        let index = r.read_varuint_u32()?;
        Ok(Self { name, kind, index })
    }
}

/// Native function provided by an external shared library.
///
/// The library is named inline; there is no separate library table.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ExternalFunctionEntry {
    pub library: String,
    pub symbol: String,
    pub type_index: TypeIndex,
}

impl Encode for ExternalFunctionEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_str(&self.library);
        w.write_str(&self.symbol);
        w.write_varuint(u64::from(self.type_index.0));
    }
}

impl Decode for ExternalFunctionEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let library = r.read_str()?.to_string();
        let symbol = r.read_str()?.to_string();
        let type_index = TypeIndex(r.read_varuint_u32()?);
        Ok(Self {
            library,
            symbol,
            type_index,
        })
    }
}

impl Encode for FunctionIndex {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_varuint(u64::from(self.0));
    }
}

impl Decode for FunctionIndex {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self(r.read_varuint_u32()?))
    }
}

/// Module identity.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Property {
    pub module_name: String,
    #[serde(default)]
    pub module_version: ModuleVersion,
}

/// Semantic version of the module (not of the image format).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ModuleVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl std::fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Encode for ModuleVersion {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_varuint(u64::from(self.major));
        w.write_varuint(u64::from(self.minor));
        w.write_varuint(u64::from(self.patch));
    }
}

impl Decode for ModuleVersion {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            major: r.read_varuint_u32()?,
            minor: r.read_varuint_u32()?,
            patch: r.read_varuint_u32()?,
        })
    }
}

impl Encode for Property {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_str(&self.module_name);
        self.module_version.encode(w);
    }
}

impl Decode for Property {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let module_name = r.read_str()?.to_string();
        let module_version = ModuleVersion::decode(r)?;
        Ok(Self {
            module_name,
            module_version,
        })
    }
}

/// A module this image imports from, with the version it was built against.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ImportModuleEntry {
    pub name: String,
    #[serde(default)]
    pub version: ModuleVersion,
}

impl ImportModuleEntry {
    pub fn new(name: &str, version: ModuleVersion) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }
}

impl Encode for ImportModuleEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_str(&self.name);
        self.version.encode(w);
    }
}

impl Decode for ImportModuleEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let name = r.read_str()?.to_string();
        let version = ModuleVersion::decode(r)?;
        Ok(Self { name, version })
    }
}

/// Target of one public function index.
///
/// The public function space lists imported functions first (in Import
/// section order), then internal functions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FunctionIndexEntry {
    pub module: ModuleIndex,
    /// Index into the target module's Function section.
    pub function: FunctionIndex,
}

impl Encode for FunctionIndexEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_varuint(u64::from(self.module.0));
        w.write_varuint(u64::from(self.function.0));
    }
}

impl Decode for FunctionIndexEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let module = ModuleIndex(r.read_varuint_u32()?);
        let function = FunctionIndex(r.read_varuint_u32()?);
        Ok(Self { module, function })
    }
}

/// Target of one public data index.
///
/// The public data space lists imported data first (read-only, read-write,
/// then uninitialized, each in Import section order), then internal data in
/// the same class order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DataIndexEntry {
    pub module: ModuleIndex,
    pub class: DataClass,
    /// Index into the target module's section for `class`.
    pub index: u32,
}

impl Encode for DataIndexEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_varuint(u64::from(self.module.0));
        self.class.encode(w);
        w.write_varuint(u64::from(self.index));
    }
}

impl Decode for DataIndexEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let module = ModuleIndex(r.read_varuint_u32()?);
        let class = DataClass::decode(r)?;
        let index = r.read_varuint_u32()?;
        Ok(Self {
            module,
            class,
            index,
        })
    }
}

/// Position of one external function in the linked program's merged
/// external function table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ExternalFunctionIndexEntry {
    pub unified_index: u32,
}

impl Encode for ExternalFunctionIndexEntry {
    fn encode(&self, w: &mut ByteWriter) {
        w.write_varuint(u64::from(self.unified_index));
    }
}

impl Decode for ExternalFunctionIndexEntry {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            unified_index: r.read_varuint_u32()?,
        })
    }
}
