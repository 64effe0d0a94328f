//! Incremental image builder.
//!
//! Every `add_*` appends to one table and returns the new entry's index,
//! counting up from 0 per table. References are checked against indices the
//! builder has already handed out; anything else is a [`BuildError`].
//! The builder does not run the validator.

use quill_format::{
    DataClass, DataIndex, DataIndexEntry, DataSegment, ExportEntry, ExportIndex, ExportKind,
    ExternalFunctionEntry, ExternalFunctionIndexEntry, ExternalIndex, FunctionEntry,
    FunctionIndex, FunctionIndexEntry, Image, ImportEntry, ImportIndex, ImportKind,
    ImportModuleEntry, InitializedData, KnownSection, LocalListIndex, LocalVariableList,
    ModuleIndex, OpaqueSection, Property, Section, SectionKind, TypeEntry, TypeIndex, UninitData,
    Version,
};

/// Programmer error while building an image.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("type index {0} was never assigned")]
    UnknownType(TypeIndex),
    #[error("local variable list index {0} was never assigned")]
    UnknownLocalList(LocalListIndex),
    #[error("function index {0} was never assigned")]
    UnknownFunction(FunctionIndex),
    #[error("{class} data index {index} was never assigned")]
    UnknownData { class: DataClass, index: u32 },
    #[error("module index {0} was never assigned")]
    UnknownModule(ModuleIndex),
    #[error("external function index {0} was never assigned")]
    UnknownExternal(ExternalIndex),
    /// The table already holds `u32::MAX + 1` entries.
    #[error("too many entries in the {0} section")]
    TooManyEntries(SectionKind),
    /// Opaque sections must use a tag no known kind claims.
    #[error("section tag {0:#04x} belongs to a known section kind")]
    ReservedTag(u8),
}

fn next_index(len: usize, kind: SectionKind) -> Result<u32, BuildError> {
    u32::try_from(len).map_err(|_| BuildError::TooManyEntries(kind))
}

#[derive(Debug, Default)]
pub struct ImageBuilder {
    version: Version,
    property: Option<Property>,
    types: Vec<TypeEntry>,
    functions: Vec<FunctionEntry>,
    local_lists: Vec<LocalVariableList>,
    read_only: Vec<InitializedData>,
    read_write: Vec<InitializedData>,
    uninit: Vec<UninitData>,
    imports: Vec<ImportEntry>,
    exports: Vec<ExportEntry>,
    externals: Vec<ExternalFunctionEntry>,
    start: Option<FunctionIndex>,
    import_modules: Vec<ImportModuleEntry>,
    function_index: Vec<FunctionIndexEntry>,
    data_index: Vec<DataIndexEntry>,
    external_index: Vec<ExternalFunctionIndexEntry>,
    opaque: Vec<OpaqueSection>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue building from a decoded image.
    ///
    /// Tables pick up where the image left off, so new entries get indices
    /// after the existing ones. Opaque sections are carried through unchanged.
    ///
    /// Trailing payload bytes of known sections cannot follow entries into
    /// merged tables. When the image has any, they are dropped and the built
    /// image is marked with [`Version::CURRENT`] instead of the image's own
    /// version.
    pub fn from_image(image: Image) -> Self {
        let mut b = Self {
            version: image.version,
            ..Self::default()
        };
        for section in image.sections {
            match section {
                Section::Known { section, trailing } => {
                    if !trailing.is_empty() {
                        tracing::debug!(
                            section = %section.kind(),
                            dropped = trailing.len(),
                            "dropping trailing payload bytes"
                        );
                        b.version = Version::CURRENT;
                    }
                    b.absorb(section);
                }
                Section::Opaque(opaque) => b.opaque.push(opaque),
            }
        }
        b
    }

    fn absorb(&mut self, section: KnownSection) {
        match section {
            KnownSection::Property(p) => self.property = Some(p),
            KnownSection::Type(v) => self.types.extend(v),
            KnownSection::Function(v) => self.functions.extend(v),
            KnownSection::LocalVariableList(v) => self.local_lists.extend(v),
            KnownSection::ReadOnlyData(v) => self.read_only.extend(v),
            KnownSection::ReadWriteData(v) => self.read_write.extend(v),
            KnownSection::UninitData(v) => self.uninit.extend(v),
            KnownSection::Import(v) => self.imports.extend(v),
            KnownSection::Export(v) => self.exports.extend(v),
            KnownSection::ExternalFunction(v) => self.externals.extend(v),
            KnownSection::StartFunction(v) => self.start = v.first().copied(),
            KnownSection::ImportModule(v) => self.import_modules.extend(v),
            KnownSection::FunctionIndex(v) => self.function_index.extend(v),
            KnownSection::DataIndex(v) => self.data_index.extend(v),
            KnownSection::ExternalFunctionIndex(v) => self.external_index.extend(v),
        }
    }

    /// Module 0 always resolves; others must name an added import module.
    fn require_module(&self, module: ModuleIndex) -> Result<(), BuildError> {
        match module.import_module() {
            Some(position) if position >= self.import_modules.len() => {
                Err(BuildError::UnknownModule(module))
            }
            _ => Ok(()),
        }
    }

    fn require_type(&self, index: TypeIndex) -> Result<(), BuildError> {
        if index.as_usize() < self.types.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownType(index))
        }
    }

    fn require_function(&self, index: FunctionIndex) -> Result<(), BuildError> {
        if index.as_usize() < self.functions.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownFunction(index))
        }
    }

    fn data_len(&self, class: DataClass) -> usize {
        match class {
            DataClass::ReadOnly => self.read_only.len(),
            DataClass::ReadWrite => self.read_write.len(),
            DataClass::Uninit => self.uninit.len(),
        }
    }

    pub fn set_property(&mut self, property: Property) {
        self.property = Some(property);
    }

    pub fn add_type(&mut self, entry: TypeEntry) -> Result<TypeIndex, BuildError> {
        let index = next_index(self.types.len(), SectionKind::Type)?;
        self.types.push(entry);
        Ok(TypeIndex(index))
    }

    pub fn add_local_variable_list(
        &mut self,
        list: LocalVariableList,
    ) -> Result<LocalListIndex, BuildError> {
        let index = next_index(self.local_lists.len(), SectionKind::LocalVariableList)?;
        self.local_lists.push(list);
        Ok(LocalListIndex(index))
    }

    pub fn add_function(&mut self, entry: FunctionEntry) -> Result<FunctionIndex, BuildError> {
        self.require_type(entry.type_index)?;
        if entry.local_list_index.as_usize() >= self.local_lists.len() {
            return Err(BuildError::UnknownLocalList(entry.local_list_index));
        }
        let index = next_index(self.functions.len(), SectionKind::Function)?;
        self.functions.push(entry);
        Ok(FunctionIndex(index))
    }

    pub fn add_data_segment(&mut self, segment: DataSegment) -> Result<DataIndex, BuildError> {
        let class = segment.class();
        let index = match segment {
            DataSegment::ReadOnly(d) => {
                let index = next_index(self.read_only.len(), SectionKind::ReadOnlyData)?;
                self.read_only.push(d);
                index
            }
            DataSegment::ReadWrite(d) => {
                let index = next_index(self.read_write.len(), SectionKind::ReadWriteData)?;
                self.read_write.push(d);
                index
            }
            DataSegment::Uninit(d) => {
                let index = next_index(self.uninit.len(), SectionKind::UninitData)?;
                self.uninit.push(d);
                index
            }
        };
        Ok(DataIndex::new(class, index))
    }

    pub fn add_import(&mut self, entry: ImportEntry) -> Result<ImportIndex, BuildError> {
        if let ImportKind::Function { type_index } = entry.kind {
            self.require_type(type_index)?;
        }
        let index = next_index(self.imports.len(), SectionKind::Import)?;
        self.imports.push(entry);
        Ok(ImportIndex(index))
    }

    /// Export an internal item. Name clashes are left to the validator.
    pub fn add_export(&mut self, entry: ExportEntry) -> Result<ExportIndex, BuildError> {
        match entry.kind.data_class() {
            None => self.require_function(FunctionIndex(entry.index))?,
            Some(class) => {
                if entry.index as usize >= self.data_len(class) {
                    return Err(BuildError::UnknownData {
                        class,
                        index: entry.index,
                    });
                }
            }
        }
        let index = next_index(self.exports.len(), SectionKind::Export)?;
        self.exports.push(entry);
        Ok(ExportIndex(index))
    }

    /// Export a data segment under `name`.
    pub fn export_data(&mut self, name: &str, data: DataIndex) -> Result<ExportIndex, BuildError> {
        self.add_export(ExportEntry {
            name: name.to_string(),
            kind: ExportKind::for_data(data.class),
            index: data.index,
        })
    }

    pub fn add_external_function(
        &mut self,
        entry: ExternalFunctionEntry,
    ) -> Result<ExternalIndex, BuildError> {
        self.require_type(entry.type_index)?;
        let index = next_index(self.externals.len(), SectionKind::ExternalFunction)?;
        self.externals.push(entry);
        Ok(ExternalIndex(index))
    }

    /// Declare a module the imports come from.
    ///
    /// Returns the module's index in the module space of the index sections,
    /// which starts at 1.
    pub fn add_import_module(
        &mut self,
        entry: ImportModuleEntry,
    ) -> Result<ModuleIndex, BuildError> {
        let module = next_index(self.import_modules.len() + 1, SectionKind::ImportModule)?;
        self.import_modules.push(entry);
        Ok(ModuleIndex(module))
    }

    /// Map the next public function index. Returns that public index.
    ///
    /// Targets in other modules are checked only for the module.
    pub fn add_function_index(&mut self, entry: FunctionIndexEntry) -> Result<u32, BuildError> {
        self.require_module(entry.module)?;
        if entry.module.is_local() {
            self.require_function(entry.function)?;
        }
        let index = next_index(self.function_index.len(), SectionKind::FunctionIndex)?;
        self.function_index.push(entry);
        Ok(index)
    }

    /// Map the next public data index. Returns that public index.
    pub fn add_data_index(&mut self, entry: DataIndexEntry) -> Result<u32, BuildError> {
        self.require_module(entry.module)?;
        if entry.module.is_local() && entry.index as usize >= self.data_len(entry.class) {
            return Err(BuildError::UnknownData {
                class: entry.class,
                index: entry.index,
            });
        }
        let index = next_index(self.data_index.len(), SectionKind::DataIndex)?;
        self.data_index.push(entry);
        Ok(index)
    }

    /// Record where the next external function lands in the merged external
    /// function table. Entries pair up with external functions by position.
    pub fn add_external_function_index(
        &mut self,
        entry: ExternalFunctionIndexEntry,
    ) -> Result<ExternalIndex, BuildError> {
        let external = ExternalIndex(next_index(
            self.external_index.len(),
            SectionKind::ExternalFunctionIndex,
        )?);
        if external.as_usize() >= self.externals.len() {
            return Err(BuildError::UnknownExternal(external));
        }
        self.external_index.push(entry);
        Ok(external)
    }

    /// Set (or replace) the start function.
    pub fn set_start_function(&mut self, function: FunctionIndex) -> Result<(), BuildError> {
        self.require_function(function)?;
        self.start = Some(function);
        Ok(())
    }

    /// Carry a section this builder does not understand.
    pub fn add_opaque_section(&mut self, tag: u8, bytes: Vec<u8>) -> Result<(), BuildError> {
        if SectionKind::from_tag(tag).is_known() {
            return Err(BuildError::ReservedTag(tag));
        }
        self.opaque.push(OpaqueSection { tag, bytes });
        Ok(())
    }

    /// Assemble the image. Empty tables are omitted.
    pub fn build(self) -> Image {
        let mut image = Image {
            version: self.version,
            sections: Vec::new(),
        };

        if let Some(property) = self.property {
            image.push(KnownSection::Property(property));
        }
        let tables = [
            KnownSection::Type(self.types),
            KnownSection::Function(self.functions),
            KnownSection::LocalVariableList(self.local_lists),
            KnownSection::ReadOnlyData(self.read_only),
            KnownSection::ReadWriteData(self.read_write),
            KnownSection::UninitData(self.uninit),
            KnownSection::Import(self.imports),
            KnownSection::Export(self.exports),
            KnownSection::ImportModule(self.import_modules),
            KnownSection::ExternalFunction(self.externals),
        ];
        for table in tables {
            if !table.is_empty() {
                image.push(table);
            }
        }
        if let Some(start) = self.start {
            image.push(KnownSection::StartFunction(vec![start]));
        }
        let index_tables = [
            KnownSection::FunctionIndex(self.function_index),
            KnownSection::DataIndex(self.data_index),
            KnownSection::ExternalFunctionIndex(self.external_index),
        ];
        for table in index_tables {
            if !table.is_empty() {
                image.push(table);
            }
        }
        for opaque in self.opaque {
            image.push(opaque);
        }

        tracing::debug!(sections = image.sections.len(), "built image");
        image
    }

    /// Assemble and serialize the image.
    pub fn finish(self) -> Vec<u8> {
        self.build().serialize()
    }
}
