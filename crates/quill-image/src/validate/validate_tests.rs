use quill_format::{
    DataClass, DataIndexEntry, ExportEntry, ExportKind, ExternalFunctionIndexEntry,
    FunctionEntry, FunctionIndex, FunctionIndexEntry, Image, ImportEntry, ImportModuleEntry,
    InitializedData, KnownSection, LocalListIndex, LocalVariable, LocalVariableList, MemoryKind,
    ModuleIndex, ModuleVersion, OpaqueSection, SectionKind, TypeEntry, TypeIndex, UninitData,
    ValueKind,
};

use super::{Finding, Reason, StartProblem, validate, validate_all};

fn function(type_index: u32, code: &[u8]) -> FunctionEntry {
    FunctionEntry::new(TypeIndex(type_index), LocalListIndex(0), code.to_vec())
}

/// One unit type, one local list, one function.
fn base() -> Image {
    let mut image = Image::new();
    image.push(KnownSection::Type(vec![
        TypeEntry::default(),
        TypeEntry::new(vec![ValueKind::I32], vec![]),
    ]));
    image.push(KnownSection::Function(vec![function(0, &[0x01])]));
    image.push(KnownSection::LocalVariableList(vec![
        LocalVariableList::default(),
    ]));
    image
}

fn findings(image: &Image) -> Vec<Finding> {
    validate_all(image).unwrap_err().into_vec()
}

fn reasons(image: &Image) -> Vec<Reason> {
    findings(image).into_iter().map(|f| f.reason).collect()
}

#[test]
fn valid_image_passes() {
    assert_eq!(validate(&base()), Ok(()));
    assert_eq!(validate(&Image::new()), Ok(()));
}

#[test]
fn duplicate_section_masks_later_classes() {
    let mut image = base();
    image.push(KnownSection::Type(vec![]));
    // Would be an index error if validation got that far.
    image.push(KnownSection::StartFunction(vec![FunctionIndex(9)]));

    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::Type,
            None,
            Reason::DuplicateSection
        )]
    );
}

#[test]
fn duplicate_unknown_sections() {
    let mut image = Image::new();
    for _ in 0..2 {
        image.push(OpaqueSection {
            tag: 0x7f,
            bytes: vec![],
        });
    }
    assert_eq!(
        findings(&image)[0].section,
        SectionKind::Unknown(0x7f)
    );
}

#[test]
fn function_type_one_past_end() {
    let mut image = Image::new();
    image.push(KnownSection::Type(vec![TypeEntry::default()]));
    image.push(KnownSection::LocalVariableList(vec![
        LocalVariableList::default(),
    ]));
    image.push(KnownSection::Function(vec![function(1, &[0x01])]));

    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::Function,
            Some(0),
            Reason::InvalidIndex {
                target: SectionKind::Type,
                index: 1,
                len: 1
            }
        )]
    );
}

#[test]
fn index_findings_accumulate_within_class() {
    let mut image = Image::new();
    image.push(KnownSection::Function(vec![function(0, &[0x01])]));
    image.push(KnownSection::Import(vec![ImportEntry::function(
        "env",
        "f",
        TypeIndex(4),
    )]));
    image.push(KnownSection::Export(vec![ExportEntry {
        name: "blob".to_string(),
        kind: ExportKind::ReadOnlyData,
        index: 0,
    }]));

    let all = findings(&image);
    let targets: Vec<_> = all
        .iter()
        .map(|f| match f.reason {
            Reason::InvalidIndex { target, .. } => (f.section, target),
            _ => panic!("unexpected {f}"),
        })
        .collect();
    assert_eq!(
        targets,
        [
            (SectionKind::Function, SectionKind::Type),
            (SectionKind::Function, SectionKind::LocalVariableList),
            (SectionKind::Import, SectionKind::Type),
            (SectionKind::Export, SectionKind::ReadOnlyData),
        ]
    );

    let first = validate(&image).unwrap_err();
    assert_eq!(first.len(), 1);
    assert_eq!(first.first(), &all[0]);
}

#[test]
fn export_targets_use_their_own_table() {
    let mut image = base();
    image.push(KnownSection::UninitData(vec![UninitData {
        kind: MemoryKind::Bytes,
        align: 8,
        length: 32,
    }]));
    image.push(KnownSection::Export(vec![
        ExportEntry {
            name: "heap".to_string(),
            kind: ExportKind::UninitData,
            index: 0,
        },
        ExportEntry {
            name: "rw".to_string(),
            kind: ExportKind::ReadWriteData,
            index: 0,
        },
    ]));

    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::Export,
            Some(1),
            Reason::InvalidIndex {
                target: SectionKind::ReadWriteData,
                index: 0,
                len: 0
            }
        )]
    );
}

#[test]
fn start_index_out_of_bounds() {
    let mut image = base();
    image.push(KnownSection::StartFunction(vec![FunctionIndex(1)]));
    assert_eq!(
        reasons(&image),
        [Reason::InvalidIndex {
            target: SectionKind::Function,
            index: 1,
            len: 1
        }]
    );
}

#[test]
fn export_names_are_unique_per_namespace() {
    let mut image = base();
    image.push(KnownSection::ReadOnlyData(vec![InitializedData {
        kind: MemoryKind::Bytes,
        align: 1,
        bytes: vec![0],
    }]));
    image.push(KnownSection::Export(vec![
        ExportEntry::function("main", FunctionIndex(0)),
        ExportEntry {
            name: "main".to_string(),
            kind: ExportKind::ReadOnlyData,
            index: 0,
        },
        ExportEntry::function("main", FunctionIndex(0)),
    ]));

    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::Export,
            Some(2),
            Reason::DuplicateExportName {
                name: "main".to_string()
            }
        )]
    );
}

#[test]
fn imports_may_repeat() {
    let mut image = base();
    image.push(KnownSection::Import(vec![
        ImportEntry::function("env", "print", TypeIndex(0)),
        ImportEntry::function("env", "print", TypeIndex(1)),
    ]));
    assert_eq!(validate(&image), Ok(()));
}

#[test]
fn empty_bytecode() {
    let mut image = base();
    image.sections[1] = KnownSection::Function(vec![function(0, &[0x01]), function(0, &[])]).into();
    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::Function,
            Some(1),
            Reason::EmptyBytecode
        )]
    );
}

#[test]
fn alignment_must_be_power_of_two() {
    let mut image = base();
    image.sections[2] = KnownSection::LocalVariableList(vec![LocalVariableList::new(vec![
        LocalVariable::scalar(ValueKind::I32),
        LocalVariable::bytes(8, 0),
    ])])
    .into();
    image.push(KnownSection::ReadWriteData(vec![
        InitializedData {
            kind: MemoryKind::I32,
            align: 4,
            bytes: vec![0; 4],
        },
        InitializedData {
            kind: MemoryKind::Bytes,
            align: 3,
            bytes: vec![0; 3],
        },
    ]));

    assert_eq!(
        findings(&image),
        [
            Finding::new(
                SectionKind::LocalVariableList,
                Some(0),
                Reason::InvalidVariableAlignment {
                    variable: 1,
                    align: 0
                }
            ),
            Finding::new(
                SectionKind::ReadWriteData,
                Some(1),
                Reason::InvalidAlignment { align: 3 }
            ),
        ]
    );
}

#[test]
fn variable_alignment_names_the_variable() {
    let finding = Finding::new(
        SectionKind::LocalVariableList,
        Some(0),
        Reason::InvalidVariableAlignment {
            variable: 1,
            align: 0,
        },
    );
    insta::assert_snapshot!(finding, @"local_variable section, entry 0: variable 1: invalid alignment 0");
}

#[test]
fn start_section_must_name_one_function() {
    let mut image = base();
    image.push(KnownSection::StartFunction(vec![]));
    assert_eq!(
        reasons(&image),
        [Reason::InvalidStartFunction(StartProblem::Count(0))]
    );

    let mut image = base();
    image.push(KnownSection::StartFunction(vec![
        FunctionIndex(0),
        FunctionIndex(0),
    ]));
    assert_eq!(
        reasons(&image),
        [Reason::InvalidStartFunction(StartProblem::Count(2))]
    );
}

#[test]
fn start_function_signature() {
    let mut image = base();
    image.sections[1] = KnownSection::Function(vec![function(1, &[0x01])]).into();
    image.push(KnownSection::StartFunction(vec![FunctionIndex(0)]));
    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::StartFunction,
            Some(0),
            Reason::InvalidStartFunction(StartProblem::Signature)
        )]
    );

    let mut image = base();
    image.push(KnownSection::StartFunction(vec![FunctionIndex(0)]));
    assert_eq!(validate(&image), Ok(()));
}

#[test]
fn finding_display() {
    let finding = Finding::new(
        SectionKind::Function,
        Some(3),
        Reason::InvalidIndex {
            target: SectionKind::Type,
            index: 7,
            len: 2,
        },
    );
    assert_eq!(
        finding.to_string(),
        "function section, entry 3: type index 7 out of bounds (table has 2 entries)"
    );

    let finding = Finding::new(SectionKind::Type, None, Reason::DuplicateSection);
    assert_eq!(finding.to_string(), "type section: duplicate section");
}

#[test]
fn findings_display_mentions_the_rest() {
    let mut image = base();
    image.sections[1] = KnownSection::Function(vec![function(0, &[]), function(0, &[])]).into();

    let all = validate_all(&image).unwrap_err();
    insta::assert_snapshot!(all, @"function section, entry 0: function has no bytecode (and 1 more)");

    let first = validate(&image).unwrap_err();
    insta::assert_snapshot!(first, @"function section, entry 0: function has no bytecode");
}

fn env_module() -> ImportModuleEntry {
    ImportModuleEntry::new("env", ModuleVersion::default())
}

/// `base()` plus one imported function from `env` and a matching
/// function-index section.
fn linked() -> Image {
    let mut image = base();
    image.push(KnownSection::Import(vec![ImportEntry::function(
        "env",
        "print",
        TypeIndex(1),
    )]));
    image.push(KnownSection::ImportModule(vec![env_module()]));
    image.push(KnownSection::FunctionIndex(vec![
        FunctionIndexEntry {
            module: ModuleIndex(1),
            function: FunctionIndex(12),
        },
        FunctionIndexEntry {
            module: ModuleIndex::LOCAL,
            function: FunctionIndex(0),
        },
    ]));
    image
}

#[test]
fn linked_image_passes() {
    assert_eq!(validate(&linked()), Ok(()));
}

#[test]
fn index_entries_check_module_and_local_target() {
    let mut image = linked();
    image.sections[5] = KnownSection::FunctionIndex(vec![
        FunctionIndexEntry {
            module: ModuleIndex(2),
            function: FunctionIndex(0),
        },
        FunctionIndexEntry {
            module: ModuleIndex::LOCAL,
            function: FunctionIndex(1),
        },
    ])
    .into();

    assert_eq!(
        findings(&image),
        [
            Finding::new(
                SectionKind::FunctionIndex,
                Some(0),
                Reason::InvalidModule {
                    module: 2,
                    count: 1
                }
            ),
            Finding::new(
                SectionKind::FunctionIndex,
                Some(1),
                Reason::InvalidIndex {
                    target: SectionKind::Function,
                    index: 1,
                    len: 1
                }
            ),
        ]
    );
}

#[test]
fn data_index_targets_their_class_table() {
    let mut image = base();
    image.push(KnownSection::UninitData(vec![UninitData {
        kind: MemoryKind::I32,
        align: 4,
        length: 4,
    }]));
    image.push(KnownSection::DataIndex(vec![DataIndexEntry {
        module: ModuleIndex::LOCAL,
        class: DataClass::ReadOnly,
        index: 0,
    }]));

    assert_eq!(
        reasons(&image),
        [Reason::InvalidIndex {
            target: SectionKind::ReadOnlyData,
            index: 0,
            len: 0
        }]
    );

    image.sections[4] = KnownSection::DataIndex(vec![DataIndexEntry {
        module: ModuleIndex::LOCAL,
        class: DataClass::Uninit,
        index: 0,
    }])
    .into();
    assert_eq!(validate(&image), Ok(()));
}

#[test]
fn index_sections_cover_their_index_space() {
    let mut image = linked();
    image.sections[5] = KnownSection::FunctionIndex(vec![FunctionIndexEntry {
        module: ModuleIndex::LOCAL,
        function: FunctionIndex(0),
    }])
    .into();
    image.push(KnownSection::ExternalFunctionIndex(vec![
        ExternalFunctionIndexEntry { unified_index: 0 },
    ]));

    assert_eq!(
        findings(&image),
        [
            Finding::new(
                SectionKind::FunctionIndex,
                None,
                Reason::IndexTableLength {
                    expected: 2,
                    actual: 1
                }
            ),
            Finding::new(
                SectionKind::ExternalFunctionIndex,
                None,
                Reason::IndexTableLength {
                    expected: 0,
                    actual: 1
                }
            ),
        ]
    );
}

#[test]
fn imports_must_name_declared_modules() {
    let mut image = linked();
    image.sections[3] = KnownSection::Import(vec![ImportEntry::function(
        "io",
        "print",
        TypeIndex(1),
    )])
    .into();
    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::Import,
            Some(0),
            Reason::UndeclaredModule {
                name: "io".to_string()
            }
        )]
    );

    // Without an import_module section any module name goes.
    let mut image = base();
    image.push(KnownSection::Import(vec![ImportEntry::function(
        "io",
        "print",
        TypeIndex(1),
    )]));
    assert_eq!(validate(&image), Ok(()));
}

#[test]
fn import_module_names_are_unique() {
    let mut image = linked();
    image.sections[4] = KnownSection::ImportModule(vec![env_module(), env_module()]).into();
    assert_eq!(
        findings(&image),
        [Finding::new(
            SectionKind::ImportModule,
            Some(1),
            Reason::DuplicateModuleName {
                name: "env".to_string()
            }
        )]
    );
}
