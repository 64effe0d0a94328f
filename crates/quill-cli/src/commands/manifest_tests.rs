use indoc::indoc;
use quill_format::{
    DataClass, DataIndex, DataSegment, ExportKind, FunctionIndex, FunctionIndexEntry, ImportKind,
    MemoryKind, ModuleIndex, TypeIndex, ValueKind,
};
use quill_image::BuildError;

use super::manifest::{Manifest, ManifestError, OpaqueSpec};

#[test]
fn empty_manifest_builds_empty_image() {
    let manifest = Manifest::from_json("{}").unwrap();
    assert_eq!(manifest, Manifest::default());

    let image = manifest.into_builder().unwrap().build();
    assert!(image.sections.is_empty());
}

#[test]
fn entries_use_serde_names() {
    let manifest = Manifest::from_json(indoc! {r#"
        {
          "types": [{ "params": ["i32", "f64"], "results": ["i64"] }],
          "data": [
            { "class": "read_write", "kind": "i32", "align": 4, "bytes": [7, 0, 0, 0] },
            { "class": "uninit", "kind": "bytes", "align": 16, "length": 256 }
          ],
          "imports": [
            { "module": "env", "name": "heap", "kind": { "type": "data", "class": "uninit", "kind": "bytes" } }
          ],
          "exports": [{ "name": "counter", "kind": "read_write_data", "index": 0 }],
          "opaque_sections": [{ "tag": 200 }]
        }
    "#})
    .unwrap();

    assert_eq!(manifest.types[0].params, [ValueKind::I32, ValueKind::F64]);
    assert_eq!(manifest.data[0].class(), DataClass::ReadWrite);
    assert!(matches!(manifest.data[1], DataSegment::Uninit(ref d) if d.length == 256));
    assert_eq!(
        manifest.imports[0].kind,
        ImportKind::Data {
            class: DataClass::Uninit,
            kind: MemoryKind::Bytes
        }
    );
    assert_eq!(manifest.exports[0].kind, ExportKind::ReadWriteData);
    assert_eq!(
        manifest.opaque_sections,
        [OpaqueSpec {
            tag: 200,
            bytes: vec![]
        }]
    );
}

#[test]
fn data_is_numbered_per_class() {
    let manifest = Manifest::from_json(indoc! {r#"
        {
          "data": [
            { "class": "read_only", "kind": "bytes", "align": 1, "bytes": [1] },
            { "class": "read_write", "kind": "bytes", "align": 1, "bytes": [2] },
            { "class": "read_only", "kind": "bytes", "align": 1, "bytes": [3] }
          ],
          "exports": [{ "name": "third", "kind": "read_only_data", "index": 1 }]
        }
    "#})
    .unwrap();

    let mut b = manifest.into_builder().unwrap();
    let next = b
        .add_data_segment(DataSegment::ReadOnly(quill_format::InitializedData {
            kind: MemoryKind::Bytes,
            align: 1,
            bytes: vec![4],
        }))
        .unwrap();
    assert_eq!(next, DataIndex::new(DataClass::ReadOnly, 2));

    let image = b.build();
    assert_eq!(image.read_only_data()[1].bytes, [3]);
    assert_eq!(image.read_write_data().len(), 1);
}

#[test]
fn unknown_field_is_rejected() {
    let err = Manifest::from_json(r#"{ "tables": [] }"#).unwrap_err();
    assert!(matches!(err, ManifestError::Json(_)));
    assert!(err.to_string().starts_with("invalid manifest: unknown field `tables`"));
}

#[test]
fn dangling_reference_is_a_build_error() {
    let manifest = Manifest::from_json(indoc! {r#"
        {
          "types": [{}],
          "imports": [{ "module": "env", "name": "f", "kind": { "type": "function", "type_index": 3 } }]
        }
    "#})
    .unwrap();

    assert_eq!(
        manifest.into_builder().unwrap_err(),
        BuildError::UnknownType(TypeIndex(3))
    );
}

#[test]
fn known_tag_cannot_be_opaque() {
    let manifest = Manifest::from_json(r#"{ "opaque_sections": [{ "tag": 16, "bytes": [] }] }"#)
        .unwrap();
    let err = manifest.to_image_bytes().unwrap_err();
    assert_eq!(
        err.to_string(),
        "section tag 0x10 belongs to a known section kind"
    );
}

#[test]
fn invalid_image_is_reported() {
    let manifest = Manifest::from_json(indoc! {r#"
        {
          "types": [{}],
          "local_variable_lists": [{}],
          "functions": [
            { "type_index": 0, "local_list_index": 0, "code": [] },
            { "type_index": 0, "local_list_index": 0, "code": [] }
          ]
        }
    "#})
    .unwrap();

    let err = manifest.to_image_bytes().unwrap_err();
    assert_eq!(
        err.to_string(),
        "manifest describes an invalid image: function section, entry 0: function has no bytecode"
    );
}

#[test]
fn index_sections_from_manifest() {
    let manifest = Manifest::from_json(indoc! {r#"
        {
          "types": [{}],
          "local_variable_lists": [{}],
          "functions": [{ "type_index": 0, "local_list_index": 0, "code": [1] }],
          "imports": [{ "module": "env", "name": "tick", "kind": { "type": "function", "type_index": 0 } }],
          "import_modules": [{ "name": "env", "version": { "major": 1, "minor": 0, "patch": 2 } }],
          "function_index": [
            { "module": 1, "function": 5 },
            { "module": 0, "function": 0 }
          ]
        }
    "#})
    .unwrap();

    let bytes = manifest.to_image_bytes().unwrap();
    let image = quill_image::parse(&bytes).unwrap();
    assert_eq!(image.import_modules()[0].version.patch, 2);
    assert_eq!(
        image.function_index()[0],
        FunctionIndexEntry {
            module: ModuleIndex(1),
            function: FunctionIndex(5),
        }
    );
}

#[test]
fn index_entry_for_undeclared_module_is_a_build_error() {
    let manifest = Manifest::from_json(indoc! {r#"
        {
          "data_index": [{ "module": 1, "class": "read_only", "index": 0 }]
        }
    "#})
    .unwrap();

    let err = manifest.to_image_bytes().unwrap_err();
    assert_eq!(err.to_string(), "module index 1 was never assigned");
}
