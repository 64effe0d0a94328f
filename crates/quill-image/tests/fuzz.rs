//! Property tests: the reader must never panic, whatever the input.

use proptest::prelude::*;
use quill_format::{
    FunctionEntry, LocalListIndex, LocalVariableList, TypeEntry, TypeIndex, ValueKind,
};
use quill_image::{ImageBuilder, parse};

const HEADER: &[u8] = b"QUILLIMG\x01\x00\x00\x00";

fn value_kind() -> impl Strategy<Value = ValueKind> {
    prop_oneof![
        Just(ValueKind::I32),
        Just(ValueKind::I64),
        Just(ValueKind::F32),
        Just(ValueKind::F64),
    ]
}

fn type_entry() -> impl Strategy<Value = TypeEntry> {
    (
        prop::collection::vec(value_kind(), 0..4),
        prop::collection::vec(value_kind(), 0..2),
    )
        .prop_map(|(params, results)| TypeEntry::new(params, results))
}

fn sample_image() -> Vec<u8> {
    let mut b = ImageBuilder::new();
    let t = b.add_type(TypeEntry::default()).unwrap();
    let l = b
        .add_local_variable_list(LocalVariableList::default())
        .unwrap();
    b.add_function(FunctionEntry::new(t, l, vec![1, 2, 3]))
        .unwrap();
    b.add_opaque_section(0x70, vec![4, 5]).unwrap();
    b.finish()
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = parse(&bytes);
    }

    #[test]
    fn arbitrary_sections_never_panic(body in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&body);
        let _ = parse(&bytes);
    }

    #[test]
    fn single_byte_corruption_never_panics(pos in any::<prop::sample::Index>(), byte in any::<u8>()) {
        let mut bytes = sample_image();
        let i = pos.index(bytes.len());
        bytes[i] = byte;
        let _ = parse(&bytes);
    }

    #[test]
    fn built_tables_round_trip(
        types in prop::collection::vec(type_entry(), 1..8),
        code in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..32), 0..8),
    ) {
        let mut b = ImageBuilder::new();
        for t in &types {
            b.add_type(t.clone()).unwrap();
        }
        b.add_local_variable_list(LocalVariableList::default()).unwrap();
        for (i, blob) in code.iter().enumerate() {
            let type_index = TypeIndex((i % types.len()) as u32);
            b.add_function(FunctionEntry::new(type_index, LocalListIndex(0), blob.clone()))
                .unwrap();
        }

        let image = b.build();
        let parsed = parse(&image.serialize()).unwrap();
        prop_assert_eq!(parsed.types(), types.as_slice());
        prop_assert_eq!(parsed.functions().len(), code.len());
        prop_assert_eq!(parsed, image);
    }
}
