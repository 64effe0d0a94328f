//! Index newtypes for cross-table references.
//!
//! Entries never point at each other directly; they hold one of these
//! indices into the owning image's tables.

use serde::{Deserialize, Serialize};

use crate::entries::DataClass;

macro_rules! table_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn get(self) -> u32 {
                self.0
            }

            #[inline]
            pub fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

table_index!(
    /// Index into the Type section.
    TypeIndex
);
table_index!(
    /// Index into the Function section (internal functions only).
    FunctionIndex
);
table_index!(
    /// Index into the Local-variable-list section.
    LocalListIndex
);
table_index!(
    /// Index into the Import section.
    ImportIndex
);
table_index!(
    /// Index into the Export section.
    ExportIndex
);
table_index!(
    /// Index into the External-function section.
    ExternalIndex
);
table_index!(
    /// Module space of the index sections: 0 is the image itself, `k` is
    /// entry `k - 1` of the Import-module section.
    ModuleIndex
);

impl ModuleIndex {
    /// The image holding the index section.
    pub const LOCAL: Self = Self(0);

    pub fn is_local(self) -> bool {
        self.0 == 0
    }

    /// Position in the Import-module section, for non-local modules.
    pub fn import_module(self) -> Option<usize> {
        self.as_usize().checked_sub(1)
    }

    /// Module index of Import-module entry `position`.
    pub fn of_import_module(position: u32) -> Self {
        Self(position.saturating_add(1))
    }
}

/// Index of a data segment within its class's section.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DataIndex {
    pub class: DataClass,
    pub index: u32,
}

impl DataIndex {
    pub fn new(class: DataClass, index: u32) -> Self {
        Self { class, index }
    }
}
