//! JSON description of an image, fed to [`ImageBuilder`].
//!
//! Tables are listed in index order: the n-th entry of `types` becomes type
//! index n, and so on. Data segments share one list and are numbered per
//! class. The n-th entry of `import_modules` is module n + 1 in the index
//! sections.

use std::path::{Path, PathBuf};

use quill_format::{
    DataIndexEntry, DataSegment, ExportEntry, ExternalFunctionEntry, ExternalFunctionIndexEntry,
    FunctionEntry, FunctionIndex, FunctionIndexEntry, ImportEntry, ImportModuleEntry,
    LocalVariableList, Property, TypeEntry,
};
use quill_image::{BuildError, Findings, ImageBuilder};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("manifest describes an invalid image: {0}")]
    Invalid(Findings),
}

/// Section the format does not interpret, copied into the image as-is.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpaqueSpec {
    pub tag: u8,
    #[serde(default)]
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub property: Option<Property>,
    pub types: Vec<TypeEntry>,
    pub local_variable_lists: Vec<LocalVariableList>,
    pub functions: Vec<FunctionEntry>,
    pub data: Vec<DataSegment>,
    pub imports: Vec<ImportEntry>,
    pub external_functions: Vec<ExternalFunctionEntry>,
    pub exports: Vec<ExportEntry>,
    pub start_function: Option<FunctionIndex>,
    pub import_modules: Vec<ImportModuleEntry>,
    pub function_index: Vec<FunctionIndexEntry>,
    pub data_index: Vec<DataIndexEntry>,
    pub external_function_index: Vec<ExternalFunctionIndexEntry>,
    pub opaque_sections: Vec<OpaqueSpec>,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Feed every table to a fresh builder, dependencies first.
    pub fn into_builder(self) -> Result<ImageBuilder, BuildError> {
        let mut b = ImageBuilder::new();
        if let Some(property) = self.property {
            b.set_property(property);
        }
        for entry in self.types {
            b.add_type(entry)?;
        }
        for list in self.local_variable_lists {
            b.add_local_variable_list(list)?;
        }
        for entry in self.functions {
            b.add_function(entry)?;
        }
        for segment in self.data {
            b.add_data_segment(segment)?;
        }
        for entry in self.imports {
            b.add_import(entry)?;
        }
        for entry in self.external_functions {
            b.add_external_function(entry)?;
        }
        for entry in self.exports {
            b.add_export(entry)?;
        }
        if let Some(start) = self.start_function {
            b.set_start_function(start)?;
        }
        for entry in self.import_modules {
            b.add_import_module(entry)?;
        }
        for entry in self.function_index {
            b.add_function_index(entry)?;
        }
        for entry in self.data_index {
            b.add_data_index(entry)?;
        }
        for entry in self.external_function_index {
            b.add_external_function_index(entry)?;
        }
        for section in self.opaque_sections {
            b.add_opaque_section(section.tag, section.bytes)?;
        }
        Ok(b)
    }

    /// Build, validate and serialize the described image.
    pub fn to_image_bytes(self) -> Result<Vec<u8>, ManifestError> {
        let image = self.into_builder()?.build();
        quill_image::validate(&image).map_err(ManifestError::Invalid)?;
        Ok(image.serialize())
    }
}
