//! Build, validate and read Quill application images.
//!
//! - [`ImageBuilder`]: assigns table indices and serializes
//! - [`validate`]: structural and referential checks
//! - [`parse`] / [`ImageReader`]: decode followed by validation

pub mod builder;
pub mod reader;
pub mod validate;


pub use builder::{BuildError, ImageBuilder};
pub use quill_format::{DecodeError, Image, Limits};
pub use reader::{ImageReader, ReadOptions, parse};
pub use validate::{Finding, Findings, Reason, StartProblem, validate, validate_all};

/// Errors from reading an image.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The bytes are not a well-formed image.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The image decoded but failed validation.
    #[error("invalid image: {0}")]
    Invalid(Findings),
}

impl Error {
    /// Validation findings, when the image decoded.
    pub fn findings(&self) -> Option<&Findings> {
        match self {
            Self::Invalid(findings) => Some(findings),
            Self::Decode(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
