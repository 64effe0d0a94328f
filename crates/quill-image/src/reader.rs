//! Decode-then-validate entry point.

use quill_format::{Image, Limits};

use crate::validate::{validate, validate_all};
use crate::{Error, Result};

/// Reader configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub limits: Limits,
    /// Keep every finding of the failing validation class instead of only
    /// the first one.
    pub diagnostics: bool,
}

/// Parses images with fixed options. Holds no per-call state.
#[derive(Clone, Debug, Default)]
pub struct ImageReader {
    options: ReadOptions,
}

impl ImageReader {
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Decode and validate an image.
    pub fn parse(&self, bytes: &[u8]) -> Result<Image> {
        let image = Image::deserialize(bytes, &self.options.limits).inspect_err(|e| {
            tracing::debug!(error = %e, "image decode failed");
        })?;

        let checked = if self.options.diagnostics {
            validate_all(&image)
        } else {
            validate(&image)
        };
        if let Err(findings) = checked {
            tracing::debug!(findings = findings.len(), first = %findings.first(), "image rejected");
            return Err(Error::Invalid(findings));
        }

        tracing::debug!(
            bytes = bytes.len(),
            sections = image.sections.len(),
            version = %image.version,
            "parsed image"
        );
        Ok(image)
    }
}

/// Decode and validate an image with default options.
pub fn parse(bytes: &[u8]) -> Result<Image> {
    ImageReader::default().parse(bytes)
}
