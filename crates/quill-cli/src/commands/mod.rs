pub mod build;
pub mod check;
pub mod dump;
pub mod image_file;
pub mod manifest;

#[cfg(test)]
mod manifest_tests;
