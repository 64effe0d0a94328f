//! Shared argument builders for CLI commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Image file to read (positional).
pub fn image_path_arg() -> Arg {
    Arg::new("image_path")
        .value_name("IMAGE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Image file")
}

/// JSON manifest describing the image tables (positional).
pub fn manifest_path_arg() -> Arg {
    Arg::new("manifest_path")
        .value_name("MANIFEST")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON manifest")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Report every finding of the failing class (--all).
pub fn all_findings_arg() -> Arg {
    Arg::new("all")
        .long("all")
        .action(ArgAction::SetTrue)
        .help("Report every finding of the failing check, not just the first")
}

/// Section count limit (--max-sections).
pub fn max_sections_arg() -> Arg {
    Arg::new("max_sections")
        .long("max-sections")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Reject images declaring more than N sections")
}

/// Write the image to a file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("OUT")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Write the image to this file")
}
