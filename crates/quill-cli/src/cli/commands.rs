//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("quill")
        .about("Inspect, check and build Quill application images")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(dump_command())
        .subcommand(check_command())
        .subcommand(build_command())
}

/// Print a human-readable listing of an image.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Print the sections and tables of an image")
        .after_help(
            r#"EXAMPLES:
  quill dump app.qimg                 # listing with colors on a terminal
  quill dump app.qimg --color never   # plain text"#,
        )
        .arg(image_path_arg())
        .arg(color_arg())
}

/// Decode and validate an image.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate an image")
        .after_help(
            r#"EXAMPLES:
  quill check app.qimg                     # first problem only
  quill check app.qimg --all               # every problem of the failing check
  quill check app.qimg --max-sections 32   # tighter section limit"#,
        )
        .arg(image_path_arg())
        .arg(all_findings_arg())
        .arg(max_sections_arg())
}

/// Assemble an image from a JSON manifest.
pub fn build_command() -> Command {
    Command::new("build")
        .about("Build an image from a JSON manifest")
        .after_help(
            r#"EXAMPLES:
  quill build app.json -o app.qimg"#,
        )
        .arg(manifest_path_arg())
        .arg(output_file_arg())
}
