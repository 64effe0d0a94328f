//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;
use quill_image::{Limits, ReadOptions};

use super::ColorChoice;
use crate::commands::build::BuildArgs;
use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;

pub struct DumpParams {
    pub image_path: PathBuf,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image_path: required_path(m, "image_path"),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            image_path: p.image_path,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub image_path: PathBuf,
    pub all: bool,
    pub max_sections: Option<usize>,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            image_path: required_path(m, "image_path"),
            all: m.get_flag("all"),
            max_sections: m.get_one::<usize>("max_sections").copied(),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        let mut limits = Limits::default();
        if let Some(n) = p.max_sections {
            limits.max_section_count = n;
        }
        Self {
            image_path: p.image_path,
            options: ReadOptions {
                limits,
                diagnostics: p.all,
            },
        }
    }
}

pub struct BuildParams {
    pub manifest_path: PathBuf,
    pub output: PathBuf,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            manifest_path: required_path(m, "manifest_path"),
            output: required_path(m, "output"),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        Self {
            manifest_path: p.manifest_path,
            output: p.output,
        }
    }
}

fn required_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id)
        .cloned()
        .unwrap_or_else(|| unreachable!("clap enforces required arg `{id}`"))
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
