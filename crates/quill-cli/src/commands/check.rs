use std::path::PathBuf;

use quill_image::{Error, ImageReader, ReadOptions};

use super::image_file::map_image_or_exit;

pub struct CheckArgs {
    pub image_path: PathBuf,
    pub options: ReadOptions,
}

pub fn run(args: CheckArgs) {
    let bytes = map_image_or_exit(&args.image_path);

    if let Err(problems) = check(&bytes, args.options) {
        for problem in problems {
            eprintln!("error: {}: {}", args.image_path.display(), problem);
        }
        std::process::exit(1);
    }

    // Silent on success
}

/// Problems found in `bytes`, one line each.
pub fn check(bytes: &[u8], options: ReadOptions) -> Result<(), Vec<String>> {
    match ImageReader::new(options).parse(bytes) {
        Ok(_) => Ok(()),
        Err(Error::Invalid(findings)) => Err(findings.iter().map(ToString::to_string).collect()),
        Err(Error::Decode(e)) => Err(vec![e.to_string()]),
    }
}
