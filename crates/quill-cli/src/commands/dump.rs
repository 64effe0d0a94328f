use std::path::PathBuf;

use quill_format::{Colors, DecodeError, Image, Limits, dump};

use super::image_file::map_image_or_exit;

pub struct DumpArgs {
    pub image_path: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let bytes = map_image_or_exit(&args.image_path);

    match render(&bytes, args.color) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("error: {}: {}", args.image_path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Dump any image that decodes, valid or not.
pub fn render(bytes: &[u8], color: bool) -> Result<String, DecodeError> {
    let image = Image::deserialize(bytes, &Limits::default())?;
    Ok(dump(&image, Colors::new(color)))
}
