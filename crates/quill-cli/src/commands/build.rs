use std::path::PathBuf;

use super::manifest::Manifest;

pub struct BuildArgs {
    pub manifest_path: PathBuf,
    pub output: PathBuf,
}

pub fn run(args: BuildArgs) {
    let bytes = match Manifest::from_path(&args.manifest_path).and_then(Manifest::to_image_bytes)
    {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: {}: {}", args.manifest_path.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::write(&args.output, &bytes) {
        eprintln!("error: {}: {}", args.output.display(), e);
        std::process::exit(1);
    }

    tracing::info!(
        output = %args.output.display(),
        bytes = bytes.len(),
        "wrote image"
    );
}
