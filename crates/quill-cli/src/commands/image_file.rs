use std::fs::File;
use std::io;
use std::path::Path;

use memmap2::Mmap;

/// Map an image file read-only.
pub fn map_image(path: &Path) -> io::Result<Mmap> {
    let file = File::open(path)?;
    // SAFETY: read-only mapping; the CLI does not modify the file while it is mapped.
    unsafe { Mmap::map(&file) }
}

/// Map an image file, or report the failure and exit.
pub fn map_image_or_exit(path: &Path) -> Mmap {
    match map_image(path) {
        Ok(map) => {
            tracing::debug!(path = %path.display(), bytes = map.len(), "mapped image");
            map
        }
        Err(e) => {
            eprintln!("error: {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
