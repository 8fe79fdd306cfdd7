//! Local image file layout
//!
//! Downloads are spread over a bounded tree below the root folder:
//! `img/<a>/<a><b>/<a><b><c>/` with a in 1..=16, b in 1..=4, c in 1..=2
//! (128 leaf directories).

use rand::Rng;
use std::path::{Path, PathBuf};

/// Top-level directory of the image tree, relative to the root folder
pub const IMAGE_DIR: &str = "img";

/// Pick a random leaf directory, relative to the root folder
pub fn random_local_dir<R: Rng + ?Sized>(rng: &mut R) -> PathBuf {
    let a: u8 = rng.gen_range(1..=16);
    let b: u8 = rng.gen_range(1..=4);
    let c: u8 = rng.gen_range(1..=2);

    PathBuf::from(IMAGE_DIR)
        .join(a.to_string())
        .join(format!("{}{}", a, b))
        .join(format!("{}{}{}", a, b, c))
}

/// File name for a remote URL: its last path segment
pub fn local_file_name(remote_url: &str) -> &str {
    let name = remote_url.rsplit('/').next().unwrap_or(remote_url);
    if name.is_empty() {
        "photo.jpg"
    } else {
        name
    }
}

/// Delete a file if it exists, logging rather than failing
pub fn remove_if_exists(path: &Path) {
    if !path.is_file() {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed discarded image"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove discarded image"),
    }
}
