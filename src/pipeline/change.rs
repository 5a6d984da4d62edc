//! Detection of artifacts whose content is already up to date.

use std::fs;
use std::io;
use std::path::Path;

/// The UTF-8 byte-order mark written at the start of minified artifacts.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Returns `bytes` without a leading [UTF8_BOM].
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Returns true iff writing `candidate` to `target` would change it.
///
/// A leading byte-order mark on the existing file is ignored, so
/// `target` is unchanged when its text equals `candidate`. A missing
/// `target` is changed. Any failure to read `target` (permissions,
/// `target` being a directory, I/O errors) also counts as changed,
/// so that the artifact is regenerated rather than left stale.
pub fn has_changed(target: &Path, candidate: &str) -> bool {
    match fs::read(target) {
        Ok(existing) => strip_bom(&existing) != candidate.as_bytes(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => true,
        Err(error) => {
            tracing::debug!(
                "treating {} as changed: unreadable: {}",
                target.display(),
                error
            );
            true
        }
    }
}
