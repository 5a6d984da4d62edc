//! Gzip compression of minified artifacts.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::asset::paths::gzip_path_for;
use crate::notify::{Channel, LifecycleEvent, Notifier};
use crate::proc::MinifyOptions;

use super::MinifyError;

/// Gzips `minified` next to itself if `options` enable gzip.
///
/// Returns [None] without notifying anyone if gzip is disabled.
/// Otherwise, fires [Channel::BeforeWriteGzip] and
/// [Channel::AfterWriteGzip] around the (possible) write,
/// and returns whether the gzip file was written.
///
/// The gzip file is written iff `changed` is true or
/// the gzip file doesn't exist yet.
pub fn maybe_gzip(
    notifier: &Notifier,
    options: &MinifyOptions,
    minified: &Path,
    changed: bool,
) -> Result<Option<bool>, MinifyError> {
    if !options.gzip {
        return Ok(None);
    }

    let gzip = gzip_path_for(minified);
    let changed = changed || !gzip.exists();
    let event = LifecycleEvent::new(minified, &gzip, changed);

    notifier.fire(Channel::BeforeWriteGzip, &event);

    if changed {
        tracing::trace!("gzip: {}", gzip.display());
        compress(minified, &gzip).map_err(|source| MinifyError::WriteGzip {
            path: gzip.clone(),
            source,
        })?;
    }

    notifier.fire(Channel::AfterWriteGzip, &event);

    Ok(Some(changed))
}

/// Streams a gzip-compressed copy of `source` into `target`,
/// replacing any existing `target`.
fn compress(source: &Path, target: &Path) -> io::Result<()> {
    let mut input = BufReader::new(File::open(source)?);
    let output = BufWriter::new(File::create(target)?);

    let mut encoder = GzEncoder::new(output, Compression::best());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.flush()
}
